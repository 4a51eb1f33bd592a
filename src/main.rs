mod cli;

use std::backtrace::BacktraceStatus;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use c8run_package::archive::HttpDownloader;
use c8run_package::clean::clean;
use c8run_package::{CredentialSource, PackageRequest, PackagerConfig, Platform, ReleaseVersions};
use clap::Parser;
use cli::{Args, Cmd, Target};
use log::{debug, error, info};

fn main() {
    // Initialize logger with the same line format for every command
    env_logger::Builder::new()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("FATAL: Failed to create Tokio runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(real_main()) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn real_main() -> Result<()> {
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => PackagerConfig::load(path)?,
        None => PackagerConfig::default(),
    };
    if let Some(version) = args.camunda_version {
        cfg.camunda_version = version;
    }
    if let Some(version) = args.elasticsearch_version {
        cfg.elasticsearch_version = version;
    }
    let base_dir = match args.base_dir.or_else(|| cfg.base_dir.clone()) {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    match args.sub.unwrap_or(Cmd::Package {
        connectors_version: None,
        release_tag: None,
        target: Target::Auto,
    }) {
        Cmd::Package {
            connectors_version,
            release_tag,
            target,
        } => {
            if let Some(version) = connectors_version {
                cfg.connectors_version = version;
            }
            if release_tag.is_some() {
                cfg.release_tag = release_tag;
            }
            run_package(&cfg, base_dir, target).await
        }
        Cmd::Clean => {
            clean(&base_dir, &cfg.camunda_version, &cfg.elasticsearch_version);
            info!("Clean complete");
            Ok(())
        }
    }
}

async fn run_package(cfg: &PackagerConfig, base_dir: PathBuf, target: Target) -> Result<()> {
    let request = PackageRequest {
        base_dir,
        versions: ReleaseVersions::from_config(cfg),
        hosts: cfg.hosts.clone(),
        credentials: CredentialSource::from_env(&cfg.credentials),
    };
    let downloader = HttpDownloader::new().context("Failed to create HTTP client")?;

    let result = match target {
        Target::Auto => c8run_package::package(&downloader, &request, Platform::detect()?).await,
        Target::Windows => c8run_package::package_windows(&downloader, &request).await,
        Target::Unix => {
            let detected = Platform::detect()?;
            if detected.is_windows() {
                bail!("Unix packages cannot be built on Windows");
            }
            c8run_package::package_unix(&downloader, &request, detected).await
        }
    };
    let output = result.inspect_err(|e| {
        if let Some(trace) = e.trace().filter(|t| t.status() == BacktraceStatus::Captured) {
            debug!("{trace}");
        }
    })?;

    println!("{}", output.display());
    Ok(())
}
