//! End-to-end assembler scenarios against a fake artifact source.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use c8run_package::archive::Downloader;
use c8run_package::config::{CredentialVars, SourceHosts};
use c8run_package::error::BoxError;
use c8run_package::package::{Arch, CAMUNDA, Manifest, TargetOs};
use c8run_package::{
    Credential, CredentialSource, PackageError, PackageRequest, Platform, ReleaseVersions,
    package_unix, package_windows,
};
use tempfile::TempDir;

const LINUX_X86: Platform = Platform::new(TargetOs::Linux, Arch::X86_64);

/// One recorded download request
#[derive(Debug, Clone)]
struct Request {
    url: String,
    authorization: Option<String>,
}

/// Serves canned bodies keyed by URL suffix and records every request
struct FakeSource {
    bodies: Vec<(String, Vec<u8>)>,
    fail_on: Option<String>,
    requests: Mutex<Vec<Request>>,
}

impl FakeSource {
    fn new() -> Self {
        Self {
            bodies: Vec::new(),
            fail_on: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn serve(mut self, suffix: &str, body: Vec<u8>) -> Self {
        self.bodies.push((suffix.to_string(), body));
        self
    }

    fn fail_on(mut self, suffix: &str) -> Self {
        self.fail_on = Some(suffix.to_string());
        self
    }

    fn requests(&self) -> Vec<Request> {
        self.requests.lock().expect("lock").clone()
    }
}

impl Downloader for FakeSource {
    async fn download(
        &self,
        url: &str,
        dest: &Path,
        credential: &Credential,
    ) -> Result<(), BoxError> {
        self.requests.lock().expect("lock").push(Request {
            url: url.to_string(),
            authorization: credential.header_value(),
        });
        if self.fail_on.as_deref().is_some_and(|s| url.ends_with(s)) {
            return Err("simulated network failure".into());
        }
        let (_, body) = self
            .bodies
            .iter()
            .find(|(suffix, _)| url.ends_with(suffix.as_str()))
            .ok_or_else(|| format!("404 for {url}"))?;
        fs::write(dest, body)?;
        Ok(())
    }
}

fn tar_gz(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(flate2::write::GzEncoder::new(
        Vec::new(),
        flate2::Compression::default(),
    ));
    for (path, body) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, *body).expect("append");
    }
    builder.into_inner().expect("tar").finish().expect("gzip")
}

fn zip(files: &[(&str, &[u8])]) -> Vec<u8> {
    use std::io::Write;
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (path, body) in files {
        writer
            .start_file(*path, zip::write::SimpleFileOptions::default())
            .expect("start");
        writer.write_all(body).expect("write");
    }
    writer.finish().expect("finish").into_inner()
}

fn unix_source() -> FakeSource {
    FakeSource::new()
        .serve(
            "elasticsearch-8.13.4-linux-x86_64.tar.gz",
            tar_gz(&[("elasticsearch-8.13.4/bin/elasticsearch", b"#!/bin/sh\n")]),
        )
        .serve(
            "camunda-zeebe-8.5.0.tar.gz",
            tar_gz(&[("camunda-zeebe-8.5.0/bin/camunda", b"#!/bin/sh\n")]),
        )
        .serve("connector-runtime-bundle-8.5.0-with-dependencies.jar", b"PK jar".to_vec())
}

/// A `c8run` working tree with every launcher file in place
struct Workspace {
    _dir: TempDir,
    base: PathBuf,
}

impl Workspace {
    fn new(os: TargetOs) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let base = dir.path().join("c8run");
        for sub in ["custom_connectors", "configuration", "log"] {
            fs::create_dir_all(base.join(sub)).expect("mkdir");
        }
        fs::write(base.join("configuration/application.yaml"), "camunda: {}").expect("write");
        fs::write(base.join("log/.keep"), "").expect("write");

        let mut files = vec!["README.md", "connectors-application.properties", "endpoints.txt"];
        if os == TargetOs::Windows {
            files.extend(["c8run.exe", "package.bat"]);
        } else {
            files.extend(["c8run", "start.sh", "shutdown.sh", "package.sh"]);
        }
        for file in files {
            fs::write(base.join(file), file).expect("write");
        }

        Self { _dir: dir, base }
    }

    fn request(&self, env: &[(&str, &str)]) -> PackageRequest {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PackageRequest {
            base_dir: self.base.clone(),
            versions: ReleaseVersions {
                camunda: "8.5.0".into(),
                elasticsearch: "8.13.4".into(),
                connectors: "8.5.0".into(),
                release_tag: "8.5.0".into(),
            },
            hosts: SourceHosts::default(),
            credentials: CredentialSource::from_lookup(&CredentialVars::default(), |name| {
                env.get(name).cloned()
            }),
        }
    }
}

const ALL_CREDENTIALS: &[(&str, &str)] = &[
    ("GH_TOKEN", "ghp_test"),
    ("JAVA_ARTIFACTS_USER", "ci"),
    ("JAVA_ARTIFACTS_PASSWORD", "secret"),
];

/// First two components of an archive path (`c8run/<entry>`)
fn top_level(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .take(2)
        .collect()
}

fn expected_entries(os: TargetOs) -> BTreeSet<PathBuf> {
    Manifest::new(os, "8.5.0", "8.13.4", "8.5.0")
        .prefixed(Path::new("c8run"))
        .into_iter()
        .collect()
}

#[tokio::test]
async fn missing_basic_auth_fails_before_any_download() {
    let ws = Workspace::new(TargetOs::Linux);
    fs::create_dir_all(ws.base.join("elasticsearch-8.13.4")).expect("mkdir");
    let source = unix_source();

    let err = package_unix(&source, &ws.request(&[("GH_TOKEN", "ghp_test")]), LINUX_X86)
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("JAVA_ARTIFACTS_USER"), "{message}");
    assert!(message.contains("JAVA_ARTIFACTS_PASSWORD"), "{message}");
    assert!(source.requests().is_empty());
    // The cleaner never ran either
    assert!(ws.base.join("elasticsearch-8.13.4").exists());
}

#[tokio::test]
async fn windows_assembler_also_requires_basic_auth() {
    let ws = Workspace::new(TargetOs::Windows);
    let source = FakeSource::new();

    let err = package_windows(&source, &ws.request(&[("JAVA_ARTIFACTS_USER", "ci")]))
        .await
        .unwrap_err();

    assert!(matches!(err, PackageError::MissingCredentials { .. }));
    assert!(source.requests().is_empty());
}

#[tokio::test]
async fn unix_package_contains_exactly_the_manifest() {
    let ws = Workspace::new(TargetOs::Linux);
    fs::create_dir_all(ws.base.join("log")).expect("mkdir");
    fs::write(ws.base.join("log/camunda.log"), "stale").expect("write");
    let source = unix_source();

    let output = package_unix(&source, &ws.request(ALL_CREDENTIALS), LINUX_X86)
        .await
        .expect("package");

    let canonical = fs::canonicalize(&ws.base).expect("canonical");
    assert_eq!(output, canonical.join("camunda8-run-8.5.0-linux-x86_64.tar.gz"));
    assert!(output.is_file());
    assert!(!ws.base.join("log/camunda.log").exists());

    let file = fs::File::open(&output).expect("open");
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
    let mut names = BTreeSet::new();
    let mut all = Vec::new();
    for entry in archive.entries().expect("entries") {
        let entry = entry.expect("entry");
        let path = entry.path().expect("path").into_owned();
        names.insert(top_level(&path));
        all.push(path);
    }
    assert_eq!(names, expected_entries(TargetOs::Linux));
    assert!(all.contains(&PathBuf::from("c8run/elasticsearch-8.13.4/bin/elasticsearch")));
    assert!(all.contains(&PathBuf::from("c8run/camunda-zeebe-8.5.0/bin/camunda")));
}

#[tokio::test]
async fn each_download_carries_its_own_credential() {
    let ws = Workspace::new(TargetOs::Linux);
    let source = unix_source();

    package_unix(&source, &ws.request(ALL_CREDENTIALS), LINUX_X86)
        .await
        .expect("package");

    let requests = source.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(
        requests[0].url,
        "https://artifacts.elastic.co/downloads/elasticsearch/elasticsearch-8.13.4-linux-x86_64.tar.gz"
    );
    assert_eq!(requests[0].authorization, None);
    assert_eq!(
        requests[1].url,
        "https://github.com/camunda/camunda/releases/download/8.5.0/camunda-zeebe-8.5.0.tar.gz"
    );
    assert_eq!(requests[1].authorization.as_deref(), Some("ghp_test"));
    assert!(
        requests[2]
            .url
            .ends_with("/8.5.0/connector-runtime-bundle-8.5.0-with-dependencies.jar")
    );
    // base64("ci:secret")
    assert_eq!(requests[2].authorization.as_deref(), Some("Basic Y2k6c2VjcmV0"));
}

#[tokio::test]
async fn workflow_engine_failure_aborts_without_a_package() {
    let cwd_before = std::env::current_dir().expect("cwd");
    let ws = Workspace::new(TargetOs::Linux);
    let source = unix_source().fail_on("camunda-zeebe-8.5.0.tar.gz");

    let err = package_unix(&source, &ws.request(ALL_CREDENTIALS), LINUX_X86)
        .await
        .unwrap_err();

    assert_eq!(err.failed_artifact(), Some(CAMUNDA));
    let chain = format!("{:#}", anyhow::Error::new(err));
    assert!(chain.contains("failed to fetch camunda"), "{chain}");
    assert!(chain.contains("simulated network failure"), "{chain}");

    assert!(!ws.base.join("camunda8-run-8.5.0-linux-x86_64.tar.gz").exists());
    // The connector jar is never requested after the failure
    assert_eq!(source.requests().len(), 2);
    // Already extracted artifacts stay for the next attempt
    assert!(ws.base.join("elasticsearch-8.13.4/bin/elasticsearch").exists());
    assert_eq!(std::env::current_dir().expect("cwd"), cwd_before);
}

#[tokio::test]
async fn missing_launcher_file_is_reported() {
    let ws = Workspace::new(TargetOs::Linux);
    fs::remove_file(ws.base.join("endpoints.txt")).expect("remove");

    let err = package_unix(&unix_source(), &ws.request(ALL_CREDENTIALS), LINUX_X86)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("unix"), "{err}");
    match err.cause() {
        PackageError::MissingManifestEntry { path } => assert!(path.ends_with("endpoints.txt")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!ws.base.join("camunda8-run-8.5.0-linux-x86_64.tar.gz").exists());
}

#[tokio::test]
async fn archive_failure_is_wrapped_with_the_assembler_and_a_trace() {
    let ws = Workspace::new(TargetOs::Linux);
    // A directory squatting on the output name makes the package unwritable
    let squatter = ws.base.join("camunda8-run-8.5.0-linux-x86_64.tar.gz");
    fs::create_dir(&squatter).expect("mkdir");

    let err = package_unix(&unix_source(), &ws.request(ALL_CREDENTIALS), LINUX_X86)
        .await
        .unwrap_err();

    assert!(matches!(err, PackageError::Assemble { target: "unix", .. }));
    assert!(matches!(err.cause(), PackageError::Archive { .. }));
    assert!(err.trace().is_some());
    let chain = format!("{:#}", anyhow::Error::new(err));
    assert!(chain.starts_with("failed to build unix package"), "{chain}");
    assert!(chain.contains("failed to create package"), "{chain}");
    assert!(squatter.is_dir());
}

#[tokio::test]
async fn windows_package_is_a_zip_of_the_manifest() {
    let ws = Workspace::new(TargetOs::Windows);
    let source = FakeSource::new()
        .serve(
            "elasticsearch-8.13.4-windows-x86_64.zip",
            zip(&[("elasticsearch-8.13.4/bin/elasticsearch.bat", b"@echo off")]),
        )
        .serve(
            "camunda-zeebe-8.5.0.zip",
            zip(&[("camunda-zeebe-8.5.0/bin/camunda.bat", b"@echo off")]),
        )
        .serve("connector-runtime-bundle-8.5.0-with-dependencies.jar", b"PK jar".to_vec());

    let output = package_windows(&source, &ws.request(ALL_CREDENTIALS))
        .await
        .expect("package");

    assert_eq!(
        output.file_name().and_then(|n| n.to_str()),
        Some("camunda8-run-8.5.0-windows-x86_64.zip")
    );
    let archive = zip::ZipArchive::new(fs::File::open(&output).expect("open")).expect("zip");
    let names: BTreeSet<PathBuf> = archive.file_names().map(|n| top_level(Path::new(n))).collect();
    assert_eq!(names, expected_entries(TargetOs::Windows));
    assert!(archive.file_names().any(|n| n == "c8run/camunda-zeebe-8.5.0/bin/camunda.bat"));
}
