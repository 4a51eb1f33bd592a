//! Credential resolution for authenticated artifact downloads
//!
//! The process environment is read exactly once into a [`CredentialSource`].
//! Each download then asks the snapshot for the [`Credential`] it needs:
//! the workflow-engine release uses a bearer-style token passed through
//! unmodified, the connector bundle uses an HTTP basic-auth pair.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::config::CredentialVars;
use crate::error::{PackageError, Result};

/// Authorization attached to a single download
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Anonymous,
    /// Sent as the `Authorization` header value without any encoding
    Token(String),
    Basic { username: String, password: String },
}

impl Credential {
    /// Value of the `Authorization` header, `None` for anonymous requests
    pub fn header_value(&self) -> Option<String> {
        match self {
            Credential::Anonymous => None,
            Credential::Token(token) => Some(token.clone()),
            Credential::Basic { username, password } => {
                let encoded = STANDARD.encode(format!("{username}:{password}"));
                Some(format!("Basic {encoded}"))
            }
        }
    }
}

// Never print secrets, not even at debug level
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Anonymous => f.write_str("Anonymous"),
            Credential::Token(_) => f.write_str("Token(<redacted>)"),
            Credential::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Snapshot of the credential environment variables for one run
#[derive(Clone)]
pub struct CredentialSource {
    vars: CredentialVars,
    token: String,
    username: String,
    password: String,
}

impl CredentialSource {
    /// Read the configured variables from the process environment
    pub fn from_env(vars: &CredentialVars) -> Self {
        Self::from_lookup(vars, |name| std::env::var(name).ok())
    }

    /// Build a snapshot from an arbitrary lookup (unset is treated as empty)
    pub fn from_lookup<F>(vars: &CredentialVars, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).unwrap_or_default();
        Self {
            token: read(&vars.token),
            username: read(&vars.username),
            password: read(&vars.password),
            vars: vars.clone(),
        }
    }

    /// Credential for the workflow-engine release download.
    ///
    /// An empty token means anonymous; the release asset may be public.
    pub fn release_token(&self) -> Credential {
        if self.token.is_empty() {
            Credential::Anonymous
        } else {
            Credential::Token(self.token.clone())
        }
    }

    /// Credential for the internal artifact repository.
    ///
    /// Fails when either half of the pair is empty, naming every missing variable.
    pub fn artifact_repository(&self) -> Result<Credential> {
        let mut missing = Vec::new();
        if self.username.is_empty() {
            missing.push(self.vars.username.clone());
        }
        if self.password.is_empty() {
            missing.push(self.vars.password.clone());
        }
        if !missing.is_empty() {
            return Err(PackageError::MissingCredentials { missing });
        }

        Ok(Credential::Basic {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSource")
            .field("token_set", &!self.token.is_empty())
            .field("username_set", &!self.username.is_empty())
            .field("password_set", &!self.password.is_empty())
            .finish()
    }
}
