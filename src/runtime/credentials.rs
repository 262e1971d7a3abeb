//! Credential file tree: `/etc/virtrigaud/credentials/{username,password,token}`.
//! Read once at startup; rotation requires a pod restart.

use std::path::{Path, PathBuf};

pub const DEFAULT_CREDENTIALS_DIR: &str = "/etc/virtrigaud/credentials";

#[derive(Clone)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    /// Loads from `dir/{username,password,token}`. A file is optional
    /// (`token` providers have no username/password); `username`/`password`
    /// are mandatory for username/password-style providers, but that
    /// requirement is enforced at the point of use (e.g. vSphere session
    /// establishment), not here, since a token-only provider legitimately
    /// has neither.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> crate::error::Result<Self> {
        let dir = dir.as_ref();
        Ok(Credentials {
            username: read_optional(dir, "username")?,
            password: read_optional(dir, "password")?,
            token: read_optional(dir, "token")?,
        })
    }

    pub fn load_default() -> crate::error::Result<Self> {
        Self::load_from_dir(DEFAULT_CREDENTIALS_DIR)
    }

    /// Returns `(username, password)`, failing with `Credentials` if either
    /// is absent — the check a username/password vSphere session needs.
    pub fn require_username_password(&self) -> crate::error::Result<(&str, &str)> {
        let username = self
            .username
            .as_deref()
            .ok_or_else(|| crate::error::Error::Credentials("username file missing".into()))?;
        let password = self
            .password
            .as_deref()
            .ok_or_else(|| crate::error::Error::Credentials("password file missing".into()))?;
        Ok((username, password))
    }
}

fn read_optional(dir: &Path, file: &str) -> crate::error::Result<Option<String>> {
    let path: PathBuf = dir.join(file);
    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(Some(contents.trim_end_matches('\n').to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
