//! Session lifecycle. Credentials are never embedded in the endpoint
//! URL — they are passed to `Login` as explicit user-info, so passwords
//! containing URL-reserved characters behave correctly.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::resilience::{Error, Result};
use crate::runtime::Credentials;

/// vCenter sessions are valid for 30 minutes of inactivity by default;
/// re-establishing a little earlier avoids racing the server-side expiry.
const SESSION_TTL: Duration = Duration::from_secs(25 * 60);

struct SessionState {
    cookie: Option<String>,
    established_at: Option<Instant>,
}

pub struct SessionManager {
    state: Mutex<SessionState>,
    credentials: Credentials,
}

impl SessionManager {
    pub fn new(credentials: Credentials) -> Self {
        SessionManager {
            state: Mutex::new(SessionState {
                cookie: None,
                established_at: None,
            }),
            credentials,
        }
    }

    /// Checks session validity; if expired or absent, re-establishes using
    /// the cached credentials. `login` performs the actual `Login` SOAP call
    /// and returns the session cookie vCenter issues.
    pub async fn ensure_connection<F, Fut>(&self, login: F) -> Result<String>
    where
        F: FnOnce(&str, &str) -> Fut,
        Fut: std::future::Future<Output = Result<String>>,
    {
        let mut guard = self.state.lock().await;
        if let (Some(cookie), Some(established_at)) = (&guard.cookie, guard.established_at) {
            if established_at.elapsed() < SESSION_TTL {
                return Ok(cookie.clone());
            }
        }

        let (username, password) = self
            .credentials
            .require_username_password()
            .map_err(|e| Error::unauthorized(e.to_string()))?;

        info!("establishing vSphere session");
        let cookie = login(username, password).await.map_err(|e| {
            warn!(error = %e, "vSphere login failed");
            e
        })?;

        guard.cookie = Some(cookie.clone());
        guard.established_at = Some(Instant::now());
        Ok(cookie)
    }

    /// Forces the next `ensure_connection` call to re-authenticate, used
    /// when a call fails with a session-expired fault mid-flight.
    pub async fn invalidate(&self) {
        let mut guard = self.state.lock().await;
        guard.cookie = None;
        guard.established_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn creds() -> Credentials {
        Credentials {
            username: Some("svc".to_string()),
            password: Some("hunter2".to_string()),
            token: None,
        }
    }

    #[tokio::test]
    async fn reuses_session_within_ttl() {
        let manager = SessionManager::new(creds());
        let calls = AtomicU32::new(0);
        for _ in 0..3 {
            manager
                .ensure_connection(|_u, _p| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok("cookie-1".to_string()) }
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_relogin() {
        let manager = SessionManager::new(creds());
        manager.ensure_connection(|_u, _p| async { Ok("cookie-1".to_string()) }).await.unwrap();
        manager.invalidate().await;
        let calls = AtomicU32::new(0);
        manager
            .ensure_connection(|_u, _p| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok("cookie-2".to_string()) }
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_password_is_unauthorized() {
        let manager = SessionManager::new(Credentials {
            username: Some("svc".to_string()),
            password: None,
            token: None,
        });
        let err = manager
            .ensure_connection(|_u, _p| async { Ok("cookie".to_string()) })
            .await
            .unwrap_err();
        assert_eq!(err.kind, crate::resilience::ErrorKind::Unauthorized);
    }
}
