//! Credential lifecycle management for Chaty.
//!
//! Keeps exactly one valid, unexpired pairing artifact visible to the
//! human operator at any time, and keeps the authenticated-session marker
//! consistent with the transport's actual authentication state.
//!
//! On disk, everything lives under one data directory:
//! - `pairing.json` — the structured artifact record
//! - `pairing.png`  — the rendered QR image
//! - `session.json` — the authenticated-session marker
//! - `auth_state/`  — the transport's own local auth state, cleared on logout

pub mod artifact;
pub mod render;

pub use artifact::PairingArtifact;

use chaty_core::error::PairingError;
use chrono::{Duration, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const RECORD_FILE: &str = "pairing.json";
const IMAGE_FILE: &str = "pairing.png";
const SESSION_FILE: &str = "session.json";
const AUTH_STATE_DIR: &str = "auth_state";

/// Named reconnect state. Concurrent disconnect events while a reconnect
/// is in flight are dropped, not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectState {
    Idle,
    Reconnecting,
}

/// Owns the pairing artifact and the authenticated-session marker.
pub struct PairingManager {
    data_dir: PathBuf,
    valid_for: Duration,
    artifact: Mutex<Option<PairingArtifact>>,
    reconnect: Mutex<ReconnectState>,
}

impl PairingManager {
    /// Open the manager over a data directory.
    ///
    /// Loads a previously persisted artifact; an expired one is discarded
    /// and its files removed (the lazy expiry check on process start).
    pub async fn new(data_dir: impl Into<PathBuf>, valid_for: Duration) -> Result<Self, PairingError> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| PairingError::Persist {
                path: data_dir.display().to_string(),
                reason: e.to_string(),
            })?;

        let manager = Self {
            data_dir,
            valid_for,
            artifact: Mutex::new(None),
            reconnect: Mutex::new(ReconnectState::Idle),
        };

        let loaded = manager.load_persisted().await?;
        *manager.artifact.lock().await = loaded;
        Ok(manager)
    }

    fn record_path(&self) -> PathBuf {
        self.data_dir.join(RECORD_FILE)
    }

    fn image_path(&self) -> PathBuf {
        self.data_dir.join(IMAGE_FILE)
    }

    fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }

    fn auth_state_dir(&self) -> PathBuf {
        self.data_dir.join(AUTH_STATE_DIR)
    }

    /// The current artifact, if any (cloned snapshot).
    pub async fn current_artifact(&self) -> Option<PairingArtifact> {
        self.artifact.lock().await.clone()
    }

    /// Path to the rendered QR image, if it exists on disk.
    pub async fn current_image(&self) -> Option<PathBuf> {
        let path = self.image_path();
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Some(path),
            _ => None,
        }
    }

    /// Current reconnect state (for observability and tests).
    pub async fn reconnect_state(&self) -> ReconnectState {
        *self.reconnect.lock().await
    }

    /// Handle a pairing code issued by the transport.
    ///
    /// A fresh artifact is generated when none exists, the current one has
    /// expired, or the current one was never shown. If the current artifact
    /// is unexpired and already displayed, the new code is accepted into
    /// the record but nothing is re-rendered.
    pub async fn on_pairing_code(&self, code: &str) -> Result<(), PairingError> {
        let mut guard = self.artifact.lock().await;

        if let Some(current) = guard.as_mut() {
            if !current.is_expired_at(Utc::now()) && current.displayed {
                current.code = code.to_string();
                self.persist_record(current).await?;
                debug!("Pairing code refreshed; artifact already displayed, not re-rendering");
                return Ok(());
            }
        }

        info!("Generating new pairing artifact");
        let mut artifact = PairingArtifact::new(code, self.valid_for);
        self.persist_record(&artifact).await?;

        // Rendering failures are non-fatal: the structured record still
        // lets the operator retrieve the raw code through a side channel.
        if let Err(e) = render::render_png(code, &self.image_path()) {
            warn!(error = %e, "QR image render failed");
        }

        match render::render_terminal(code) {
            Ok(qr) => {
                println!("Scan this QR code on WhatsApp to log in:");
                println!("{qr}");
                println!("QR code also saved as {}", self.image_path().display());
                artifact.displayed = true;
                self.persist_record(&artifact).await?;
            }
            Err(e) => warn!(error = %e, "Terminal QR render failed"),
        }

        *guard = Some(artifact);
        Ok(())
    }

    /// Persist the authenticated-session marker.
    ///
    /// The marker supersedes the pairing artifact as the relevant
    /// credential, but the artifact is not deleted by this event alone.
    pub async fn on_authenticated(&self, session: &serde_json::Value) -> Result<(), PairingError> {
        let path = self.session_path();
        let bytes = serde_json::to_vec_pretty(session).map_err(|e| PairingError::Persist {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| PairingError::Persist {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        info!("Authenticated session marker persisted");
        Ok(())
    }

    /// Read back the persisted session marker, if any.
    pub async fn session_marker(&self) -> Result<Option<serde_json::Value>, PairingError> {
        let path = self.session_path();
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let value = serde_json::from_slice(&bytes).map_err(|e| {
                    PairingError::InvalidRecord(format!("{}: {e}", path.display()))
                })?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PairingError::Persist {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Authentication failed: destroy all credentials.
    ///
    /// Terminal for the current login attempt — the operator must restart
    /// the process or the transport must re-initialize before a fresh
    /// `on_pairing_code` call generates a new artifact.
    pub async fn on_auth_failure(&self) -> Result<(), PairingError> {
        warn!("Authentication failed; removing session and pairing files");
        self.destroy_credentials().await
    }

    /// Try to claim the reconnect slot.
    ///
    /// Returns `false` without touching anything when a reconnect is
    /// already in flight. Otherwise performs the same cleanup as an auth
    /// failure and transitions to `Reconnecting`; the caller clears
    /// conversation state and cycles the transport, then releases the
    /// slot via [`end_reconnect`](Self::end_reconnect).
    pub async fn begin_reconnect(&self) -> Result<bool, PairingError> {
        let mut state = self.reconnect.lock().await;
        if *state == ReconnectState::Reconnecting {
            debug!("Reconnect already in progress, dropping disconnect event");
            return Ok(false);
        }
        *state = ReconnectState::Reconnecting;
        drop(state);

        self.destroy_credentials().await?;
        Ok(true)
    }

    /// Release the reconnect slot, whether the attempt succeeded or failed.
    pub async fn end_reconnect(&self) {
        *self.reconnect.lock().await = ReconnectState::Idle;
    }

    /// Remove artifact files, session marker, and transport auth state,
    /// then reset the in-memory artifact.
    async fn destroy_credentials(&self) -> Result<(), PairingError> {
        remove_file_if_present(&self.session_path()).await?;
        remove_file_if_present(&self.record_path()).await?;
        remove_file_if_present(&self.image_path()).await?;
        self.clear_auth_state().await?;
        *self.artifact.lock().await = None;
        info!("Session and pairing files deleted");
        Ok(())
    }

    /// Remove the transport's local auth-state directory.
    ///
    /// "Directory not empty" is recoverable: fall back to a recursive
    /// removal. Any other filesystem error is fatal and propagated.
    async fn clear_auth_state(&self) -> Result<(), PairingError> {
        let dir = self.auth_state_dir();
        match tokio::fs::remove_dir(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) if e.kind() == ErrorKind::DirectoryNotEmpty => {
                debug!("Auth state dir not empty, removing recursively");
                tokio::fs::remove_dir_all(&dir)
                    .await
                    .map_err(|e| PairingError::Cleanup {
                        path: dir.display().to_string(),
                        reason: e.to_string(),
                    })
            }
            Err(e) => Err(PairingError::Cleanup {
                path: dir.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn persist_record(&self, artifact: &PairingArtifact) -> Result<(), PairingError> {
        let path = self.record_path();
        let bytes = serde_json::to_vec_pretty(artifact).map_err(|e| PairingError::Persist {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| PairingError::Persist {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }

    /// Load the persisted record; discard (and clean up) an expired one.
    async fn load_persisted(&self) -> Result<Option<PairingArtifact>, PairingError> {
        let path = self.record_path();
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PairingError::Persist {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };

        let artifact: PairingArtifact = serde_json::from_slice(&bytes)
            .map_err(|e| PairingError::InvalidRecord(format!("{}: {e}", path.display())))?;

        if artifact.is_expired_at(Utc::now()) {
            info!("Persisted pairing artifact has expired, removing");
            remove_file_if_present(&self.record_path()).await?;
            remove_file_if_present(&self.image_path()).await?;
            return Ok(None);
        }

        Ok(Some(artifact))
    }
}

async fn remove_file_if_present(path: &Path) -> Result<(), PairingError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PairingError::Cleanup {
            path: path.display().to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn manager(dir: &Path) -> PairingManager {
        PairingManager::new(dir, Duration::days(30)).await.unwrap()
    }

    #[tokio::test]
    async fn fresh_code_persists_record_and_image() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = manager(dir.path()).await;

        mgr.on_pairing_code("code-1").await.unwrap();

        let artifact = mgr.current_artifact().await.unwrap();
        assert_eq!(artifact.code, "code-1");
        assert!(artifact.displayed);
        assert!(dir.path().join("pairing.json").exists());
        assert!(dir.path().join("pairing.png").exists());
    }

    #[tokio::test]
    async fn displayed_unexpired_artifact_is_not_rerendered() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = manager(dir.path()).await;
        mgr.on_pairing_code("code-1").await.unwrap();

        // Remove the image; a re-render would bring it back.
        std::fs::remove_file(dir.path().join("pairing.png")).unwrap();

        mgr.on_pairing_code("code-2").await.unwrap();

        let artifact = mgr.current_artifact().await.unwrap();
        assert_eq!(artifact.code, "code-2", "new code accepted into the record");
        assert!(artifact.displayed);
        assert!(
            !dir.path().join("pairing.png").exists(),
            "no additional image write for a displayed artifact"
        );
    }

    #[tokio::test]
    async fn expired_artifact_is_replaced_and_rerendered() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = PairingManager::new(dir.path(), Duration::milliseconds(0))
            .await
            .unwrap();

        mgr.on_pairing_code("code-1").await.unwrap();
        // valid_for == 0 means the artifact is expired immediately.
        mgr.on_pairing_code("code-2").await.unwrap();

        let artifact = mgr.current_artifact().await.unwrap();
        assert_eq!(artifact.code, "code-2");
        assert!(dir.path().join("pairing.png").exists());
    }

    #[tokio::test]
    async fn restart_discards_expired_record() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mgr = PairingManager::new(dir.path(), Duration::milliseconds(0))
                .await
                .unwrap();
            mgr.on_pairing_code("code-1").await.unwrap();
        }

        // Second start: the persisted record is expired and must go.
        let mgr = manager(dir.path()).await;
        assert!(mgr.current_artifact().await.is_none());
        assert!(!dir.path().join("pairing.json").exists());
        assert!(!dir.path().join("pairing.png").exists());
    }

    #[tokio::test]
    async fn restart_keeps_valid_record() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mgr = manager(dir.path()).await;
            mgr.on_pairing_code("code-1").await.unwrap();
        }

        let mgr = manager(dir.path()).await;
        let artifact = mgr.current_artifact().await.unwrap();
        assert_eq!(artifact.code, "code-1");
        assert!(artifact.displayed, "displayed flag survives restart");
    }

    #[tokio::test]
    async fn authenticated_marker_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = manager(dir.path()).await;

        mgr.on_authenticated(&json!({"token": "abc"})).await.unwrap();
        let marker = mgr.session_marker().await.unwrap().unwrap();
        assert_eq!(marker["token"], "abc");
    }

    #[tokio::test]
    async fn authentication_does_not_delete_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = manager(dir.path()).await;
        mgr.on_pairing_code("code-1").await.unwrap();

        mgr.on_authenticated(&json!({"token": "abc"})).await.unwrap();
        assert!(mgr.current_artifact().await.is_some());
        assert!(dir.path().join("pairing.json").exists());
    }

    #[tokio::test]
    async fn auth_failure_destroys_everything() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = manager(dir.path()).await;
        mgr.on_pairing_code("code-1").await.unwrap();
        mgr.on_authenticated(&json!({"token": "abc"})).await.unwrap();

        mgr.on_auth_failure().await.unwrap();

        assert!(mgr.current_artifact().await.is_none());
        assert!(!dir.path().join("pairing.json").exists());
        assert!(!dir.path().join("pairing.png").exists());
        assert!(!dir.path().join("session.json").exists());
    }

    #[tokio::test]
    async fn auth_failure_then_new_code_generates_fresh_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = manager(dir.path()).await;
        mgr.on_pairing_code("code-1").await.unwrap();
        mgr.on_auth_failure().await.unwrap();

        mgr.on_pairing_code("code-2").await.unwrap();
        let artifact = mgr.current_artifact().await.unwrap();
        assert_eq!(artifact.code, "code-2");
        assert!(dir.path().join("pairing.png").exists());
    }

    #[tokio::test]
    async fn overlapping_reconnects_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = manager(dir.path()).await;

        assert!(mgr.begin_reconnect().await.unwrap());
        assert_eq!(mgr.reconnect_state().await, ReconnectState::Reconnecting);

        // A second disconnect while reconnecting is a no-op.
        assert!(!mgr.begin_reconnect().await.unwrap());

        mgr.end_reconnect().await;
        assert_eq!(mgr.reconnect_state().await, ReconnectState::Idle);
        assert!(mgr.begin_reconnect().await.unwrap());
    }

    #[tokio::test]
    async fn reconnect_cleans_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = manager(dir.path()).await;
        mgr.on_pairing_code("code-1").await.unwrap();
        mgr.on_authenticated(&json!({"token": "abc"})).await.unwrap();

        assert!(mgr.begin_reconnect().await.unwrap());
        assert!(!dir.path().join("session.json").exists());
        assert!(mgr.current_artifact().await.is_none());
    }

    #[tokio::test]
    async fn non_empty_auth_state_dir_is_force_removed() {
        let dir = tempfile::tempdir().unwrap();
        let auth_dir = dir.path().join("auth_state");
        std::fs::create_dir_all(auth_dir.join("nested")).unwrap();
        std::fs::write(auth_dir.join("nested/creds.bin"), b"data").unwrap();

        let mgr = manager(dir.path()).await;
        mgr.on_auth_failure().await.unwrap();

        assert!(!auth_dir.exists());
    }
}
