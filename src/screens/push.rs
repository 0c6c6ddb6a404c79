//! Push notification registration for the mobile profile.
//!
//! Registration moves through `Unregistered → PermissionRequested →
//! Registered | Denied`. Each mount makes at most one attempt, and only when
//! an API key is configured and no token is stored yet. A denial is final
//! for the process; failures are alerted and never retried automatically.
//!
//! An attempt always runs to completion. Unmounting only suppresses status
//! updates and alerts; a token the backend accepted is stored regardless,
//! so the next mount does not register it again.

use super::AlertSink;
use crate::api::{ApiClient, ApiError};
use crate::config::{AppState, AppStatePatch, PushRegistrationStatus, SettingsStore, StoreError};
use crate::infra::lifecycle::MountGuard;
use crate::logging::redact;

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Answer to a notification permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// The device side of push notifications.
#[async_trait]
pub trait PushPlatform: Send + Sync {
    /// Ask the user for permission (may return a cached answer).
    async fn request_permission(&self) -> PermissionStatus;
    /// Obtain the device push token.
    async fn push_token(&self) -> Result<String, String>;
}

/// A platform with a fixed answer, for the CLI and for tests.
#[derive(Debug, Clone)]
pub struct StaticPushPlatform {
    permission: PermissionStatus,
    token: Result<String, String>,
}

impl StaticPushPlatform {
    pub fn granted(token: impl Into<String>) -> Self {
        Self {
            permission: PermissionStatus::Granted,
            token: Ok(token.into()),
        }
    }

    pub fn denied() -> Self {
        Self {
            permission: PermissionStatus::Denied,
            token: Err("permission denied".to_string()),
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            permission: PermissionStatus::Granted,
            token: Err(reason.into()),
        }
    }
}

#[async_trait]
impl PushPlatform for StaticPushPlatform {
    async fn request_permission(&self) -> PermissionStatus {
        self.permission
    }

    async fn push_token(&self) -> Result<String, String> {
        self.token.clone()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("Notification permission was denied")]
    PermissionDenied,
    #[error("Could not obtain a push token: {0}")]
    Platform(String),
    #[error("Could not register push token: {0}")]
    Api(#[from] ApiError),
    #[error("Could not save push token: {0}")]
    Store(#[from] StoreError),
}

/// Why a mount made no attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyAttempted,
    NoApiKey,
    AlreadyRegistered,
    PermissionDenied,
}

/// What one registration attempt led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Skipped(SkipReason),
    Registered(String),
    Denied,
    Failed(String),
}

/// Builds per-mount registration handles.
pub struct PushRegistrar {
    store: Arc<SettingsStore<AppState>>,
    client: ApiClient,
    platform: Arc<dyn PushPlatform>,
    alerts: Arc<dyn AlertSink>,
}

impl PushRegistrar {
    pub fn new(
        store: Arc<SettingsStore<AppState>>,
        client: ApiClient,
        platform: Arc<dyn PushPlatform>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            store,
            client,
            platform,
            alerts,
        }
    }

    /// Start a mount.
    pub fn mount(&self) -> PushMount<'_> {
        PushMount {
            registrar: self,
            guard: MountGuard::new(),
            attempted: AtomicBool::new(false),
        }
    }

    /// Clear the token locally and on the backend.
    pub async fn unregister(&self) -> Result<(), PushError> {
        self.client.register_push_token(None).await?;
        let mut patch = AppStatePatch::push_token(None);
        patch.push_registration = Some(PushRegistrationStatus::Unregistered);
        self.store.set(patch).await?;
        info!("Push token cleared");
        Ok(())
    }
}

/// One mounted lifetime of the registering view.
pub struct PushMount<'a> {
    registrar: &'a PushRegistrar,
    guard: MountGuard,
    attempted: AtomicBool,
}

impl PushMount<'_> {
    /// Guard that flips when this mount goes away.
    pub fn guard(&self) -> MountGuard {
        self.guard.clone()
    }

    pub fn unmount(&self) {
        self.guard.unmount();
    }

    fn skip_reason(&self) -> Option<SkipReason> {
        let state = self.registrar.store.get();
        if state.push_registration == PushRegistrationStatus::Denied {
            return Some(SkipReason::PermissionDenied);
        }
        if state.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Some(SkipReason::NoApiKey);
        }
        if state.push_token.is_some() {
            return Some(SkipReason::AlreadyRegistered);
        }
        None
    }

    async fn set_status(&self, status: PushRegistrationStatus) -> Result<(), StoreError> {
        if self.guard.is_mounted() {
            self.registrar
                .store
                .set(AppStatePatch::push_registration(status))
                .await?;
        }
        Ok(())
    }

    fn fail(&self, err: PushError) -> RegistrationOutcome {
        let message = err.to_string();
        warn!("Push registration failed: {}", message);
        if self.guard.is_mounted() {
            self.registrar
                .alerts
                .alert("Push notifications", &message);
        }
        RegistrationOutcome::Failed(message)
    }

    /// Make this mount's single registration attempt, if one is due.
    pub async fn maybe_register(&self) -> RegistrationOutcome {
        if let Some(reason) = self.skip_reason() {
            debug!(?reason, "Skipping push registration");
            return RegistrationOutcome::Skipped(reason);
        }
        if self.attempted.swap(true, Ordering::SeqCst) {
            return RegistrationOutcome::Skipped(SkipReason::AlreadyAttempted);
        }

        match self.attempt().await {
            Ok(outcome) => outcome,
            Err(err) => {
                if let Err(e) = self.set_status(PushRegistrationStatus::Unregistered).await {
                    warn!("Failed to reset push registration status: {}", e);
                }
                self.fail(err)
            }
        }
    }

    async fn attempt(&self) -> Result<RegistrationOutcome, PushError> {
        let registrar = self.registrar;

        self.set_status(PushRegistrationStatus::PermissionRequested)
            .await?;

        if registrar.platform.request_permission().await == PermissionStatus::Denied {
            self.set_status(PushRegistrationStatus::Denied).await?;
            info!("Notification permission denied");
            if self.guard.is_mounted() {
                registrar.alerts.alert(
                    "Notifications disabled",
                    "Enable notifications in system settings to receive reminders.",
                );
            }
            return Ok(RegistrationOutcome::Denied);
        }

        let token = registrar
            .platform
            .push_token()
            .await
            .map_err(PushError::Platform)?;

        registrar.client.register_push_token(Some(&token)).await?;

        // The backend now holds the token; record it even after unmount.
        let mut patch = AppStatePatch::push_token(Some(token.clone()));
        patch.push_registration = Some(PushRegistrationStatus::Registered);
        registrar.store.set(patch).await?;

        if !self.guard.is_mounted() {
            debug!("Push registration finished after unmount");
        }
        info!(token = %redact(&token), "Push token registered");
        Ok(RegistrationOutcome::Registered(token))
    }
}

impl Drop for PushMount<'_> {
    fn drop(&mut self) {
        self.guard.unmount();
    }
}
