//! Application context: everything controllers need, built once at startup
//! and passed by reference.

use crate::api::{ApiClient, ApiError};
use crate::config::{
    AppState, ClientProfile, ClientSettings, Config, KeyValueStorage, OverlaySource,
    PreferencesStore, SessionOverrides, SettingsSource, SettingsStore,
};
use crate::screens::{
    AdminController, AlertSink, ChatController, PushPlatform, PushRegistrar, RemindersController,
    SettingsController,
};

use std::sync::Arc;
use tracing::info;

/// The settings store of the active profile.
#[derive(Clone)]
pub enum SettingsHandle {
    Web(Arc<SettingsStore<ClientSettings>>),
    Mobile(Arc<SettingsStore<AppState>>),
}

impl SettingsHandle {
    /// Hydrate the store for `profile` from `storage`.
    pub async fn load(profile: ClientProfile, storage: Arc<dyn KeyValueStorage>) -> Self {
        match profile {
            ClientProfile::Web => Self::Web(Arc::new(SettingsStore::load(storage).await)),
            ClientProfile::Mobile => Self::Mobile(Arc::new(SettingsStore::load(storage).await)),
        }
    }

    pub fn profile(&self) -> ClientProfile {
        match self {
            Self::Web(_) => ClientProfile::Web,
            Self::Mobile(_) => ClientProfile::Mobile,
        }
    }

    pub fn source(&self) -> Arc<dyn SettingsSource> {
        match self {
            Self::Web(store) => store.clone() as Arc<dyn SettingsSource>,
            Self::Mobile(store) => store.clone() as Arc<dyn SettingsSource>,
        }
    }
}

/// Shared, explicitly constructed client state.
pub struct AppContext {
    pub config: Config,
    pub settings: SettingsHandle,
    pub client: ApiClient,
    pub preferences: Arc<PreferencesStore>,
    pub alerts: Arc<dyn AlertSink>,
}

impl AppContext {
    /// Load settings and build the API client.
    pub async fn init(
        config: Config,
        storage: Arc<dyn KeyValueStorage>,
        overrides: SessionOverrides,
        alerts: Arc<dyn AlertSink>,
    ) -> Result<Self, ApiError> {
        let settings = SettingsHandle::load(config.profile, storage).await;

        let source: Arc<dyn SettingsSource> = if overrides.is_empty() {
            settings.source()
        } else {
            info!("Applying session overrides from environment");
            Arc::new(OverlaySource::new(settings.source(), overrides))
        };

        let client = ApiClient::with_timeout(source, config.request_timeout())?;
        info!(
            profile = %config.profile,
            base_url = %client.settings().api_base_url(),
            "Client context ready"
        );

        Ok(Self {
            config,
            settings,
            client,
            preferences: Arc::new(PreferencesStore::new()),
            alerts,
        })
    }

    pub fn chat(&self) -> ChatController {
        ChatController::new(self.client.clone(), self.config.persona.clone())
    }

    pub fn reminders(&self) -> RemindersController {
        RemindersController::new(self.client.clone())
    }

    pub fn admin(&self) -> AdminController {
        AdminController::new(self.client.clone())
    }

    pub fn settings(&self) -> SettingsController {
        SettingsController::new(self.settings.clone(), self.preferences.clone())
    }

    /// Push registration is only available with the mobile profile.
    pub fn push_registrar(
        &self,
        platform: Arc<dyn PushPlatform>,
    ) -> Result<PushRegistrar, ApiError> {
        match &self.settings {
            SettingsHandle::Mobile(store) => Ok(PushRegistrar::new(
                store.clone(),
                self.client.clone(),
                platform,
                self.alerts.clone(),
            )),
            SettingsHandle::Web(_) => Err(ApiError::precondition(
                "Push registration requires the mobile profile",
            )),
        }
    }
}
