use anyhow::anyhow;
use tauri::{AppHandle, plugin::PermissionState};
use tauri_plugin_geolocation::{GeolocationExt, PermissionType, PositionOptions};
use whereami_logic::{AuthorizationStatus, Coordinate, LocationService, prelude::*};

pub struct TauriLocation(AppHandle);

impl TauriLocation {
    pub fn new(app: AppHandle) -> Self {
        Self(app)
    }

    /// Plugin calls block until the platform answers, keep them off the async workers
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(AppHandle) -> Result<T> + Send + 'static,
    {
        let app = self.0.clone();
        tauri::async_runtime::spawn_blocking(move || f(app))
            .await
            .context("Location task failed")?
    }
}

// Roughly "hundred meters", a fresh fix isn't needed for an address
const OPTIONS: PositionOptions = PositionOptions {
    enable_high_accuracy: false,
    timeout: 10000,
    maximum_age: 0,
};

fn map_permission(state: PermissionState) -> AuthorizationStatus {
    match state {
        PermissionState::Granted => AuthorizationStatus::Authorized,
        PermissionState::Denied => AuthorizationStatus::Denied,
        _ => AuthorizationStatus::Undetermined,
    }
}

impl LocationService for TauriLocation {
    async fn authorization_status(&self) -> Result<AuthorizationStatus> {
        self.blocking(|app| {
            let status = app
                .geolocation()
                .check_permissions()
                .map_err(|why| anyhow!("Failed to check permissions: {why:?}"))?;
            Ok(map_permission(status.location))
        })
        .await
    }

    async fn request_authorization(&self) -> Result<AuthorizationStatus> {
        self.blocking(|app| {
            let status = app
                .geolocation()
                .request_permissions(Some(vec![PermissionType::Location]))
                .map_err(|why| anyhow!("Failed to request permissions: {why:?}"))?;
            Ok(map_permission(status.location))
        })
        .await
    }

    async fn request_location(&self) -> Result<Coordinate> {
        self.blocking(|app| {
            let pos = app
                .geolocation()
                .get_current_position(Some(OPTIONS))
                .map_err(|why| anyhow!("Failed to get location: {why:?}"))?;
            Ok(Coordinate::new(pos.coords.latitude, pos.coords.longitude))
        })
        .await
    }
}
