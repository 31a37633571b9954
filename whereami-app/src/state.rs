use std::sync::Arc;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tauri::AppHandle;
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};
use tauri_specta::Event;
use whereami_geocoding::NominatimGeocoder;
use whereami_logic::{AddOutcome, RequestCoordinator, StateUpdateSender, prelude::*};

use crate::location::TauriLocation;

/// The list of records has changed, fetch the rows again
#[derive(Serialize, Deserialize, Clone, Default, Debug, specta::Type, tauri_specta::Event)]
pub struct RecordListUpdate;

pub struct TauriStateUpdateSender(AppHandle);

impl TauriStateUpdateSender {
    fn new(app: &AppHandle) -> Self {
        Self(app.clone())
    }
}

impl StateUpdateSender for TauriStateUpdateSender {
    fn send_update(&self) {
        if let Err(why) = RecordListUpdate.emit(&self.0) {
            error!("Error sending record list update to UI: {why:?}");
        }
    }
}

pub type Coordinator = RequestCoordinator<TauriLocation, NominatimGeocoder, TauriStateUpdateSender>;

pub type AppStateHandle = Arc<Coordinator>;

fn error_dialog(app: &AppHandle, msg: &str) {
    app.dialog()
        .message(msg)
        .kind(MessageDialogKind::Error)
        .show(|_| {});
}

pub fn create_coordinator(app: &AppHandle) -> Result<AppStateHandle> {
    let location = TauriLocation::new(app.clone());
    let geocoder = NominatimGeocoder::new().context("Failed to set up geocoder")?;
    let state_updates = TauriStateUpdateSender::new(app);
    Ok(Arc::new(Coordinator::new(location, geocoder, state_updates)))
}

/// Ask for location permission if the user hasn't decided yet
pub fn permission_bootstrap(coordinator: AppStateHandle) {
    tauri::async_runtime::spawn(async move {
        if let Err(why) = coordinator.bootstrap_permissions().await {
            warn!("Permission bootstrap failed: {why:?}");
        }
    });
}

/// Kick off recording the current location, returns right away
pub fn spawn_add_location(app: AppHandle, coordinator: AppStateHandle) {
    tauri::async_runtime::spawn(async move {
        match coordinator.trigger_add().await {
            AddOutcome::Added(id) => info!("Recorded location {id}"),
            AddOutcome::Debounced | AddOutcome::Stale => {}
            AddOutcome::LocationFailed(why) => {
                error_dialog(&app, &format!("Couldn't get your location\n\n{why}"));
            }
        }
    });
}
