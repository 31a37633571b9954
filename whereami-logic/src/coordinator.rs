use log::{debug, error, info, warn};
use tokio::sync::RwLock;

use crate::{
    geocode::{Geocoder, Placemark},
    location::{AuthorizationStatus, Coordinate, LocationService, bootstrap_permissions},
    prelude::*,
    record::{AddressRecord, RecordId, RecordList, RecordListError, RowText},
};

pub trait StateUpdateSender: Send + Sync {
    /// Ask the view to re-render the whole list
    fn send_update(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A location request was already in flight, nothing was done
    Debounced,
    /// A fix arrived while no request was in flight and was thrown away
    Stale,
    /// Getting the location failed, contains the reason
    LocationFailed(String),
    /// A new record was added at the front of the list
    Added(RecordId),
}

#[derive(Debug, Default)]
struct CoordinatorState {
    records: RecordList,
    /// Set from the moment a location request is issued until it resolves
    locating: bool,
}

/// Owns the list of recorded locations. Gets fixes from a [LocationService], turns them into
/// addresses with a [Geocoder], and tells the view to redraw through a [StateUpdateSender].
pub struct RequestCoordinator<L: LocationService, G: Geocoder, S: StateUpdateSender> {
    state: RwLock<CoordinatorState>,
    location: L,
    geocoder: G,
    state_update_sender: S,
}

impl<L: LocationService, G: Geocoder, S: StateUpdateSender> RequestCoordinator<L, G, S> {
    pub fn new(location: L, geocoder: G, state_update_sender: S) -> Self {
        Self {
            state: RwLock::new(CoordinatorState::default()),
            location,
            geocoder,
            state_update_sender,
        }
    }

    pub async fn bootstrap_permissions(&self) -> Result<AuthorizationStatus> {
        bootstrap_permissions(&self.location).await
    }

    /// Record the current location. Does nothing if we're still waiting on a previous fix.
    ///
    /// Resolves once the record's geocoding has finished (or failed), callers that only care
    /// about kicking things off should spawn this.
    pub async fn trigger_add(&self) -> AddOutcome {
        if !self.begin_location_request().await {
            debug!("Already getting location, ignoring add");
            return AddOutcome::Debounced;
        }

        let fix = self.location.request_location().await;
        let coordinate = fix.as_ref().ok().copied();
        let outcome = self.on_location_result(fix).await;

        if let (AddOutcome::Added(id), Some(coordinate)) = (&outcome, coordinate) {
            let placemarks = self.geocoder.reverse_geocode(coordinate).await;
            self.on_geocode_result(*id, placemarks).await;
        }

        outcome
    }

    /// Returns `false` if a request is already in flight
    async fn begin_location_request(&self) -> bool {
        let mut state = self.state.write().await;
        if state.locating {
            false
        } else {
            state.locating = true;
            true
        }
    }

    /// Handle a fix (or failure) from the location service
    pub async fn on_location_result(&self, fix: Result<Coordinate>) -> AddOutcome {
        let mut state = self.state.write().await;

        if !state.locating {
            debug!("Got a location while not waiting for one, ignoring: {fix:?}");
            return AddOutcome::Stale;
        }

        state.locating = false;

        match fix {
            Ok(coordinate) => {
                info!("Got location: {coordinate}");
                let record = AddressRecord::new(coordinate);
                let id = record.id();
                state.records.push_front(record);
                drop(state);
                self.state_update_sender.send_update();
                AddOutcome::Added(id)
            }
            Err(why) => {
                error!("Failed to get location: {why:?}");
                AddOutcome::LocationFailed(format!("{why:#}"))
            }
        }
    }

    /// Handle the geocoder's answer for the record `id`. Only the first placemark is
    /// considered. Returns whether the record's address was set.
    pub async fn on_geocode_result(
        &self,
        id: RecordId,
        placemarks: Result<Vec<Placemark>>,
    ) -> bool {
        let placemarks = match placemarks {
            Ok(placemarks) => placemarks,
            Err(why) => {
                warn!("Failed to reverse geocode record {id}: {why:?}");
                return false;
            }
        };

        let Some(address) = placemarks.first().and_then(Placemark::formatted_address) else {
            warn!("No usable address for record {id}, it will stay empty");
            return false;
        };

        info!("Resolved address: {address}");

        let mut state = self.state.write().await;
        if state.records.resolve_address(id, address) {
            drop(state);
            self.state_update_sender.send_update();
            true
        } else {
            debug!("Record {id} was deleted or already resolved, dropping address");
            false
        }
    }

    pub async fn is_locating(&self) -> bool {
        self.state.read().await.locating
    }

    pub async fn count(&self) -> usize {
        self.state.read().await.records.count()
    }

    pub async fn record_at(&self, index: usize) -> Option<AddressRecord> {
        self.state.read().await.records.record_at(index).cloned()
    }

    pub async fn row_text(&self, index: usize) -> Result<RowText, RecordListError> {
        self.state.read().await.records.row_text(index)
    }

    pub async fn rows(&self) -> Vec<RowText> {
        self.state.read().await.records.rows()
    }

    /// Remove the record at `index`, later records move down by one
    pub async fn delete_at(&self, index: usize) -> Result<AddressRecord, RecordListError> {
        let mut state = self.state.write().await;
        let removed = state.records.delete_at(index)?;
        drop(state);
        self.state_update_sender.send_update();
        Ok(removed)
    }
}
