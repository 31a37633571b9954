mod address;
mod coordinator;
mod geocode;
mod location;
mod record;
#[cfg(test)]
mod tests;

pub use address::{PostalAddress, single_line};
pub use coordinator::{AddOutcome, RequestCoordinator, StateUpdateSender};
pub use geocode::{Geocoder, Placemark};
pub use location::{AuthorizationStatus, Coordinate, LocationService, bootstrap_permissions};
pub use record::{AddressRecord, RecordId, RecordList, RecordListError, RowText};

pub mod prelude {
    use anyhow::Error as AnyhowError;
    use std::result::Result as StdResult;
    pub type Result<T = (), E = AnyhowError> = StdResult<T, E>;
    pub use anyhow::Context;
}
