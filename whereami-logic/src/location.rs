use std::fmt;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// A "part" of a coordinate, in degrees
pub type CoordinateComponent = f64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, specta::Type)]
/// Some point in the world as gotten from a Geolocation API
pub struct Coordinate {
    /// Latitude
    pub lat: CoordinateComponent,
    /// Longitude
    pub long: CoordinateComponent,
}

impl Coordinate {
    pub fn new(lat: CoordinateComponent, long: CoordinateComponent) -> Self {
        Self { lat, long }
    }
}

/// Plain decimal, whole degrees keep one fractional digit ("37.0", not "37")
fn fmt_degrees(f: &mut fmt::Formatter<'_>, degrees: CoordinateComponent) -> fmt::Result {
    if degrees.is_finite() && degrees.fract() == 0.0 {
        write!(f, "{degrees:.1}")
    } else {
        write!(f, "{degrees}")
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_degrees(f, self.lat)?;
        f.write_str("; ")?;
        fmt_degrees(f, self.long)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, specta::Type)]
/// Whether the app may use location services
pub enum AuthorizationStatus {
    /// Allowed, either always or while the app is in use
    Authorized,
    /// The user hasn't been asked yet
    Undetermined,
    /// Denied by the user or restricted by the device
    Denied,
}

pub trait LocationService: Send + Sync {
    /// Check the current authorization state, this must not prompt the user
    fn authorization_status(&self) -> impl Future<Output = Result<AuthorizationStatus>> + Send;
    /// Ask the user for permission, resolves with whatever state the platform reports after
    fn request_authorization(&self) -> impl Future<Output = Result<AuthorizationStatus>> + Send;
    /// Get a single fix of the device's current position
    fn request_location(&self) -> impl Future<Output = Result<Coordinate>> + Send;
}

/// Run once at startup. Only prompts when the user hasn't decided yet, anything else is just
/// logged.
pub async fn bootstrap_permissions<L: LocationService>(
    location: &L,
) -> Result<AuthorizationStatus> {
    let status = location
        .authorization_status()
        .await
        .context("Failed to check location authorization")?;

    match status {
        AuthorizationStatus::Authorized => {
            info!("Already authorized to use location services");
        }
        AuthorizationStatus::Undetermined => {
            info!("User will be asked if we can use location services");
            let new_status = location
                .request_authorization()
                .await
                .context("Failed to request location authorization")?;
            info!("New authorization status: {new_status:?}");
        }
        AuthorizationStatus::Denied => {
            warn!("Not authorized to use location services");
        }
    }

    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::MockLocation;

    #[test]
    fn test_coordinate_display() {
        assert_eq!(Coordinate::new(37.0, -122.0).to_string(), "37.0; -122.0");
        assert_eq!(
            Coordinate::new(47.6062, -122.3321).to_string(),
            "47.6062; -122.3321"
        );
    }

    #[test]
    fn test_coordinate_display_no_exponent() {
        assert_eq!(
            Coordinate::new(0.00001, 1e20).to_string(),
            "0.00001; 100000000000000000000.0"
        );
        assert_eq!(Coordinate::new(-0.5, 0.0).to_string(), "-0.5; 0.0");
    }

    #[tokio::test]
    async fn test_bootstrap_authorized_does_not_prompt() {
        let (location, _fixes) = MockLocation::new(AuthorizationStatus::Authorized);
        let status = bootstrap_permissions(&location).await.unwrap();
        assert_eq!(status, AuthorizationStatus::Authorized);
        assert_eq!(location.authorization_requests(), 0);
    }

    #[tokio::test]
    async fn test_bootstrap_undetermined_prompts_once() {
        let (location, _fixes) = MockLocation::new(AuthorizationStatus::Undetermined);
        let status = bootstrap_permissions(&location).await.unwrap();
        assert_eq!(status, AuthorizationStatus::Undetermined);
        assert_eq!(location.authorization_requests(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_denied_does_not_prompt() {
        let (location, _fixes) = MockLocation::new(AuthorizationStatus::Denied);
        let status = bootstrap_permissions(&location).await.unwrap();
        assert_eq!(status, AuthorizationStatus::Denied);
        assert_eq!(location.authorization_requests(), 0);
    }
}
