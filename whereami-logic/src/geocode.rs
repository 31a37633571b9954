use serde::{Deserialize, Serialize};

use crate::{PostalAddress, location::Coordinate, prelude::*};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, specta::Type)]
/// A candidate result of reverse geocoding
pub struct Placemark {
    /// Structured address fields, `None` if the geocoder couldn't give any
    pub address: Option<PostalAddress>,
}

impl Placemark {
    pub fn new(address: PostalAddress) -> Self {
        Self {
            address: Some(address),
        }
    }

    /// The single-line address of this placemark, `None` if there's nothing to show
    pub fn formatted_address(&self) -> Option<String> {
        self.address
            .as_ref()
            .filter(|addr| !addr.is_empty())
            .map(PostalAddress::to_single_line)
    }
}

pub trait Geocoder: Send + Sync {
    /// Turn a coordinate into a list of candidate addresses, best match first
    fn reverse_geocode(
        &self,
        coordinate: Coordinate,
    ) -> impl Future<Output = Result<Vec<Placemark>>> + Send;
}
