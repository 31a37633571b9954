use log::debug;
use reqwest::Client;
use serde::Deserialize;

use whereami_logic::{Coordinate, Geocoder, Placemark, PostalAddress, prelude::*};

use crate::server::{self, GEOCODER_BASE_URL, GEOCODER_USER_AGENT};

/// Reverse geocoding through a Nominatim (OpenStreetMap) server
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// Use the server configured at build time
    pub fn new() -> Result<Self> {
        Self::with_base_url(GEOCODER_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(GEOCODER_USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl Geocoder for NominatimGeocoder {
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Vec<Placemark>> {
        let url = server::reverse_url(&self.base_url, coordinate.lat, coordinate.long);
        debug!("Reverse geocoding {coordinate} via {url}");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("Could not send request")?
            .error_for_status()
            .context("Server returned error")?
            .json::<ReverseResponse>()
            .await
            .context("Failed to parse reverse geocoding response")?;

        Ok(resp.into_placemarks())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReverseResponse {
    /// Nominatim answers 200 with an `error` field when nothing is near the point
    NotFound { error: String },
    Found { address: Option<NominatimAddress> },
}

impl ReverseResponse {
    fn into_placemarks(self) -> Vec<Placemark> {
        match self {
            Self::NotFound { error } => {
                debug!("Nothing found: {error}");
                vec![]
            }
            Self::Found { address } => vec![Placemark {
                address: address.map(NominatimAddress::into_postal_address),
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    house_number: Option<String>,
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    municipality: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
}

impl NominatimAddress {
    fn into_postal_address(self) -> PostalAddress {
        let street = match (self.house_number, self.road) {
            (Some(number), Some(road)) => format!("{number} {road}"),
            (None, Some(road)) => road,
            (Some(number), None) => number,
            (None, None) => String::new(),
        };

        let city = [
            self.city,
            self.town,
            self.village,
            self.hamlet,
            self.municipality,
        ]
        .into_iter()
        .flatten()
        .next()
        .unwrap_or_default();

        PostalAddress {
            street,
            city,
            state: self.state.unwrap_or_default(),
            postal_code: self.postcode.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Vec<Placemark> {
        serde_json::from_str::<ReverseResponse>(raw)
            .expect("Failed to parse")
            .into_placemarks()
    }

    #[test]
    fn test_full_address() {
        let placemarks = parse(
            r#"{
                "place_id": 1,
                "lat": "39.8017",
                "lon": "-89.6436",
                "display_name": "1, Main Street, Springfield, Sangamon County, Illinois, 62701, United States",
                "address": {
                    "house_number": "1",
                    "road": "Main Street",
                    "city": "Springfield",
                    "county": "Sangamon County",
                    "state": "Illinois",
                    "ISO3166-2-lvl4": "US-IL",
                    "postcode": "62701",
                    "country": "United States",
                    "country_code": "us"
                }
            }"#,
        );

        assert_eq!(placemarks.len(), 1);
        assert_eq!(
            placemarks[0].address,
            Some(PostalAddress {
                street: "1 Main Street".into(),
                city: "Springfield".into(),
                state: "Illinois".into(),
                postal_code: "62701".into(),
                country: "United States".into(),
            })
        );
        assert_eq!(
            placemarks[0].formatted_address().as_deref(),
            Some("1 Main Street, Springfield, Illinois 62701, United States")
        );
    }

    #[test]
    fn test_town_fallback() {
        let placemarks = parse(
            r#"{"address": {"road": "High Street", "town": "Bakewell", "country": "United Kingdom"}}"#,
        );
        let address = placemarks[0].address.clone().unwrap();
        assert_eq!(address.street, "High Street");
        assert_eq!(address.city, "Bakewell");
        assert_eq!(address.postal_code, "");
    }

    #[test]
    fn test_no_address_details() {
        let placemarks = parse(r#"{"place_id": 5, "display_name": "Somewhere"}"#);
        assert_eq!(placemarks, vec![Placemark { address: None }]);
        assert_eq!(placemarks[0].formatted_address(), None);
    }

    #[test]
    fn test_unable_to_geocode() {
        let placemarks = parse(r#"{"error": "Unable to geocode"}"#);
        assert!(placemarks.is_empty());
    }
}
