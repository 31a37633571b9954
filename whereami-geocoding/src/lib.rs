mod nominatim;
mod server;

pub use nominatim::NominatimGeocoder;
pub use server::{GEOCODER_BASE_URL, GEOCODER_USER_AGENT};
