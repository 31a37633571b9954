const fn server_host() -> &'static str {
    if let Some(host) = option_env!("GEOCODER_HOST") {
        host
    } else {
        "nominatim.openstreetmap.org"
    }
}

const fn server_secure() -> bool {
    if let Some(secure) = option_env!("GEOCODER_SECURE") {
        !(const_str::eq_ignore_ascii_case!(secure, "false") || const_str::equal!(secure, "0"))
    } else {
        true
    }
}

const fn server_http_proto() -> &'static str {
    if server_secure() { "https" } else { "http" }
}

const DEFAULT_USER_AGENT: &str = const_str::concat!("whereami/", env!("CARGO_PKG_VERSION"));

const fn user_agent() -> &'static str {
    if let Some(agent) = option_env!("GEOCODER_USER_AGENT") {
        agent
    } else {
        DEFAULT_USER_AGENT
    }
}

const SERVER_HOST: &str = server_host();
const SERVER_HTTP_PROTO: &str = server_http_proto();

/// Where reverse geocoding requests go, set with `GEOCODER_HOST` and `GEOCODER_SECURE` at
/// build time
pub const GEOCODER_BASE_URL: &str = const_str::concat!(SERVER_HTTP_PROTO, "://", SERVER_HOST);

/// Nominatim's usage policy requires an identifying user agent
pub const GEOCODER_USER_AGENT: &str = user_agent();

pub fn reverse_url(base_url: &str, lat: f64, long: f64) -> String {
    let base_url = base_url.trim_end_matches('/');
    format!("{base_url}/reverse?format=jsonv2&addressdetails=1&lat={lat}&lon={long}")
}
