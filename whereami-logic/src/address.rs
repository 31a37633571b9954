use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, specta::Type)]
/// Structured postal address as reported by a geocoder. Missing parts are empty strings.
pub struct PostalAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl PostalAddress {
    /// Build from a platform-style address dictionary (keys `Street`, `City`, `State`, `ZIP`,
    /// `Country`), any other key is ignored.
    pub fn from_address_dictionary(dict: &HashMap<String, String>) -> Self {
        let field = |key: &str| dict.get(key).cloned().unwrap_or_default();
        Self {
            street: field("Street"),
            city: field("City"),
            state: field("State"),
            postal_code: field("ZIP"),
            country: field("Country"),
        }
    }

    pub fn is_empty(&self) -> bool {
        [
            &self.street,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .all(|part| part.trim().is_empty())
    }

    /// Multi-line mailing address, blank lines are left out:
    ///
    /// ```text
    /// street
    /// city, state postal_code
    /// country
    /// ```
    pub fn mailing_address(&self) -> String {
        let region = join_non_empty(&[&self.state, &self.postal_code], " ");
        let locality = join_non_empty(&[&self.city, &region], ", ");

        join_non_empty(&[&self.street, &locality, &self.country], "\n")
    }

    /// The mailing address collapsed onto one line
    pub fn to_single_line(&self) -> String {
        single_line(&self.mailing_address())
    }
}

fn join_non_empty(parts: &[&str], sep: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Replace every line break with `", "`
pub fn single_line(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_springfield() {
        let addr = PostalAddress::from_address_dictionary(&dict(&[
            ("Street", "1 Main St"),
            ("City", "Springfield"),
            ("State", "IL"),
            ("ZIP", "62701"),
        ]));

        let line = addr.to_single_line();

        assert_eq!(line, "1 Main St, Springfield, IL 62701");
        assert!(!line.contains('\n'));
        for part in ["1 Main St", "Springfield", "IL", "62701"] {
            assert!(line.contains(part), "{part} missing from {line}");
        }
    }

    #[test]
    fn test_missing_keys_default_empty() {
        let addr = PostalAddress::from_address_dictionary(&dict(&[("City", "Paris")]));
        assert_eq!(addr.street, "");
        assert_eq!(addr.postal_code, "");
        assert_eq!(addr.to_single_line(), "Paris");
    }

    #[test]
    fn test_with_country() {
        let addr = PostalAddress {
            street: "10 Downing St".into(),
            city: "London".into(),
            postal_code: "SW1A 2AA".into(),
            country: "United Kingdom".into(),
            ..Default::default()
        };
        assert_eq!(
            addr.mailing_address(),
            "10 Downing St\nLondon, SW1A 2AA\nUnited Kingdom"
        );
        assert_eq!(
            addr.to_single_line(),
            "10 Downing St, London, SW1A 2AA, United Kingdom"
        );
    }

    #[test]
    fn test_empty() {
        let addr = PostalAddress::from_address_dictionary(&HashMap::new());
        assert!(addr.is_empty());
        assert_eq!(addr.to_single_line(), "");
    }

    #[test]
    fn test_embedded_breaks_in_fields() {
        let addr = PostalAddress {
            street: "Apt 4\n1 Main St".into(),
            city: "Springfield".into(),
            ..Default::default()
        };
        assert_eq!(addr.to_single_line(), "Apt 4, 1 Main St, Springfield");
    }
}
