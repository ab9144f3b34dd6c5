//! Enrichment envelope
//!
//! The location and account metadata attached to every record of a batch.
//! Values are copied verbatim from the query string: no coercion, no
//! validation beyond presence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::errors::{EnrichmentError, EnrichmentResult};

/// Query-string parameters of one invocation
pub type QueryParams = BTreeMap<String, String>;

/// Parameters that must be present on every POST, in reporting order
pub const REQUIRED_PARAMETERS: [&str; 10] = [
    "asn",
    "site",
    "account",
    "epoch",
    "state",
    "city",
    "country",
    "postalcode",
    "latitude",
    "longitude",
];

/// Postal and geographic location of the reporting site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub state: String,
    pub city: String,
    pub country: String,
    pub postalcode: String,
    pub latitude: String,
    pub longitude: String,
}

/// Metadata merged into each record under the `enrichment` key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub asn: String,
    pub site: String,
    pub account: String,
    pub epoch: String,
    pub address: Address,
}

impl Envelope {
    /// Build an envelope from query parameters.
    ///
    /// Every required key is checked before failing, so the error names all
    /// absent keys rather than just the first. Empty values count as present.
    pub fn from_query(params: &QueryParams) -> EnrichmentResult<Self> {
        let missing: Vec<String> = REQUIRED_PARAMETERS
            .iter()
            .filter(|name| !params.contains_key(**name))
            .map(|name| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(EnrichmentError::MissingParameters(missing));
        }

        let take = |name: &str| params.get(name).cloned().unwrap_or_default();

        Ok(Self {
            asn: take("asn"),
            site: take("site"),
            account: take("account"),
            epoch: take("epoch"),
            address: Address {
                state: take("state"),
                city: take("city"),
                country: take("country"),
                postalcode: take("postalcode"),
                latitude: take("latitude"),
                longitude: take("longitude"),
            },
        })
    }

    /// Partition key shared by every entry of the batch
    pub fn partition_key(&self) -> &str {
        &self.account
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_params() -> QueryParams {
        [
            ("account", "acct-1"),
            ("asn", "1"),
            ("site", "s"),
            ("epoch", "0"),
            ("state", "CA"),
            ("city", "SF"),
            ("country", "US"),
            ("postalcode", "94110"),
            ("latitude", "37.7"),
            ("longitude", "-122.4"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_from_query_copies_values_verbatim() {
        let envelope = Envelope::from_query(&full_params()).unwrap();
        assert_eq!(envelope.account, "acct-1");
        assert_eq!(envelope.asn, "1");
        assert_eq!(envelope.address.latitude, "37.7");
        assert_eq!(envelope.address.longitude, "-122.4");
        assert_eq!(envelope.partition_key(), "acct-1");
    }

    #[test]
    fn test_from_query_is_deterministic() {
        let params = full_params();
        assert_eq!(
            Envelope::from_query(&params).unwrap(),
            Envelope::from_query(&params).unwrap()
        );
    }

    #[test]
    fn test_missing_parameters_all_reported_in_order() {
        let mut params = full_params();
        params.remove("longitude");
        params.remove("asn");
        params.remove("city");

        let err = Envelope::from_query(&params).unwrap_err();
        assert_eq!(
            err,
            EnrichmentError::MissingParameters(vec![
                "asn".to_string(),
                "city".to_string(),
                "longitude".to_string(),
            ])
        );
    }

    #[test]
    fn test_no_parameters_reports_all_ten() {
        let err = Envelope::from_query(&QueryParams::new()).unwrap_err();
        assert_eq!(err.missing().len(), REQUIRED_PARAMETERS.len());
    }

    #[test]
    fn test_empty_value_counts_as_present() {
        let mut params = full_params();
        params.insert("site".to_string(), String::new());
        let envelope = Envelope::from_query(&params).unwrap();
        assert_eq!(envelope.site, "");
    }

    #[test]
    fn test_extra_parameters_ignored() {
        let mut params = full_params();
        params.insert("debug".to_string(), "1".to_string());
        assert!(Envelope::from_query(&params).is_ok());
    }

    #[test]
    fn test_serialized_layout() {
        let envelope = Envelope::from_query(&full_params()).unwrap();
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "asn": "1",
                "site": "s",
                "account": "acct-1",
                "epoch": "0",
                "address": {
                    "state": "CA",
                    "city": "SF",
                    "country": "US",
                    "postalcode": "94110",
                    "latitude": "37.7",
                    "longitude": "-122.4"
                }
            })
        );
    }
}
