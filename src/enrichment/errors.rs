//! Enrichment errors
//!
//! Raised while turning query parameters and a request body into stream
//! entries. All kinds are caller mistakes and map to 4xx responses.

use thiserror::Error;

/// Result type for enrichment operations
pub type EnrichmentResult<T> = Result<T, EnrichmentError>;

/// Enrichment errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrichmentError {
    /// One or more required query parameters are absent.
    ///
    /// Lists every absent key, in declaration order.
    #[error("Missing required parameters: {}", .0.join(", "))]
    MissingParameters(Vec<String>),

    /// Query string could not be decoded into parameters
    #[error("Malformed query string: {0}")]
    MalformedQuery(String),

    /// Body is not a JSON array of JSON objects
    #[error("Malformed body: {0}")]
    MalformedBody(String),
}

impl EnrichmentError {
    /// Malformed body error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedBody(msg.into())
    }

    /// Names of the missing parameters, empty for other kinds
    pub fn missing(&self) -> &[String] {
        match self {
            Self::MissingParameters(names) => names,
            Self::MalformedQuery(_) | Self::MalformedBody(_) => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameters_message_lists_all() {
        let err = EnrichmentError::MissingParameters(vec!["asn".into(), "city".into()]);
        assert_eq!(err.to_string(), "Missing required parameters: asn, city");
        assert_eq!(err.missing(), &["asn".to_string(), "city".to_string()]);
    }

    #[test]
    fn test_malformed_has_no_missing() {
        let err = EnrichmentError::malformed("not json");
        assert!(err.missing().is_empty());
        assert_eq!(err.to_string(), "Malformed body: not json");
    }

    #[test]
    fn test_malformed_query_names_decode_error() {
        let err = EnrichmentError::MalformedQuery("invalid percent-encoding".into());
        assert_eq!(err.to_string(), "Malformed query string: invalid percent-encoding");
        assert!(err.missing().is_empty());
    }
}
