use thiserror::Error;

/// Scholar-wide error type.
///
/// Covers everything that can go wrong between the walkthrough and the
/// document store: driver failures, BSON/JSON conversion, configuration and
/// pipelines the in-memory store cannot evaluate.
#[derive(Error, Debug)]
pub enum ScholarError {
    /// The MongoDB driver reported a failure (network, server, command).
    #[error("MongoDB error: {source}")]
    Mongo {
        #[from]
        source: mongodb::error::Error,
    },

    /// A typed value could not be serialized into BSON
    #[error("BSON serialization error: {source}")]
    BsonSerialization {
        #[from]
        source: bson::ser::Error,
    },

    /// A BSON document could not be deserialized into a typed value
    #[error("BSON deserialization error: {source}")]
    BsonDeserialization {
        #[from]
        source: bson::de::Error,
    },

    /// JSON rendering failed
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// The session to the document store could not be established
    #[error("Could not connect to '{uri}': {reason}")]
    Connection {
        uri:    String,
        reason: String,
    },

    /// An aggregation stage is malformed or unsupported by the backend
    #[error("Invalid pipeline: {reason}")]
    InvalidPipeline {
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Generic error for unexpected conditions
    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

/// Result type alias for Scholar operations.
pub type Result<T> = std::result::Result<T, ScholarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_message() {
        let err = ScholarError::Connection {
            uri:    "mongodb://localhost:27017/".to_owned(),
            reason: "server selection timeout".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "Could not connect to 'mongodb://localhost:27017/': server selection timeout"
        );
    }

    #[test]
    fn test_json_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ScholarError = json_err.into();
        assert!(matches!(err, ScholarError::Json { .. }));
    }
}
