use std::{fmt, str::FromStr};

use crate::{
    constants::{DEFAULT_COLLECTION, DEFAULT_DATABASE, DEFAULT_URI},
    error::{Result, ScholarError},
};

/// Which document store the session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// A MongoDB server reached through the official driver.
    #[default]
    Mongo,
    /// The in-process store, for offline runs and tests.
    Memory,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Mongo => f.write_str("mongo"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

impl FromStr for Backend {
    type Err = ScholarError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "memory" => Ok(Self::Memory),
            other => {
                Err(ScholarError::ConfigError {
                    message: format!("Invalid backend: {}", other),
                })
            },
        }
    }
}

/// Where the walkthrough connects and which collection it works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Connection string of the document store
    pub uri:        String,
    /// Database name
    pub database:   String,
    /// Collection name
    pub collection: String,
    /// Store implementation to use
    pub backend:    Backend,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri:        DEFAULT_URI.to_owned(),
            database:   DEFAULT_DATABASE.to_owned(),
            collection: DEFAULT_COLLECTION.to_owned(),
            backend:    Backend::default(),
        }
    }
}

impl StoreConfig {
    /// Checks that the names are usable before any connection attempt.
    ///
    /// # Errors
    ///
    /// Returns `ScholarError::ConfigError` when the database or collection
    /// name is empty, or the database name contains characters MongoDB
    /// rejects.
    pub fn validate(&self) -> Result<()> {
        if self.database.is_empty() {
            return Err(ScholarError::ConfigError {
                message: "Database name must not be empty".to_owned(),
            });
        }
        if let Some(c) = self
            .database
            .chars()
            .find(|c| matches!(*c, '/' | '\\' | '.' | ' ' | '"' | '$'))
        {
            return Err(ScholarError::ConfigError {
                message: format!("Database name '{}' contains invalid character '{}'", self.database, c),
            });
        }
        if self.collection.is_empty() {
            return Err(ScholarError::ConfigError {
                message: "Collection name must not be empty".to_owned(),
            });
        }
        if self.collection.starts_with("system.") || self.collection.contains('$') {
            return Err(ScholarError::ConfigError {
                message: format!("Invalid collection name: {}", self.collection),
            });
        }
        Ok(())
    }
}
