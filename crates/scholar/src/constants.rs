//! Names and defaults shared by the library and the CLI.
//!
//! Centralized so the walkthrough, the stores and the CLI flags agree on the
//! same field names and connection defaults.

/// Default MongoDB connection string.
pub const DEFAULT_URI: &str = "mongodb://localhost:27017/";

/// Default database the walkthrough runs against.
pub const DEFAULT_DATABASE: &str = "school";

/// Default collection the walkthrough runs against.
pub const DEFAULT_COLLECTION: &str = "students";

/// Application name reported to the server in the connection handshake.
pub const APP_NAME: &str = "scholar";

/// Name of the unique key field every stored document carries.
pub const ID_FIELD: &str = "_id";

/// Name of the counter field produced by grouping stages.
pub const COUNT_FIELD: &str = "count";
