use clap::Parser;
use scholar::{Backend, Session, StoreConfig};
use tracing::{error, info};

/// The CLI for the Scholar walkthrough.
///
/// Connects to a document store, runs the CRUD and aggregation walkthrough
/// over one collection, logs every result and disconnects.
///
/// # Examples
///
/// Against a local MongoDB:
/// ```bash
/// scholar
/// ```
///
/// Without a server:
/// ```bash
/// scholar --backend memory -v
/// ```
#[derive(Parser, Debug)]
#[command(name = "scholar")]
#[command(about = "A narrated MongoDB CRUD and aggregation walkthrough")]
pub struct Cli {
    /// MongoDB connection string
    #[arg(long, value_name = "URI", default_value = scholar::constants::DEFAULT_URI)]
    pub uri: String,

    /// Database to run against
    #[arg(long, value_name = "NAME", default_value = scholar::constants::DEFAULT_DATABASE)]
    pub database: String,

    /// Collection to run against; it is emptied first
    #[arg(long, value_name = "NAME", default_value = scholar::constants::DEFAULT_COLLECTION)]
    pub collection: String,

    /// Document store implementation.
    ///
    /// Options:
    /// - mongo (a MongoDB server at --uri, default)
    /// - memory (in-process, no server needed)
    #[arg(long, value_name = "BACKEND", default_value = "mongo", value_parser = ["mongo", "memory"])]
    pub backend: String,

    /// Output logs in JSON format
    #[arg(long)]
    pub json: bool,

    /// Increase verbosity (can be used multiple times: -v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Builds the store configuration from the parsed flags.
    ///
    /// # Errors
    ///
    /// Returns `ScholarError::ConfigError` for an unknown backend.
    pub fn store_config(&self) -> scholar::Result<StoreConfig> {
        Ok(StoreConfig {
            uri:        self.uri.clone(),
            database:   self.database.clone(),
            collection: self.collection.clone(),
            backend:    self.backend.parse::<Backend>()?,
        })
    }
}

/// Execute the walkthrough described by the parsed arguments.
///
/// A failed connection is fatal and nothing else runs. Once connected, the
/// session releases the store whether or not the walkthrough succeeds.
///
/// # Returns
/// Returns `Ok(())` on success, or the connection or walkthrough error.
pub async fn run_command(cli: Cli) -> scholar::Result<()> {
    let config = cli.store_config()?;
    info!(
        "Using {} backend, database '{}', collection '{}'",
        config.backend, config.database, config.collection
    );

    let session = match Session::connect(&config).await {
        Ok(session) => session,
        Err(e) => {
            error!("Could not connect to database: {}", e);
            return Err(e);
        },
    };

    let report = session.run().await?;
    info!(
        "Walkthrough finished: {} documents at peak, {} remaining",
        report.count, report.count_after
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["scholar"]).unwrap();
        assert_eq!(cli.uri, "mongodb://localhost:27017/");
        assert_eq!(cli.database, "school");
        assert_eq!(cli.collection, "students");
        assert_eq!(cli.backend, "mongo");
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.store_config().unwrap(), StoreConfig::default());
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "scholar",
            "--uri",
            "mongodb://db.internal:27018/",
            "--database",
            "campus",
            "--collection",
            "alumni",
            "--backend",
            "memory",
            "--json",
            "-vv",
        ])
        .unwrap();
        let config = cli.store_config().unwrap();
        assert_eq!(config.uri, "mongodb://db.internal:27018/");
        assert_eq!(config.database, "campus");
        assert_eq!(config.collection, "alumni");
        assert_eq!(config.backend, Backend::Memory);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_rejects_unknown_backend() {
        assert!(Cli::try_parse_from(["scholar", "--backend", "sqlite"]).is_err());
    }

    #[tokio::test]
    async fn test_run_command_memory_backend() {
        let cli = Cli::try_parse_from(["scholar", "--backend", "memory"]).unwrap();
        assert!(run_command(cli).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_command_invalid_database_is_fatal() {
        let cli = Cli::try_parse_from(["scholar", "--backend", "memory", "--database", "a.b"]).unwrap();
        assert!(run_command(cli).await.is_err());
    }
}
