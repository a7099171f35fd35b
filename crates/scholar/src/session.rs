use std::fmt;

use tracing::{error, info, warn};

use crate::{
    config::{Backend, StoreConfig},
    error::Result,
    memory::MemoryStore,
    mongo::MongoStore,
    store::DocumentStore,
    walkthrough::{self, WalkthroughReport},
};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection held
    Disconnected,
    /// Connection established, nothing run yet
    Connected,
    /// The walkthrough is in progress
    Operating,
    /// A step failed; the connection is still held until release
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::Operating => "operating",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Owns the connection to a document store for one run.
///
/// The store is released exactly once, by [`Session::run`], whether the
/// walkthrough succeeds or fails.
pub struct Session {
    /// The connected store
    store: Box<dyn DocumentStore>,
    /// Where the session is in its lifecycle
    state: SessionState,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("backend", &self.store.backend_name())
            .field("state", &self.state)
            .finish()
    }
}

impl Session {
    /// Connects to the backend named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `ScholarError::ConfigError` for unusable names and
    /// `ScholarError::Connection` when the server cannot be reached. Both are
    /// fatal: no operation has been attempted.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        let store: Box<dyn DocumentStore> = match config.backend {
            Backend::Mongo => Box::new(MongoStore::connect(config).await?),
            Backend::Memory => {
                info!("Using the in-memory store");
                Box::new(MemoryStore::new())
            },
        };
        Ok(Self::from_store(store))
    }

    /// Wraps an already connected store.
    pub fn from_store(store: Box<dyn DocumentStore>) -> Self {
        Self {
            store,
            state: SessionState::Connected,
        }
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> SessionState { self.state }

    /// The connected store.
    pub fn store(&self) -> &dyn DocumentStore { self.store.as_ref() }

    /// Runs the walkthrough, then releases the store on every path.
    ///
    /// A failure in the walkthrough is logged and returned; a failure while
    /// releasing is only logged, so it never masks the walkthrough's result.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing walkthrough step.
    pub async fn run(mut self) -> Result<WalkthroughReport> {
        self.state = SessionState::Operating;
        let outcome = walkthrough::run(self.store.as_ref()).await;
        if let Err(ref e) = outcome {
            self.state = SessionState::Failed;
            error!("Walkthrough failed: {}", e);
        }
        self.release().await;
        outcome
    }

    /// Releases the store and returns to `Disconnected`.
    async fn release(&mut self) {
        info!("Closing connection...");
        if let Err(e) = self.store.close().await {
            warn!("Error while closing the {} store: {}", self.store.backend_name(), e);
        }
        self.state = SessionState::Disconnected;
    }
}
