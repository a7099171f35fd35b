pub mod comparison;
pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod filter;
pub mod memory;
pub mod mongo;
pub mod pipeline;
pub mod projection;
pub mod session;
pub mod store;
pub mod update;
pub mod walkthrough;

pub use config::{Backend, StoreConfig};
pub use document::Student;
pub use error::{Result, ScholarError};
pub use filter::Filter;
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use pipeline::{Pipeline, SortOrder, Stage};
pub use projection::Projection;
pub use session::{Session, SessionState};
pub use store::{DeleteOutcome, DocumentStore, InsertManyOutcome, InsertOneOutcome, UpdateOutcome};
pub use update::Update;
pub use walkthrough::WalkthroughReport;
