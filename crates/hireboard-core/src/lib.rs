pub mod board;
pub mod error;
pub mod fields;
pub mod id;
pub mod memory;
pub mod models;
pub mod query;
pub mod repository;
pub mod session;
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;
pub mod traits;

pub use board::{
    ApplicationView, CandidateRoster, JobBoard, JobDetail, JobListing, RosterEntry, SavedJobView,
    UNKNOWN_COMPANY,
};
pub use error::AppError;
pub use id::RecordId;
pub use memory::MemoryRecordClient;
pub use query::{Condition, Operator, OrderBy, Query, SortDirection};
pub use session::Session;
pub use traits::{Envelope, MutationEnvelope, MutationResult, RecordClient};
