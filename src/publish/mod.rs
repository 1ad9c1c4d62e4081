//! Dataset serialization and the version-control sink.

mod dataset;
mod git;

pub use dataset::serialize_dataset;
pub use git::{authenticated_url, commit_message, redact, GitPublisher, PublishOutcome, Publisher};
