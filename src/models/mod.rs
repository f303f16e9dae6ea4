//! Request bodies sent to the backend.
//!
//! Responses are returned as untyped JSON; only the bodies the client builds
//! itself are modelled here.

mod job;
mod profile;

pub use job::{JobStatus, JobSubmission, JobType, DEFAULT_JOB_PRIORITY};
pub use profile::{ApiKeyRequest, Provider};
