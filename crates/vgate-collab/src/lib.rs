//! Boundary to the external content service.
//!
//! Generation, quality assessment and channel adaptation are requested over
//! HTTP. [`Guarded`] bounds every call with a timeout and substitutes a
//! deterministic fallback on failure, so callers never branch on whether the
//! service is up.

pub mod client;
pub mod collaborator;
pub mod error;
pub mod fallback;
pub mod guarded;
pub mod types;

pub use client::HttpCollaborator;
pub use collaborator::{Collaborator, OfflineCollaborator, ServiceCollaborator};
pub use error::CollabError;
pub use fallback::{mock_idea, mock_idea_on, tagged_adaptation};
pub use guarded::Guarded;
pub use types::{Adaptation, Source, Sourced};
