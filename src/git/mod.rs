//! Git operations: the staged-file abstraction.
//!
//! Version control is an external collaborator here. The rest of the crate
//! only ever sees a [`crate::validate::CommitCandidate`] built from the
//! staged snapshot this module takes at the start of a run.

pub mod repository;

pub use repository::{build_candidate, GitRepository};
