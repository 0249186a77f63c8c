//! # doc-gate
//!
//! Documentation governance at commit time.
//!
//! doc-gate maps code files to the documents that own them, blocks commits
//! that change critical code without updating its invariants, and scores how
//! much the documentation can be trusted.
//!
//! ## Quick Start
//!
//! ```rust
//! use doc_gate::VERSION;
//!
//! println!("doc-gate {VERSION}");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod docs;
pub mod git;
pub mod score;
pub mod validate;

pub use crate::cli::Cli;

/// The current version of doc-gate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
