//! # Rookery Common
//!
//! Shared types, errors, and constants used across Rookery components.
//!
//! ## Modules
//! - `types` - Core data structures (ChallengeProblem, VerificationSession, Verdict)
//! - `error` - Common error types
//! - `constants` - Shared configuration constants

pub mod constants;
pub mod error;
pub mod types;

pub use error::GateError;
pub use types::*;
