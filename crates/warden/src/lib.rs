//! # Warden - Rookery Verification Engine
//!
//! The brain of Rookery. Generates polynomial-derivative CAPTCHA problems
//! keyed to secret pattern artwork, renders them onto noise-obfuscated
//! challenge images, and grades submitted answers.
//!
//! ## Architecture
//! ```text
//! Chat host (buttons/modals) → Warden → PNG challenge + session verdicts
//!                                 ↓
//!                          Asset store (pattern artwork, fonts)
//! ```
//!
//! The chat-platform host owns message delivery, role grants, and UI; this
//! crate owns everything between "user clicked Verify" and "answer graded".

pub mod captcha;
pub mod config;
pub mod session;

pub use captcha::{ChallengeRenderer, PatternCatalog, ProblemGenerator};
pub use config::AppConfig;
pub use session::SessionStore;
