//! CAPTCHA generation: the puzzle engine and the challenge image renderer.
//!
//! A challenge is a symbolic-derivative problem whose unknown `x` is the
//! secret key of a randomly chosen pattern image. The problem statement is
//! composited onto the artwork under a layer of anti-OCR noise glyphs.

mod catalog;
mod problem;
mod renderer;

pub use catalog::PatternCatalog;
pub use problem::ProblemGenerator;
pub use renderer::ChallengeRenderer;
