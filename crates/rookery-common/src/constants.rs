//! Shared constants for Rookery components.

/// Default directory holding pattern artwork
pub const DEFAULT_ASSET_DIR: &str = "assets/patterns";

/// Default TrueType font for challenge text
pub const DEFAULT_FONT_PATH: &str = "assets/fonts/DejaVuSans.ttf";

/// Challenge validity window (10 minutes)
pub const DEFAULT_CHALLENGE_TTL_SECS: u64 = 600;

/// Wrong answers allowed before a session is discarded
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// How often the session sweeper scans for expired challenges (seconds)
pub const SWEEP_INTERVAL_SECS: u64 = 60;

/// Final canvas dimensions of a rendered challenge, in pixels
pub const CANVAS_WIDTH: u32 = 360;
pub const CANVAS_HEIGHT: u32 = 460;

/// Pattern artwork is resized to this square edge before compositing
pub const ARTWORK_SIZE: u32 = 360;
