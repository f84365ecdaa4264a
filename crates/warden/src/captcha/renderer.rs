//! Challenge image renderer: pattern artwork + anti-OCR noise + problem text.
//!
//! The output is a single PNG: the pattern artwork on top, a band below for
//! the problem statement, and 50 semi-transparent glyphs scattered over the
//! whole canvas to frustrate naive OCR. Compositing is CPU-bound and does
//! file I/O, so the public entry point runs it on the blocking pool.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ab_glyph::{FontVec, PxScale};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rand::Rng;

use rookery_common::GateError;
use rookery_common::constants::{ARTWORK_SIZE, CANVAS_HEIGHT, CANVAS_WIDTH};

/// Extensions probed for pattern artwork, in preference order
const ARTWORK_EXTENSIONS: &[&str] = &["png", "gif", "jpg"];

/// Number of noise glyphs scattered over the canvas
const NOISE_GLYPH_COUNT: u32 = 50;

/// Probability of a noise glyph getting a second character
const SECOND_GLYPH_PROB: f64 = 0.3;

/// Noise glyph color: accent orange at low alpha
const NOISE_COLOR: Rgba<u8> = Rgba([200, 80, 0, 90]);

/// Problem text color: solid black
const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Font scale for the noise glyphs (large) and the problem text (small)
const NOISE_SCALE: f32 = 64.0;
const QUESTION_SCALE: f32 = 16.0;

/// Problem text layout: left margin, first baseline, line advance
const TEXT_LEFT: i32 = 10;
const TEXT_TOP: i32 = 380;
const LINE_SPACING: i32 = 25;

const FALLBACK_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Renders challenge problems onto noise-obfuscated pattern images.
///
/// Holds no mutable state; any number of renders may run concurrently.
pub struct ChallengeRenderer {
    asset_dir: PathBuf,
    font: Arc<FontVec>,
}

impl ChallengeRenderer {
    /// Create a renderer over an artwork directory.
    ///
    /// Font resolution never fails: if the configured font cannot be read or
    /// parsed, the embedded DejaVuSans fallback is used. Headless hosts
    /// routinely have no system fonts.
    pub fn new(asset_dir: impl Into<PathBuf>, font_path: impl AsRef<Path>) -> Self {
        Self {
            asset_dir: asset_dir.into(),
            font: Arc::new(resolve_font(font_path.as_ref())),
        }
    }

    /// Render a challenge image for the given pattern and problem statement.
    ///
    /// Fails with `AssetNotFound` if the pattern has no artwork file, or
    /// `Render` on decode/encode failures. Never returns a partial image.
    pub async fn render(&self, pattern_id: &str, problem_text: &str) -> Result<Vec<u8>, GateError> {
        let asset_dir = self.asset_dir.clone();
        let font = Arc::clone(&self.font);
        let pattern_id = pattern_id.to_string();
        let problem_text = problem_text.to_string();

        tokio::task::spawn_blocking(move || {
            let mut rng = rand::rng();
            compose(&asset_dir, &pattern_id, &problem_text, &font, &mut rng)
        })
        .await
        .map_err(|e| GateError::Render(format!("render task failed: {e}")))?
    }
}

/// Load the configured font, falling back to the embedded DejaVuSans.
/// Font unavailability is expected, not an error.
fn resolve_font(path: &Path) -> FontVec {
    match std::fs::read(path)
        .ok()
        .and_then(|bytes| FontVec::try_from_vec(bytes).ok())
    {
        Some(font) => font,
        None => {
            tracing::warn!(
                path = %path.display(),
                "Configured font unavailable, using embedded fallback"
            );
            FontVec::try_from_vec(FALLBACK_FONT.to_vec()).expect("embedded fallback font is valid")
        }
    }
}

fn artwork_path(asset_dir: &Path, pattern_id: &str) -> Option<PathBuf> {
    ARTWORK_EXTENSIONS
        .iter()
        .map(|ext| asset_dir.join(format!("{pattern_id}.{ext}")))
        .find(|candidate| candidate.is_file())
}

fn random_printable(rng: &mut impl Rng) -> char {
    rng.random_range(0x20u8..0x7f) as char
}

/// The sequential compositing pass. RNG is injected so tests can seed it.
fn compose(
    asset_dir: &Path,
    pattern_id: &str,
    problem_text: &str,
    font: &FontVec,
    rng: &mut impl Rng,
) -> Result<Vec<u8>, GateError> {
    let path = artwork_path(asset_dir, pattern_id)
        .ok_or_else(|| GateError::AssetNotFound(pattern_id.to_string()))?;

    let artwork = image::open(&path).map_err(|e| {
        GateError::Render(format!("failed to decode artwork {}: {e}", path.display()))
    })?;
    let artwork = imageops::resize(
        &artwork.to_rgb8(),
        ARTWORK_SIZE,
        ARTWORK_SIZE,
        FilterType::Triangle,
    );

    // White canvas with the artwork pasted at the origin; the strip below
    // the artwork carries the problem text.
    let mut canvas = RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, Rgba([255, 255, 255, 255]));
    imageops::replace(&mut canvas, &DynamicImage::ImageRgb8(artwork).to_rgba8(), 0, 0);

    // Anti-OCR noise: large low-alpha glyphs at random positions. Each glyph
    // is drawn on its own transparent overlay and composited independently,
    // so overlapping glyphs blend instead of overwriting each other.
    for _ in 0..NOISE_GLYPH_COUNT {
        let x = rng.random_range(0..CANVAS_WIDTH) as i32;
        let y = rng.random_range(0..CANVAS_HEIGHT) as i32;

        let mut glyphs = String::new();
        glyphs.push(random_printable(rng));
        if rng.random_bool(SECOND_GLYPH_PROB) {
            glyphs.push(random_printable(rng));
        }

        let mut overlay = RgbaImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, Rgba([255, 255, 255, 0]));
        draw_text_mut(
            &mut overlay,
            NOISE_COLOR,
            x,
            y,
            PxScale::from(NOISE_SCALE),
            font,
            &glyphs,
        );
        imageops::overlay(&mut canvas, &overlay, 0, 0);
    }

    // Problem text below the artwork. Each line is drawn four times at
    // one-pixel offsets: the stroke duplication, not font weight, is what
    // keeps the text legible over the noise layer.
    for (i, line) in problem_text.lines().enumerate() {
        let y = TEXT_TOP + LINE_SPACING * i as i32;
        for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            draw_text_mut(
                &mut canvas,
                TEXT_COLOR,
                TEXT_LEFT + dx,
                y + dy,
                PxScale::from(QUESTION_SCALE),
                font,
                line,
            );
        }
    }

    let mut buffer = Vec::new();
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| GateError::Render(format!("PNG encoding failed: {e}")))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, RgbImage};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const PROBLEM_TEXT: &str = "Let x be the correct pattern\nf(x) = 3x^2 + 2x + 1\nWhat is f'(x) + x?";

    /// Synthesize a small artwork PNG in a unique temp directory
    fn temp_asset_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("warden-render-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let artwork = RgbImage::from_fn(120, 90, |x, y| {
            image::Rgb([(x * 2) as u8, (y * 2) as u8, 128])
        });
        artwork.save(dir.join("raven0.png")).unwrap();
        dir
    }

    fn test_font() -> FontVec {
        FontVec::try_from_vec(FALLBACK_FONT.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_render_produces_fixed_canvas() {
        let dir = temp_asset_dir("canvas");
        let renderer = ChallengeRenderer::new(&dir, "no-such-font.ttf");

        let png = renderer.render("raven0", PROBLEM_TEXT).await.unwrap();
        assert!(!png.is_empty());

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), CANVAS_WIDTH);
        assert_eq!(decoded.height(), CANVAS_HEIGHT);
    }

    #[tokio::test]
    async fn test_canvas_size_independent_of_line_count() {
        let dir = temp_asset_dir("lines");
        let renderer = ChallengeRenderer::new(&dir, "no-such-font.ttf");

        let png = renderer.render("raven0", "f(x) = 2x").await.unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (CANVAS_WIDTH, CANVAS_HEIGHT));
    }

    #[tokio::test]
    async fn test_missing_artwork_is_asset_not_found() {
        let dir = temp_asset_dir("missing");
        let renderer = ChallengeRenderer::new(&dir, "no-such-font.ttf");

        let err = renderer.render("raven99", PROBLEM_TEXT).await.unwrap_err();
        assert!(matches!(err, GateError::AssetNotFound(ref id) if id == "raven99"));
    }

    #[test]
    fn test_compose_is_deterministic_under_seeded_rng() {
        let dir = temp_asset_dir("golden");
        let font = test_font();

        let mut rng = StdRng::seed_from_u64(7);
        let first = compose(&dir, "raven0", PROBLEM_TEXT, &font, &mut rng).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let second = compose(&dir, "raven0", PROBLEM_TEXT, &font, &mut rng).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_artwork_extension_probe() {
        let dir = temp_asset_dir("ext");
        let gif_artwork = RgbImage::from_pixel(16, 16, image::Rgb([10, 20, 30]));
        gif_artwork.save(dir.join("raven1.gif")).unwrap();

        assert!(artwork_path(&dir, "raven0").unwrap().ends_with("raven0.png"));
        assert!(artwork_path(&dir, "raven1").unwrap().ends_with("raven1.gif"));
        assert!(artwork_path(&dir, "raven99").is_none());
    }
}
