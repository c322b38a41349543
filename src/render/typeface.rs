use std::fs;
use std::path::Path;

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};
use rusttype::{point, Font, Scale};
use tracing::{info, warn};

const BITMAP_GLYPH_SIZE: u32 = 8;
const BITMAP_SCALE: u32 = 2;

/// Font used for overlay text. Falls back to a built-in bitmap font when no
/// TrueType file can be loaded.
pub enum Typeface {
    TrueType { font: Font<'static>, px: f32 },
    Bitmap { scale: u32 },
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Typeface::TrueType { px, .. } => f.debug_struct("TrueType").field("px", px).finish(),
            Typeface::Bitmap { scale } => f.debug_struct("Bitmap").field("scale", scale).finish(),
        }
    }
}

impl Typeface {
    pub fn builtin() -> Self {
        Typeface::Bitmap {
            scale: BITMAP_SCALE,
        }
    }

    pub fn load(path: &Path, px: f32) -> Self {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(
                    "Font {} unavailable ({}); using built-in bitmap font.",
                    path.display(),
                    err
                );
                return Self::builtin();
            }
        };

        match Font::try_from_vec(bytes) {
            Some(font) => {
                info!("Loaded font {} at {}px", path.display(), px);
                Typeface::TrueType { font, px }
            }
            None => {
                warn!(
                    "Font {} is not a valid TrueType file; using built-in bitmap font.",
                    path.display()
                );
                Self::builtin()
            }
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Typeface::Bitmap { .. })
    }

    /// Draws `text` with its top-left corner at (`x`, `y`). Pixels outside the
    /// image are clipped.
    pub fn draw_text(&self, img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, text: &str) {
        match self {
            Typeface::TrueType { font, px } => draw_truetype(img, font, *px, x, y, color, text),
            Typeface::Bitmap { scale } => draw_bitmap(img, *scale, x, y, color, text),
        }
    }
}

fn blend_pixel(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 || coverage <= 0.0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x >= img.width() || y >= img.height() {
        return;
    }
    let alpha = coverage.min(1.0);
    let inv = 1.0 - alpha;
    let dst = img.get_pixel_mut(x, y);
    for channel in 0..3 {
        dst.0[channel] = (color.0[channel] as f32 * alpha + dst.0[channel] as f32 * inv) as u8;
    }
}

fn draw_truetype(
    img: &mut RgbImage,
    font: &Font<'static>,
    px: f32,
    x: i32,
    y: i32,
    color: Rgb<u8>,
    text: &str,
) {
    let scale = Scale::uniform(px);
    let v_metrics = font.v_metrics(scale);
    let start = point(x as f32, y as f32 + v_metrics.ascent);
    let right_edge = img.width() as f32;

    for glyph in font.layout(text, scale, start) {
        if glyph.position().x >= right_edge {
            break;
        }
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                blend_pixel(img, gx as i32 + bb.min.x, gy as i32 + bb.min.y, color, v);
            });
        }
    }
}

fn bitmap_glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

fn draw_bitmap(img: &mut RgbImage, scale: u32, x: i32, y: i32, color: Rgb<u8>, text: &str) {
    let scale = scale.max(1) as i32;
    let advance = BITMAP_GLYPH_SIZE as i32 * scale;

    for (index, ch) in text.chars().enumerate() {
        let origin_x = x + index as i32 * advance;
        if origin_x >= img.width() as i32 {
            break;
        }
        for (row, bits) in bitmap_glyph(ch).iter().enumerate() {
            for col in 0..BITMAP_GLYPH_SIZE as i32 {
                if bits & (1 << col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        blend_pixel(
                            img,
                            origin_x + col * scale + dx,
                            y + row as i32 * scale + dy,
                            color,
                            1.0,
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    #[test]
    fn missing_font_falls_back_to_bitmap() {
        let typeface = Typeface::load(Path::new("definitely/not/here.ttf"), 20.0);
        assert!(typeface.is_builtin());
    }

    #[test]
    fn invalid_font_file_falls_back_to_bitmap() {
        let path = std::env::temp_dir().join("mockup_studio_not_a_font.ttf");
        fs::write(&path, b"not a font").unwrap();
        let typeface = Typeface::load(&path, 20.0);
        let _ = fs::remove_file(&path);
        assert!(typeface.is_builtin());
    }

    #[test]
    fn bitmap_text_paints_pixels() {
        let mut img = RgbImage::from_pixel(64, 32, BLACK);
        Typeface::builtin().draw_text(&mut img, 0, 0, WHITE, "H");
        let painted = img.pixels().filter(|pixel| **pixel == WHITE).count();
        assert!(painted > 0);
        assert!(img.enumerate_pixels().all(|(x, y, pixel)| *pixel == BLACK || (x < 16 && y < 16)));
    }

    #[test]
    fn text_outside_canvas_is_clipped() {
        let mut img = RgbImage::from_pixel(16, 16, BLACK);
        let typeface = Typeface::builtin();
        typeface.draw_text(&mut img, -100, -100, WHITE, "clipped");
        typeface.draw_text(&mut img, 10, 10, WHITE, "a long line running off the edge");
        assert_eq!(img.get_pixel(0, 0), &BLACK);
    }

    fn system_truetype() -> Option<Typeface> {
        [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/Library/Fonts/Arial.ttf",
        ]
        .iter()
        .map(|path| Typeface::load(Path::new(path), 20.0))
        .find(|typeface| !typeface.is_builtin())
    }

    #[test]
    fn truetype_text_stops_at_right_edge() {
        let Some(typeface) = system_truetype() else {
            return;
        };
        let long_line = "W".repeat(200_000);
        let mut img = RgbImage::from_pixel(64, 32, BLACK);
        let started = std::time::Instant::now();
        typeface.draw_text(&mut img, 0, 0, WHITE, &long_line);

        assert!(started.elapsed() < std::time::Duration::from_secs(1));
        assert!(img.pixels().any(|pixel| *pixel != BLACK));
    }

    #[test]
    fn blend_mixes_partial_coverage() {
        let mut img = RgbImage::from_pixel(1, 1, BLACK);
        blend_pixel(&mut img, 0, 0, WHITE, 0.5);
        assert_eq!(img.get_pixel(0, 0), &Rgb([127, 127, 127]));
    }
}
