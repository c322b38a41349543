pub mod typeface;

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use rand::Rng;
use thiserror::Error;

use crate::keywords::KeywordResult;
use crate::utils::media::to_data_url;

pub use typeface::Typeface;

pub const CANVAS_WIDTH: u32 = 512;
pub const CANVAS_HEIGHT: u32 = 512;

const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const MARGIN_X: i32 = 20;
const KEYWORD_INDENT_X: i32 = 30;
const MAIN_LINE_Y: i32 = 20;
const REFERENCES_START_Y: i32 = 60;
const LINE_STEP: i32 = 30;
const KEYWORDS_GAP: i32 = 20;

#[derive(Debug, Error)]
#[error("PNG encoding failed: {0}")]
pub struct RenderError(#[from] image::ImageError);

/// A reference attachment as shown on the mockup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceData {
    pub image_name: String,
    pub description: String,
}

pub fn random_background() -> Rgb<u8> {
    let mut rng = rand::thread_rng();
    Rgb([rng.gen(), rng.gen(), rng.gen()])
}

/// Text lines drawn on the canvas, top to bottom, as (x, y, text).
fn layout_lines(
    description: &str,
    references: &[ReferenceData],
    keywords: &KeywordResult,
) -> Vec<(i32, i32, String)> {
    let mut lines = vec![(MARGIN_X, MAIN_LINE_Y, format!("Main: {description}"))];

    let mut y = REFERENCES_START_Y;
    for reference in references {
        lines.push((
            MARGIN_X,
            y,
            format!("Ref: {} - {}", reference.image_name, reference.description),
        ));
        y += LINE_STEP;
    }

    y += KEYWORDS_GAP;
    lines.push((MARGIN_X, y, "Keywords:".to_string()));
    y += LINE_STEP;
    for line in keywords.summary_lines() {
        lines.push((KEYWORD_INDENT_X, y, line));
        y += LINE_STEP;
    }

    lines
}

/// Draws the mock "generated image": a solid canvas annotated with the
/// description, the reference list and the keyword breakdown.
pub fn render_mockup(
    description: &str,
    references: &[ReferenceData],
    keywords: &KeywordResult,
    background: Rgb<u8>,
    typeface: &Typeface,
) -> RgbImage {
    let mut img = RgbImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, background);
    for (x, y, text) in layout_lines(description, references, keywords) {
        typeface.draw_text(&mut img, x, y, TEXT_COLOR, &text);
    }
    img
}

pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

pub fn encode_png_data_uri(img: &RgbImage) -> Result<String, RenderError> {
    let bytes = encode_png(img)?;
    Ok(to_data_url("image/png", &bytes))
}

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose, Engine as _};

    use super::*;
    use crate::keywords::classify;

    const TEAL: Rgb<u8> = Rgb([0, 128, 128]);

    fn reference(name: &str, description: &str) -> ReferenceData {
        ReferenceData {
            image_name: name.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn layout_places_references_before_keywords() {
        let refs = vec![reference("a.png", "red hat"), reference("b.jpg", "")];
        let lines = layout_lines("sad man in a cafe", &refs, &classify("sad man in a cafe"));
        let expected = vec![
            (20, 20, "Main: sad man in a cafe".to_string()),
            (20, 60, "Ref: a.png - red hat".to_string()),
            (20, 90, "Ref: b.jpg - ".to_string()),
            (20, 140, "Keywords:".to_string()),
            (30, 170, "Person: adult, casual clothes, frowning".to_string()),
            (30, 200, "Setting: cafe, indoor".to_string()),
            (30, 230, "Objects: coffee cup, table, chair".to_string()),
            (30, 260, "Mood: sad, melancholic".to_string()),
        ];
        assert_eq!(lines, expected);
    }

    #[test]
    fn layout_without_references() {
        let lines = layout_lines("", &[], &classify(""));
        assert_eq!(lines[1], (20, 80, "Keywords:".to_string()));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn renders_fixed_size_canvas_with_background() {
        let img = render_mockup("hello", &[], &classify("hello"), TEAL, &Typeface::builtin());
        assert_eq!(img.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));
        assert_eq!(img.get_pixel(CANVAS_WIDTH - 1, CANVAS_HEIGHT - 1), &TEAL);
        let has_text = (20..36).any(|y| (20..120).any(|x| img.get_pixel(x, y) == &TEXT_COLOR));
        assert!(has_text);
    }

    #[test]
    fn data_uri_decodes_to_png() {
        let img = render_mockup("hello", &[], &classify("hello"), TEAL, &Typeface::builtin());
        let uri = encode_png_data_uri(&img).unwrap();
        let payload = uri.strip_prefix("data:image/png;base64,").unwrap();
        let bytes = general_purpose::STANDARD.decode(payload).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.to_rgb8(), img);
    }
}
