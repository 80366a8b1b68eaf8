//! Line breaking for text overlays. Painting, hit testing and export all
//! break lines here so the three agree.

use std::sync::OnceLock;

use ab_glyph::{Font, FontVec, PxScale, PxScaleFont, ScaleFont};

use crate::canvas::overlay::{TextStyle, LINE_HEIGHT};

/// The proportional font egui draws the on-screen text with.
pub fn ui_font() -> Option<&'static FontVec> {
    static FONT: OnceLock<Option<FontVec>> = OnceLock::new();
    FONT.get_or_init(|| {
        let defs = egui::FontDefinitions::default();
        let name = defs.families.get(&egui::FontFamily::Proportional)?.first()?;
        let data = defs.font_data.get(name)?;
        match FontVec::try_from_vec_and_index(data.font.to_vec(), data.index) {
            Ok(font) => Some(font),
            Err(e) => {
                tracing::warn!("Cannot parse bundled font {}: {}", name, e);
                None
            }
        }
    })
    .as_ref()
}

/// Extra advance per glyph for faux bold.
pub fn bold_advance(style: &TextStyle) -> f32 {
    if style.bold {
        1.0
    } else {
        0.0
    }
}

pub fn line_height(style: &TextStyle) -> f32 {
    style.font_size * LINE_HEIGHT
}

pub fn text_width(scaled: &PxScaleFont<&FontVec>, s: &str, extra: f32) -> f32 {
    let mut prev = None;
    s.chars()
        .map(|ch| {
            let id = scaled.glyph_id(ch);
            let kern = prev.map_or(0.0, |p| scaled.kern(p, id));
            prev = Some(id);
            kern + scaled.h_advance(id) + extra
        })
        .sum()
}

/// Greedy word wrap. Words wider than `width` get a line of their own.
pub fn wrap_lines(content: &str, width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in content.split('\n') {
        let mut line = String::new();
        for word in paragraph.split(' ') {
            if line.is_empty() {
                line.push_str(word);
                continue;
            }
            let candidate = format!("{line} {word}");
            if measure(&candidate) <= width {
                line = candidate;
            } else {
                lines.push(std::mem::take(&mut line));
                line.push_str(word);
            }
        }
        lines.push(line);
    }
    lines
}

/// The rows a text overlay occupies when wrapped at `width`.
pub fn layout_lines(content: &str, width: f32, style: &TextStyle) -> Vec<String> {
    match ui_font() {
        Some(font) => {
            let scaled = font.as_scaled(PxScale::from(style.font_size));
            let extra = bold_advance(style);
            wrap_lines(content, width, |s| text_width(&scaled, s, extra))
        }
        None => content.split('\n').map(str::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> TextStyle {
        TextStyle {
            font_size: 20.0,
            bold: true,
            italic: true,
            underline: true,
        }
    }

    #[test]
    fn wrap_breaks_on_spaces_and_newlines() {
        let measure = |s: &str| s.chars().count() as f32 * 10.0;
        assert_eq!(
            wrap_lines("the quick brown fox", 100.0, measure),
            vec!["the quick", "brown fox"]
        );
        assert_eq!(wrap_lines("a\nb", 100.0, measure), vec!["a", "b"]);
        assert_eq!(
            wrap_lines("extraordinarily long", 50.0, measure),
            vec!["extraordinarily", "long"]
        );
    }

    #[test]
    fn bundled_font_wraps_long_sentences() {
        assert!(ui_font().is_some());
        assert_eq!(layout_lines("Edit me", 200.0, &style()), vec!["Edit me"]);

        let sentence = "The quick brown fox jumps over the lazy dog and then runs all the way home";
        let lines = layout_lines(sentence, 200.0, &style());
        assert!(lines.len() >= 3, "{lines:?}");
        assert_eq!(lines.join(" "), sentence);
    }

    #[test]
    fn bold_text_is_measured_wider() {
        let font = ui_font().unwrap();
        let scaled = font.as_scaled(PxScale::from(20.0));
        let plain = text_width(&scaled, "Edit me", 0.0);
        assert!(plain > 0.0);
        let bold = text_width(&scaled, "Edit me", 1.0);
        assert!((bold - plain - 7.0).abs() < 1e-3);
    }
}
