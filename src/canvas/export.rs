//! Rasterizes a session (base image plus overlays) into a PNG.

use std::path::PathBuf;

use ab_glyph::{point, Font, PxScale, ScaleFont};
use egui::{pos2, Color32, Pos2, Rect, Vec2};
use image::{imageops, RgbaImage};

use crate::canvas::geometry::{bounding_rect, point_in_polygon, point_to_segment_dist};
use crate::canvas::overlay::{Overlay, OverlayKind, Stroke, TextStyle};
use crate::canvas::text;
use crate::canvas::session::{AnnotationSession, BaseImage};
use crate::error::ExportError;
use crate::files::SaveTarget;

pub const EXPORT_FILENAME: &str = "canvas.png";

/// Horizontal shift per pixel above the baseline for italic text.
const ITALIC_SHEAR: f32 = 0.2;

/// Render, encode and save. Returns where the file went.
pub fn export(session: &AnnotationSession, target: &SaveTarget) -> Result<PathBuf, ExportError> {
    let png = encode_png(&render(session))?;
    let path = target.write(EXPORT_FILENAME, &png)?;
    tracing::info!("Exported canvas to {}", path.display());
    Ok(path)
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}

/// Compose the full canvas on a transparent background.
pub fn render(session: &AnnotationSession) -> RgbaImage {
    let size = session.canvas_size();
    let mut img = RgbaImage::new(size.x.round() as u32, size.y.round() as u32);
    if let Some(base) = session.base() {
        draw_base(&mut img, base);
    }
    for overlay in session.overlays() {
        draw_overlay(&mut img, overlay);
    }
    img
}

fn draw_base(img: &mut RgbaImage, base: &BaseImage) {
    let p = base.placement;
    if p.scale <= 0.0 {
        return;
    }
    let w = p.size.x.round().max(1.0) as u32;
    let h = p.size.y.round().max(1.0) as u32;
    let scaled = imageops::resize(&base.pixels, w, h, imageops::FilterType::Triangle);
    imageops::overlay(img, &scaled, p.offset.x.round() as i64, p.offset.y.round() as i64);
}

fn draw_overlay(img: &mut RgbaImage, overlay: &Overlay) {
    match &overlay.kind {
        OverlayKind::Text {
            content,
            width,
            style,
        } => {
            let color = overlay.fill.unwrap_or(Color32::BLACK);
            draw_text(img, overlay.pos, content, *width, style, color);
        }
        OverlayKind::Circle { radius } => {
            let center = overlay.pos + Vec2::splat(*radius);
            if let Some(fill) = overlay.fill {
                fill_circle(img, center, *radius, fill);
            }
            if let Some(stroke) = overlay.stroke {
                stroke_circle(img, center, *radius, stroke);
            }
        }
        _ => {
            let Some(points) = overlay.outline() else {
                return;
            };
            if let Some(fill) = overlay.fill {
                fill_polygon(img, &points, fill);
            }
            if let Some(stroke) = overlay.stroke {
                stroke_polygon(img, &points, stroke);
            }
        }
    }
}

// ── Pixel helpers ───────────────────────────────────────────────────────────

/// Source-over blend of `color` at `coverage` into one pixel.
fn blend(img: &mut RgbaImage, x: i32, y: i32, color: Color32, coverage: f32) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let src_a = a as f32 / 255.0 * coverage.clamp(0.0, 1.0);
    if src_a <= 0.0 {
        return;
    }
    let dst = img.get_pixel_mut(x as u32, y as u32);
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    for (i, src) in [r, g, b].into_iter().enumerate() {
        let v = (src as f32 * src_a + dst[i] as f32 * dst_a * (1.0 - src_a)) / out_a;
        dst[i] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

/// Visit the pixel centers inside `area`, clipped to the image.
fn for_each_pixel(img: &RgbaImage, area: Rect, mut f: impl FnMut(i32, i32, Pos2)) {
    let x0 = area.min.x.floor().max(0.0) as i32;
    let y0 = area.min.y.floor().max(0.0) as i32;
    let x1 = (area.max.x.ceil() as i32).min(img.width() as i32);
    let y1 = (area.max.y.ceil() as i32).min(img.height() as i32);
    for y in y0..y1 {
        for x in x0..x1 {
            f(x, y, pos2(x as f32 + 0.5, y as f32 + 0.5));
        }
    }
}

fn fill_polygon(img: &mut RgbaImage, points: &[Pos2], color: Color32) {
    let mut hits = Vec::new();
    for_each_pixel(img, bounding_rect(points), |x, y, c| {
        if point_in_polygon(c, points) {
            hits.push((x, y));
        }
    });
    for (x, y) in hits {
        blend(img, x, y, color, 1.0);
    }
}

fn stroke_polygon(img: &mut RgbaImage, points: &[Pos2], stroke: Stroke) {
    let half = stroke.width * 0.5;
    let n = points.len();
    let mut hits = Vec::new();
    for_each_pixel(img, bounding_rect(points).expand(half), |x, y, c| {
        let on_edge = (0..n).any(|i| point_to_segment_dist(c, points[i], points[(i + 1) % n]) <= half);
        if on_edge {
            hits.push((x, y));
        }
    });
    for (x, y) in hits {
        blend(img, x, y, stroke.color, 1.0);
    }
}

fn fill_circle(img: &mut RgbaImage, center: Pos2, radius: f32, color: Color32) {
    let area = Rect::from_center_size(center, Vec2::splat(radius * 2.0));
    let mut hits = Vec::new();
    for_each_pixel(img, area, |x, y, c| {
        if (c - center).length() <= radius {
            hits.push((x, y));
        }
    });
    for (x, y) in hits {
        blend(img, x, y, color, 1.0);
    }
}

fn stroke_circle(img: &mut RgbaImage, center: Pos2, radius: f32, stroke: Stroke) {
    let half = stroke.width * 0.5;
    let area = Rect::from_center_size(center, Vec2::splat((radius + half) * 2.0));
    let mut hits = Vec::new();
    for_each_pixel(img, area, |x, y, c| {
        if ((c - center).length() - radius).abs() <= half {
            hits.push((x, y));
        }
    });
    for (x, y) in hits {
        blend(img, x, y, stroke.color, 1.0);
    }
}

// ── Text ────────────────────────────────────────────────────────────────────

fn draw_text(
    img: &mut RgbaImage,
    origin: Pos2,
    content: &str,
    width: f32,
    style: &TextStyle,
    color: Color32,
) {
    let Some(font) = text::ui_font() else {
        tracing::warn!("No font available; text overlay left out of export");
        return;
    };
    let scale = PxScale::from(style.font_size);
    let scaled = font.as_scaled(scale);
    let bold_extra = text::bold_advance(style);

    let line_height = text::line_height(style);
    for (row, line) in text::layout_lines(content, width, style).iter().enumerate() {
        let baseline = origin.y + row as f32 * line_height + scaled.ascent();
        let mut caret = origin.x;
        let mut prev = None;
        for ch in line.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(p) = prev {
                caret += scaled.kern(p, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            caret += scaled.h_advance(id) + bold_extra;
            prev = Some(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let py = bounds.min.y + gy as f32;
                let shear = if style.italic {
                    (baseline - py) * ITALIC_SHEAR
                } else {
                    0.0
                };
                let x = (bounds.min.x + gx as f32 + shear).round() as i32;
                let y = py as i32;
                blend(img, x, y, color, coverage);
                if style.bold {
                    blend(img, x + 1, y, color, coverage);
                }
            });
        }
        if style.underline && caret > origin.x {
            let thickness = (style.font_size / 15.0).max(1.0);
            let top = baseline + style.font_size * 0.1;
            let bar = Rect::from_min_max(pos2(origin.x, top), pos2(caret, top + thickness));
            let mut hits = Vec::new();
            for_each_pixel(img, bar, |x, y, _| hits.push((x, y)));
            for (x, y) in hits {
                blend(img, x, y, color, 1.0);
            }
        }
    }
}
