use std::sync::Arc;

use egui::{vec2, Color32, Pos2, Rect};
use image::RgbaImage;

use crate::canvas::export::{self, EXPORT_FILENAME};
use crate::canvas::overlay::{Overlay, OverlayKind, ShapeKind, TextFlag, TextStyle};
use crate::canvas::session::{
    AnnotationSession, LoadIndicator, LOAD_FAILED_MESSAGE, LOAD_SUCCEEDED_MESSAGE,
};
use crate::canvas::text;
use crate::config::AppConfig;
use crate::error::ImageLoadError;
use crate::files::SaveTarget;
use crate::http;
use crate::task::{self, Pending, Poll};

pub enum AnnotationEvent {
    /// Leave the editor and go back to searching
    Reset,
}

fn load_image(url: &str) -> Result<RgbaImage, ImageLoadError> {
    let bytes = http::fetch_bytes(&http::agent(), url)?;
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

/// Annotation screen for one base image. Dropping it frees the texture and
/// discards any load still in flight.
pub struct AnnotationView {
    session: AnnotationSession,
    config: Arc<AppConfig>,
    texture: Option<egui::TextureHandle>,
    load: Option<Pending<Result<RgbaImage, ImageLoadError>>>,
    fill_color: Color32,
    focus_text: bool,
    dragging: bool,
}

impl AnnotationView {
    pub fn new(ctx: &egui::Context, config: Arc<AppConfig>, url: String) -> Self {
        let (w, h) = config.canvas_size();
        let session = AnnotationSession::new(url, vec2(w, h));
        let load = session.is_loading().then(|| {
            let url = session.url().to_string();
            task::spawn(ctx, move || load_image(&url))
        });
        Self {
            session,
            config,
            texture: None,
            load,
            fill_color: Color32::BLACK,
            focus_text: false,
            dragging: false,
        }
    }

    fn poll_load(&mut self) {
        let Some(pending) = &self.load else {
            return;
        };
        match pending.poll() {
            Poll::Waiting => return,
            Poll::Ready(Ok(pixels)) => self.session.image_loaded(pixels),
            Poll::Ready(Err(e)) => self.session.image_failed(&e),
            Poll::Lost => self.session.image_failed(&ImageLoadError::Interrupted),
        }
        self.load = None;
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() {
            return;
        }
        if let Some(base) = self.session.base() {
            let size = [base.pixels.width() as usize, base.pixels.height() as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, base.pixels.as_raw());
            self.texture = Some(ctx.load_texture("base_image", color_image, egui::TextureOptions::LINEAR));
        }
    }

    fn export(&self) {
        let target = match SaveTarget::choose(&self.config, EXPORT_FILENAME) {
            Ok(target) => target,
            Err(e) => {
                tracing::info!("Export not saved: {}", e);
                return;
            }
        };
        if let Err(e) = export::export(&self.session, &target) {
            tracing::error!("Export failed: {}", e);
        }
    }

    pub fn ui(&mut self, ctx: &egui::Context) -> Option<AnnotationEvent> {
        self.poll_load();
        self.ensure_texture(ctx);

        if !ctx.wants_keyboard_input() {
            let (delete, escape) =
                ctx.input(|i| (i.key_pressed(egui::Key::Delete), i.key_pressed(egui::Key::Escape)));
            if delete {
                self.session.remove_active();
            }
            if escape {
                self.session.deselect();
            }
        }

        let mut event = None;

        egui::TopBottomPanel::top("annotation_toolbar").show(ctx, |ui| {
            ui.add_space(6.0);
            if ui.button("Back to Search").clicked() {
                event = Some(AnnotationEvent::Reset);
            }
            match self.session.indicator() {
                Some(LoadIndicator::Failed) => {
                    ui.colored_label(ui.visuals().error_fg_color, LOAD_FAILED_MESSAGE);
                }
                Some(LoadIndicator::Succeeded) => {
                    ui.colored_label(Color32::from_rgb(34, 160, 80), LOAD_SUCCEEDED_MESSAGE);
                }
                None => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading image...");
                    });
                }
            }
            ui.horizontal_wrapped(|ui| self.toolbar(ui));
            ui.add_space(6.0);
        });

        egui::TopBottomPanel::bottom("annotation_actions").show(ctx, |ui| {
            ui.add_space(6.0);
            if ui.button("Download").clicked() {
                self.export();
            }
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| self.canvas(ui));
        });

        event
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        if ui.button("Add Text").clicked() {
            self.session.add_text();
            self.focus_text = true;
        }
        for shape in ShapeKind::ALL {
            if ui.button(format!("Add {}", shape.label())).clicked() {
                self.session.add_shape(shape);
            }
        }
        ui.separator();
        if ui.button("Remove Active").clicked() {
            self.session.remove_active();
        }
        if ui.button("Clear All").clicked() {
            self.session.clear_all();
        }
        ui.separator();
        if ui
            .color_edit_button_srgba(&mut self.fill_color)
            .on_hover_text("Choose your color")
            .changed()
        {
            self.session.apply_color(self.fill_color);
        }

        let style = self.session.active().and_then(Overlay::text_style).cloned();
        let is_text = style.is_some();
        let style = style.unwrap_or_default();
        ui.separator();
        for (flag, on, label) in [
            (TextFlag::Bold, style.bold, egui::RichText::new("B").strong()),
            (TextFlag::Italic, style.italic, egui::RichText::new("I").italics()),
            (TextFlag::Underline, style.underline, egui::RichText::new("U").underline()),
        ] {
            if ui
                .add_enabled(is_text, egui::SelectableLabel::new(on, label))
                .clicked()
            {
                self.session.toggle(flag);
            }
        }

        if let Some(content) = self.session.active_mut().and_then(Overlay::text_content_mut) {
            ui.separator();
            let edit = ui.add(
                egui::TextEdit::multiline(content)
                    .desired_rows(1)
                    .desired_width(220.0),
            );
            if self.focus_text {
                edit.request_focus();
                self.focus_text = false;
            }
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(self.session.canvas_size(), egui::Sense::click_and_drag());
        let canvas_rect = response.rect;
        let to_canvas = |p: Pos2| (p - canvas_rect.min).to_pos2();

        painter.rect_filled(canvas_rect, 0.0, Color32::from_gray(235));
        painter.rect_stroke(
            canvas_rect,
            0.0,
            egui::Stroke::new(1.0, Color32::from_gray(160)),
            egui::StrokeKind::Outside,
        );

        if let (Some(tex), Some(base)) = (&self.texture, self.session.base()) {
            painter.image(
                tex.id(),
                base.placement.rect().translate(canvas_rect.min.to_vec2()),
                Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        let active = self.session.active_id();
        for overlay in self.session.overlays() {
            let drawn = draw_overlay(&painter, canvas_rect, overlay);
            if active == Some(overlay.id) {
                draw_selection_indicator(&painter, drawn);
            }
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.session.select_at(to_canvas(pos));
            }
        }
        if response.drag_started_by(egui::PointerButton::Primary) {
            let press = ui.input(|i| i.pointer.press_origin());
            if let Some(pos) = grab_point(press, response.interact_pointer_pos()) {
                self.dragging = self.session.select_at(to_canvas(pos)).is_some();
            }
        }
        if self.dragging && response.dragged_by(egui::PointerButton::Primary) {
            self.session.move_active(response.drag_delta());
        }
        if response.drag_stopped() {
            self.dragging = false;
        }
    }
}

/// Paint one overlay; returns its on-screen extent.
fn draw_overlay(painter: &egui::Painter, canvas_rect: Rect, overlay: &Overlay) -> Rect {
    let origin = canvas_rect.min.to_vec2();
    let fill = overlay.fill.unwrap_or(Color32::TRANSPARENT);
    let stroke = overlay
        .stroke
        .map_or(egui::Stroke::NONE, |s| s.to_egui());
    match &overlay.kind {
        OverlayKind::Text {
            content,
            width,
            style,
        } => {
            let color = overlay.fill.unwrap_or(Color32::BLACK);
            let galley = painter.layout_job(text_layout(content, *width, style, color));
            let pos = overlay.pos + origin;
            let extent = overlay.bounds().translate(origin);
            if style.bold {
                painter.galley(pos + vec2(1.0, 0.0), galley.clone(), color);
            }
            painter.galley(pos, galley, color);
            extent
        }
        OverlayKind::Circle { radius } => {
            let bounds = overlay.bounds().translate(origin);
            painter.circle(bounds.center(), *radius, fill, stroke);
            bounds
        }
        _ => {
            let points: Vec<Pos2> = overlay
                .outline()
                .unwrap_or_default()
                .into_iter()
                .map(|p| p + origin)
                .collect();
            painter.add(egui::Shape::convex_polygon(points, fill, stroke));
            overlay.bounds().translate(origin)
        }
    }
}

fn text_layout(content: &str, width: f32, style: &TextStyle, color: Color32) -> egui::text::LayoutJob {
    let underline = if style.underline {
        egui::Stroke::new((style.font_size / 15.0).max(1.0), color)
    } else {
        egui::Stroke::NONE
    };
    // rows are broken by `text::layout_lines`, not by egui
    let mut job = egui::text::LayoutJob::default();
    job.wrap.max_width = f32::INFINITY;
    job.append(
        &text::layout_lines(content, width, style).join("\n"),
        0.0,
        egui::TextFormat {
            font_id: egui::FontId::proportional(style.font_size),
            color,
            italics: style.italic,
            underline,
            line_height: Some(text::line_height(style)),
            ..Default::default()
        },
    );
    job
}

/// A drag grabs whatever was under the pointer when the button went down;
/// by the time egui reports the drag the pointer is past the threshold.
fn grab_point(press_origin: Option<Pos2>, pointer: Option<Pos2>) -> Option<Pos2> {
    press_origin.or(pointer)
}

fn draw_selection_indicator(painter: &egui::Painter, rect: Rect) {
    painter.rect_stroke(
        rect.expand(4.0),
        2.0,
        egui::Stroke::new(1.5, Color32::from_rgb(0, 120, 255)),
        egui::StrokeKind::Middle,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::overlay::OverlayId;

    #[test]
    fn text_layout_carries_style_flags() {
        let style = TextStyle {
            font_size: 20.0,
            bold: true,
            italic: true,
            underline: false,
        };
        let job = text_layout("Edit me", 200.0, &style, Color32::RED);
        assert_eq!(job.text, "Edit me");
        let format = &job.sections[0].format;
        assert!(format.italics);
        assert_eq!(format.underline, egui::Stroke::NONE);
        assert_eq!(format.color, Color32::RED);
    }

    #[test]
    fn overlays_paint_at_canvas_offset() {
        let ctx = egui::Context::default();
        let mut extent = Rect::NOTHING;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            let painter = ctx.layer_painter(egui::LayerId::background());
            let canvas = Rect::from_min_size(egui::pos2(10.0, 20.0), vec2(800.0, 600.0));
            let rect = Overlay::shape(OverlayId(1), ShapeKind::Rectangle);
            extent = draw_overlay(&painter, canvas, &rect);
        });
        assert_eq!(extent.min, egui::pos2(110.0, 120.0));
        assert_eq!(extent.size(), vec2(100.0, 50.0));
    }

    #[test]
    fn blank_url_view_fails_without_spawning() {
        let ctx = egui::Context::default();
        let view = AnnotationView::new(&ctx, Arc::new(AppConfig::default()), String::new());
        assert!(view.load.is_none());
        assert_eq!(view.session.indicator(), Some(LoadIndicator::Failed));
    }

    #[test]
    fn painted_rows_match_hit_test_rows() {
        let ctx = egui::Context::default();
        let mut overlay = Overlay::text(OverlayId(1));
        if let Some(content) = overlay.text_content_mut() {
            *content = "The quick brown fox jumps over the lazy dog and then runs home".into();
        }
        let mut painted = Rect::NOTHING;
        let mut rows = 0;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            let painter = ctx.layer_painter(egui::LayerId::background());
            let canvas = Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0));
            painted = draw_overlay(&painter, canvas, &overlay);
            let OverlayKind::Text { content, width, style } = &overlay.kind else {
                unreachable!()
            };
            let job = text_layout(content, *width, style, Color32::BLACK);
            rows = ctx.fonts(|f| f.layout_job(job)).rows.len();
        });
        assert!(rows >= 2);
        assert_eq!(painted, overlay.bounds());
        assert_eq!(
            painted.height(),
            rows as f32 * (20.0 * crate::canvas::overlay::LINE_HEIGHT)
        );
    }

    #[test]
    fn drag_grabs_at_press_origin() {
        let press = egui::pos2(100.5, 120.0);
        let moved = egui::pos2(96.0, 120.0);
        assert_eq!(grab_point(Some(press), Some(moved)), Some(press));
        assert_eq!(grab_point(None, Some(moved)), Some(moved));

        // an unfilled rectangle's left edge: the press lands, the moved pointer misses
        let mut s = AnnotationSession::new("", vec2(800.0, 600.0));
        let id = s.add_shape(ShapeKind::Rectangle);
        s.deselect();
        assert_eq!(s.select_at(moved), None);
        assert_eq!(s.select_at(grab_point(Some(press), Some(moved)).unwrap()), Some(id));
    }
}
