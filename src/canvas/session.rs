use egui::{vec2, Color32, Pos2, Vec2};
use image::RgbaImage;

use crate::canvas::geometry::{fit_inside, Placement};
use crate::canvas::overlay::{Overlay, OverlayId, ShapeKind, TextFlag};
use crate::error::ImageLoadError;

pub const LOAD_FAILED_MESSAGE: &str = "Image Loading Failed. Please Try Later";
pub const LOAD_SUCCEEDED_MESSAGE: &str = "Image Loaded Successfully";

pub struct BaseImage {
    pub pixels: RgbaImage,
    pub placement: Placement,
}

pub enum LoadState {
    Loading,
    Loaded(BaseImage),
    Failed,
}

/// Banner above the toolbar. Loading shows neither.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadIndicator {
    Succeeded,
    Failed,
}

/// One base image plus the overlays drawn on it. The base image lives
/// outside the overlay list, so no overlay operation can remove it.
pub struct AnnotationSession {
    url: String,
    canvas_size: Vec2,
    load: LoadState,
    overlays: Vec<Overlay>,
    active: Option<OverlayId>,
    next_id: u64,
}

impl AnnotationSession {
    /// A blank URL fails right away.
    pub fn new(url: impl Into<String>, canvas_size: Vec2) -> Self {
        let url = url.into();
        let load = if url.trim().is_empty() {
            tracing::warn!("{}", ImageLoadError::EmptyUrl);
            LoadState::Failed
        } else {
            LoadState::Loading
        };
        Self {
            url,
            canvas_size,
            load,
            overlays: Vec::new(),
            active: None,
            next_id: 1,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn canvas_size(&self) -> Vec2 {
        self.canvas_size
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.load, LoadState::Loading)
    }

    pub fn base(&self) -> Option<&BaseImage> {
        match &self.load {
            LoadState::Loaded(base) => Some(base),
            _ => None,
        }
    }

    pub fn indicator(&self) -> Option<LoadIndicator> {
        match self.load {
            LoadState::Loading => None,
            LoadState::Loaded(_) => Some(LoadIndicator::Succeeded),
            LoadState::Failed => Some(LoadIndicator::Failed),
        }
    }

    /// Fit and center the decoded image on the canvas.
    pub fn image_loaded(&mut self, pixels: RgbaImage) {
        let source = vec2(pixels.width() as f32, pixels.height() as f32);
        let placement = fit_inside(source, self.canvas_size);
        tracing::info!(
            "Loaded {}x{} image, scale {:.3}",
            pixels.width(),
            pixels.height(),
            placement.scale
        );
        self.load = LoadState::Loaded(BaseImage { pixels, placement });
    }

    pub fn image_failed(&mut self, err: &ImageLoadError) {
        tracing::error!("Failed to load {}: {}", self.url, err);
        self.load = LoadState::Failed;
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn active_id(&self) -> Option<OverlayId> {
        self.active
    }

    pub fn active(&self) -> Option<&Overlay> {
        let id = self.active?;
        self.overlays.iter().find(|o| o.id == id)
    }

    pub fn active_mut(&mut self) -> Option<&mut Overlay> {
        let id = self.active?;
        self.overlays.iter_mut().find(|o| o.id == id)
    }

    fn next_id(&mut self) -> OverlayId {
        let id = OverlayId(self.next_id);
        self.next_id += 1;
        id
    }

    fn push_active(&mut self, overlay: Overlay) -> OverlayId {
        let id = overlay.id;
        self.overlays.push(overlay);
        self.active = Some(id);
        id
    }

    pub fn add_text(&mut self) -> OverlayId {
        let id = self.next_id();
        self.push_active(Overlay::text(id))
    }

    pub fn add_shape(&mut self, shape: ShapeKind) -> OverlayId {
        let id = self.next_id();
        self.push_active(Overlay::shape(id, shape))
    }

    pub fn deselect(&mut self) {
        self.active = None;
    }

    /// Select the top-most overlay under `p`, or clear the selection.
    pub fn select_at(&mut self, p: Pos2) -> Option<OverlayId> {
        self.active = self.overlays.iter().rev().find(|o| o.contains(p)).map(|o| o.id);
        self.active
    }

    /// Fill the active overlay and drop its outline.
    pub fn apply_color(&mut self, color: Color32) -> bool {
        let Some(active) = self.active_mut() else {
            return false;
        };
        active.fill = Some(color);
        active.stroke = None;
        true
    }

    pub fn toggle(&mut self, flag: TextFlag) -> bool {
        self.active_mut().is_some_and(|o| o.toggle(flag))
    }

    pub fn move_active(&mut self, delta: Vec2) -> bool {
        let Some(active) = self.active_mut() else {
            return false;
        };
        active.translate(delta);
        true
    }

    pub fn remove_active(&mut self) -> bool {
        let Some(id) = self.active.take() else {
            return false;
        };
        let before = self.overlays.len();
        self.overlays.retain(|o| o.id != id);
        self.overlays.len() != before
    }

    /// Remove every overlay. The base image stays.
    pub fn clear_all(&mut self) {
        tracing::debug!("Clearing {} overlays", self.overlays.len());
        self.overlays.clear();
        self.active = None;
    }
}
