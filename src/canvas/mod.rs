pub mod export;
pub mod geometry;
pub mod overlay;
pub mod session;
pub mod text;
pub mod view;

pub use view::{AnnotationEvent, AnnotationView};
