use std::sync::Arc;

use eframe::egui;

use crate::canvas::{AnnotationEvent, AnnotationView};
use crate::config::AppConfig;
use crate::search::client::{PhotoSource, UnsplashClient};
use crate::search::{SearchEvent, SearchView};

enum Screen {
    Search(SearchView),
    Annotate(AnnotationView),
}

pub struct CaptionApp {
    config: Arc<AppConfig>,
    source: Arc<dyn PhotoSource>,
    screen: Screen,
}

impl CaptionApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        let source: Arc<dyn PhotoSource> = Arc::new(UnsplashClient::new(&config));
        Self::with_source(Arc::new(config), source)
    }

    fn with_source(config: Arc<AppConfig>, source: Arc<dyn PhotoSource>) -> Self {
        let screen = Screen::Search(SearchView::new(Arc::clone(&config), Arc::clone(&source)));
        Self {
            config,
            source,
            screen,
        }
    }
}

impl eframe::App for CaptionApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let next = match &mut self.screen {
            Screen::Search(view) => view.ui(ctx).map(|SearchEvent::Selected(url)| {
                Screen::Annotate(AnnotationView::new(ctx, Arc::clone(&self.config), url))
            }),
            Screen::Annotate(view) => view.ui(ctx).map(|AnnotationEvent::Reset| {
                tracing::debug!("Annotation session discarded");
                Screen::Search(SearchView::new(
                    Arc::clone(&self.config),
                    Arc::clone(&self.source),
                ))
            }),
        };
        if let Some(screen) = next {
            // replacing drops the previous view and everything it owns
            self.screen = screen;
        }
    }
}
