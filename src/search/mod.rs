pub mod client;
pub mod debounce;
pub mod model;
pub mod state;

use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;
use crate::error::{DownloadError, SearchError};
use crate::files::{self, SaveTarget};
use crate::http;
use crate::task::{self, Pending, Poll};
use client::PhotoSource;
use model::Photo;
use state::{ResultAction, SearchRequest, SearchState, SearchStatus};

const TILE_SIZE: egui::Vec2 = egui::vec2(240.0, 180.0);

type SearchOutcome = Result<Vec<Photo>, SearchError>;

pub enum SearchEvent {
    /// The user picked a photo to annotate
    Selected(String),
}

pub struct SearchView {
    state: SearchState,
    source: Arc<dyn PhotoSource>,
    config: Arc<AppConfig>,
    in_flight: Vec<(u64, Pending<SearchOutcome>)>,
}

impl SearchView {
    pub fn new(config: Arc<AppConfig>, source: Arc<dyn PhotoSource>) -> Self {
        Self {
            state: SearchState::new(config.debounce()),
            source,
            config,
            in_flight: Vec::new(),
        }
    }

    fn dispatch(&mut self, ctx: &egui::Context, request: SearchRequest) {
        let source = Arc::clone(&self.source);
        let per_page = self.config.per_page;
        let SearchRequest { seq, query } = request;
        tracing::debug!("Dispatching search #{} for {:?}", seq, query);
        let pending = task::spawn(ctx, move || source.search(&query, per_page));
        self.in_flight.push((seq, pending));
    }

    fn collect_responses(&mut self) {
        let state = &mut self.state;
        self.in_flight.retain(|(seq, pending)| match pending.poll() {
            Poll::Ready(outcome) => {
                state.finish(*seq, outcome);
                false
            }
            Poll::Lost => {
                tracing::warn!("Search worker #{} exited without a result", seq);
                state.abandon(*seq);
                false
            }
            Poll::Waiting => true,
        });
    }

    fn download(&self, ctx: &egui::Context, url: String) {
        let name = files::download_filename(&url);
        let target = match SaveTarget::choose(&self.config, &name) {
            Ok(target) => target,
            Err(e) => {
                tracing::info!("Download of {} not saved: {}", name, e);
                return;
            }
        };
        // the result is only logged, so nothing keeps the slot
        let _ = task::spawn(ctx, move || {
            let result = http::fetch_bytes(&http::agent(), &url)
                .map_err(DownloadError::from)
                .and_then(|bytes| target.write(&name, &bytes).map_err(DownloadError::from));
            match result {
                Ok(path) => tracing::info!("Downloaded {} to {}", url, path.display()),
                Err(e) => tracing::error!("Download error: {}", e),
            }
        });
    }

    pub fn ui(&mut self, ctx: &egui::Context) -> Option<SearchEvent> {
        let now = Instant::now();
        self.collect_responses();
        if let Some(request) = self.state.poll(now) {
            self.dispatch(ctx, request);
        }
        if let Some(wait) = self.state.next_wakeup(now) {
            ctx.request_repaint_after(wait);
        }

        let mut action = None;

        egui::TopBottomPanel::top("search_bar").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let mut query = self.state.query().to_string();
                let edit = ui.add(
                    egui::TextEdit::singleline(&mut query)
                        .hint_text("Type Here To Search...")
                        .desired_width(ui.available_width() * 0.5),
                );
                if edit.changed() {
                    self.state.set_query(query, Instant::now());
                }
                let submitted =
                    edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let clicked = ui
                    .add_enabled(self.state.can_search(), egui::Button::new("Search"))
                    .clicked();
                if clicked || submitted {
                    if let Some(request) = self.state.search_now() {
                        self.dispatch(ctx, request);
                    }
                }
            });
            ui.add_space(4.0);
            match self.state.status() {
                SearchStatus::Loading => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading...");
                    });
                }
                SearchStatus::Error(message) => {
                    ui.colored_label(ui.visuals().error_fg_color, message);
                }
                SearchStatus::Empty => {
                    ui.colored_label(ui.visuals().warn_fg_color, state::NO_RESULTS_MESSAGE);
                }
                SearchStatus::Idle => {
                    ui.weak(state::IDLE_MESSAGE);
                }
                SearchStatus::Results(n) => {
                    ui.weak(format!("{n} photos"));
                }
            }
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for photo in self.state.results() {
                        if let Some(a) = result_tile(ui, photo) {
                            action = Some(a);
                        }
                    }
                });
            });
        });

        match action? {
            ResultAction::Select(url) => {
                tracing::info!("Selected photo {}", url);
                Some(SearchEvent::Selected(url))
            }
            ResultAction::Download(url) => {
                self.download(ctx, url);
                None
            }
        }
    }
}

fn result_tile(ui: &mut egui::Ui, photo: &Photo) -> Option<ResultAction> {
    let [select, download] = state::tile_actions(photo);
    let mut action = None;
    ui.push_id(&photo.id, |ui| {
        ui.group(|ui| {
            ui.set_width(TILE_SIZE.x);
            ui.vertical_centered(|ui| {
                ui.add(
                    egui::Image::new(photo.urls.small.as_str())
                        .max_size(TILE_SIZE)
                        .show_loading_spinner(true),
                )
                .on_hover_text(photo.alt_text());
                ui.horizontal(|ui| {
                    if ui.button("Add Caption").clicked() {
                        action = Some(select);
                    }
                    if ui.button("Download").clicked() {
                        action = Some(download);
                    }
                });
            });
        });
    });
    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::model::PhotoUrls;

    struct FixedSource(usize);

    impl PhotoSource for FixedSource {
        fn search(&self, query: &str, per_page: u32) -> Result<Vec<Photo>, SearchError> {
            assert_eq!(per_page, 20);
            Ok((0..self.0)
                .map(|i| Photo {
                    id: format!("{query}-{i}"),
                    urls: PhotoUrls {
                        small: format!("https://img.test/{i}/s"),
                        regular: format!("https://img.test/{i}/r"),
                        full: format!("https://img.test/{i}/f"),
                    },
                    alt_description: None,
                })
                .collect())
        }
    }

    #[test]
    fn dispatched_search_lands_in_state() {
        let ctx = egui::Context::default();
        let mut view = SearchView::new(Arc::new(AppConfig::default()), Arc::new(FixedSource(3)));
        view.state.set_query("cats", Instant::now());
        let request = view.state.search_now().unwrap();
        view.dispatch(&ctx, request);

        while !view.in_flight.is_empty() {
            view.collect_responses();
            std::thread::yield_now();
        }
        assert_eq!(view.state.status(), SearchStatus::Results(3));
        assert_eq!(view.state.results()[2].id, "cats-2");
    }

    struct BrokenSource;

    impl PhotoSource for BrokenSource {
        fn search(&self, _query: &str, _per_page: u32) -> Result<Vec<Photo>, SearchError> {
            panic!("source crashed");
        }
    }

    #[test]
    fn crashed_worker_reports_failure() {
        let ctx = egui::Context::default();
        let mut view = SearchView::new(Arc::new(AppConfig::default()), Arc::new(BrokenSource));
        view.state.set_query("cats", Instant::now());
        let request = view.state.search_now().unwrap();
        view.dispatch(&ctx, request);

        while !view.in_flight.is_empty() {
            view.collect_responses();
            std::thread::yield_now();
        }
        assert_eq!(
            view.state.status(),
            SearchStatus::Error(state::SEARCH_FAILED_MESSAGE)
        );
    }
}
