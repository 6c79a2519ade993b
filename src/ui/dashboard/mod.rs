use std::path::PathBuf;
use std::sync::Arc;

use egui::{Color32, ComboBox, Frame, Margin, RichText, Ui};
use egui_dropdown::DropDownBox;
use itertools::Itertools;
use log::{error, info, warn};

use crate::config::DefaultSelection;
use crate::errors::no_data_warning;
use crate::telemetry::{
    CachedSessionProvider, EventSummary, Session, SessionProvider, SessionStore, SessionType,
};

use super::{dashboard_visuals, error_label, warning_label};

mod data_types;
mod pages;

use data_types::{LapSelection, Page, SessionKey, UiState};
use pages::{build_page_data, show_page};

/// Interactive dashboard over a local session store.
///
/// The sidebar picks the page and the (year, track, session, driver, lap)
/// selection. A session is loaded again only when year, track or session
/// change, through the session cache.
pub struct DashboardApp {
    provider: CachedSessionProvider<SessionStore>,
    schedule: Vec<EventSummary>,
    page: Page,
    year: u32,
    track: String,
    session_type: SessionType,
    driver: String,
    lap: LapSelection,
    loaded: Option<SessionKey>,
    ui_state: UiState,
}

impl DashboardApp {
    pub fn new(
        store: SessionStore,
        defaults: DefaultSelection,
        cc: &eframe::CreationContext<'_>,
    ) -> Self {
        cc.egui_ctx.set_visuals(dashboard_visuals());
        Self::with_store(store, defaults)
    }

    pub(crate) fn with_store(store: SessionStore, defaults: DefaultSelection) -> Self {
        let mut app = Self {
            provider: CachedSessionProvider::new(store),
            schedule: Vec::new(),
            page: Page::SpeedPlot,
            year: defaults.year,
            track: defaults.track,
            session_type: defaults.session,
            driver: defaults.driver,
            lap: LapSelection::Fastest,
            loaded: None,
            ui_state: UiState::Idle,
        };
        app.refresh_schedule();
        app
    }

    fn refresh_schedule(&mut self) {
        match self.provider.event_schedule() {
            Ok(schedule) => {
                info!(
                    "Found {} recorded events in {:?}",
                    schedule.len(),
                    self.provider.inner().root()
                );
                self.schedule = schedule;
            }
            Err(e) => {
                error!("Could not list recorded events: {}", e);
                self.schedule = Vec::new();
                self.ui_state = UiState::Error {
                    message: format!("Could not list recorded events: {}", e),
                };
            }
        }
    }

    fn change_data_dir(&mut self, path: PathBuf) {
        match SessionStore::new(path) {
            Ok(store) => {
                self.provider = CachedSessionProvider::new(store);
                self.loaded = None;
                self.ui_state = UiState::Idle;
                self.refresh_schedule();
            }
            Err(e) => {
                self.ui_state = UiState::Error {
                    message: format!("Could not open data folder: {}", e),
                };
            }
        }
    }

    fn years(&self) -> Vec<u32> {
        self.schedule
            .iter()
            .map(|e| e.year)
            .chain(std::iter::once(self.year))
            .unique()
            .sorted()
            .collect()
    }

    fn tracks(&self) -> Vec<String> {
        self.schedule
            .iter()
            .filter(|e| e.year == self.year)
            .map(|e| e.event_name.clone())
            .collect()
    }

    fn selection_key(&self) -> SessionKey {
        SessionKey {
            year: self.year,
            track: self.track.trim().to_string(),
            session: self.session_type,
        }
    }

    fn current_session(&self) -> Option<Arc<Session>> {
        match &self.ui_state {
            UiState::Display { session } => Some(Arc::clone(session)),
            _ => None,
        }
    }

    fn ensure_session_loaded(&mut self) {
        let key = self.selection_key();
        if self.loaded.as_ref() == Some(&key) {
            return;
        }
        self.loaded = Some(key.clone());
        if key.track.is_empty() {
            self.ui_state = UiState::Idle;
            return;
        }

        match self.provider.load_session(key.year, &key.track, key.session) {
            Ok(session) => {
                let drivers = session.drivers();
                if !drivers.iter().any(|d| d.eq_ignore_ascii_case(&self.driver))
                    && let Some(first) = drivers.first()
                {
                    self.driver = first.clone();
                }
                self.lap = LapSelection::Fastest;
                self.ui_state = UiState::Display { session };
            }
            Err(e) => {
                warn!("Could not load {:?}: {}", key, e);
                self.ui_state = UiState::Error {
                    message: format!("Could not load session: {}", e),
                };
            }
        }
    }

    fn show_sidebar(&mut self, ui: &mut Ui) {
        ui.heading(RichText::new("F1 Dashboard").color(Color32::WHITE).strong());
        ui.separator();

        ComboBox::from_label("Page")
            .selected_text(self.page.title())
            .show_ui(ui, |ui| {
                for page in Page::ALL {
                    ui.selectable_value(&mut self.page, page, page.title());
                }
            });

        let years = self.years();
        ComboBox::from_label("Year")
            .selected_text(self.year.to_string())
            .show_ui(ui, |ui| {
                for year in years {
                    ui.selectable_value(&mut self.year, year, year.to_string());
                }
            });

        ui.label(RichText::new("Track").color(Color32::WHITE));
        let tracks = self.tracks();
        ui.add(
            DropDownBox::from_iter(
                &tracks,
                "track_dropbox",
                &mut self.track,
                |ui, text| ui.selectable_label(false, text),
            )
            .filter_by_input(true),
        );

        ComboBox::from_label("Session")
            .selected_text(self.session_type.code())
            .show_ui(ui, |ui| {
                for session_type in SessionType::ALL {
                    ui.selectable_value(&mut self.session_type, session_type, session_type.code());
                }
            });

        if let Some(session) = self.current_session() {
            ui.label(RichText::new("Driver").color(Color32::WHITE));
            let previous_driver = self.driver.clone();
            ui.add(
                DropDownBox::from_iter(
                    session.drivers(),
                    "driver_dropbox",
                    &mut self.driver,
                    |ui, text| ui.selectable_label(false, text),
                )
                .filter_by_input(false),
            );
            if previous_driver != self.driver {
                self.lap = LapSelection::Fastest;
            }

            ComboBox::from_label("Lap")
                .selected_text(self.lap.to_string())
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.lap, LapSelection::Fastest, "Fastest");
                    for lap in session.pick_driver(&self.driver) {
                        let choice = LapSelection::Number(lap.lap_number);
                        ui.selectable_value(&mut self.lap, choice, choice.to_string());
                    }
                });
        }

        ui.separator();
        if ui.button("📂 Data folder").clicked()
            && let Some(path) = rfd::FileDialog::new().pick_folder()
        {
            self.change_data_dir(path);
        }
        ui.label(
            RichText::new(self.provider.inner().root().display().to_string())
                .color(Color32::LIGHT_GRAY)
                .small(),
        );
    }

    fn show_page(&self, ui: &mut Ui) {
        match &self.ui_state {
            UiState::Idle => {
                ui.label(
                    RichText::new("Select a year, track and session")
                        .color(Color32::WHITE)
                        .strong(),
                );
            }
            UiState::Error { message } => error_label(ui, message.clone()),
            UiState::Display { session } => {
                match build_page_data(self.page, session, &self.driver, self.lap) {
                    Ok(data) => {
                        let title = format!(
                            "{} {} - {} - Speed",
                            session.info.event_name, session.info.year, self.driver
                        );
                        show_page(ui, &data, &self.driver, &title);
                    }
                    Err(e) if e.is_data_absence() => {
                        warning_label(ui, no_data_warning(self.page.data_name(), &self.driver));
                    }
                    Err(e) => error_label(ui, e.to_string()),
                }
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("Selectors")
            .frame(Frame::default().inner_margin(Margin::same(8)))
            .resizable(false)
            .min_width(220.0)
            .show(ctx, |ui| self.show_sidebar(ui));

        self.ensure_session_loaded();

        egui::CentralPanel::default()
            .frame(Frame::default().inner_margin(Margin::same(8)))
            .show(ctx, |ui| self.show_page(ui));
    }
}
