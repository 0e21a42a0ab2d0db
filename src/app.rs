use std::path::PathBuf;
use std::time::Instant;

use crate::api::client::{HttpApi, PracticeApi};
use crate::api::fetch::{ApiResponse, Fetcher};
use crate::config::Config;
use crate::notation::layout::WidthTier;
use crate::session::key_practice::KeyPracticeController;
use crate::session::sight_reading::SightReadingController;
use crate::session::state::SessionState;
use crate::session::stats_view::StatsView;
use crate::store::downloads::Downloads;
use crate::ui::components::menu::Menu;
use crate::ui::components::trend_chart::TrendChart;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    KeyPractice,
    SightReading,
    Stats,
}

pub struct App {
    pub screen: AppScreen,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub session: SessionState,
    pub key_practice: KeyPracticeController,
    pub sight_reading: SightReadingController,
    pub stats: StatsView,
    pub downloads: Option<Downloads>,
    pub fetcher: Fetcher,
    /// Responsive tier from the last rendered frame, used when positioning
    /// staves for responses that arrive between frames.
    pub tier: WidthTier,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let api = HttpApi::new(&config.server_url)?;
        Ok(Self::with_api(config, api))
    }

    /// Construction seam shared with integration tests, which inject a
    /// scripted API instead of a live server.
    pub fn with_api<A>(mut config: Config, api: A) -> Self
    where
        A: PracticeApi + Send + 'static,
    {
        config.normalize_theme(
            &Theme::available_themes()
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>(),
        );
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));
        let menu = Menu::new(theme);
        let downloads = Downloads::new(PathBuf::from(&config.download_dir)).ok();
        let sight_reading = SightReadingController::new(config.difficulty, config.clef);

        Self {
            screen: AppScreen::Menu,
            menu,
            theme,
            config,
            session: SessionState::default(),
            key_practice: KeyPracticeController::new(),
            sight_reading,
            stats: StatsView::new(),
            downloads,
            fetcher: Fetcher::spawn(api),
            tier: WidthTier::Full,
            status: None,
            should_quit: false,
        }
    }

    pub fn go_to_menu(&mut self) {
        if self.screen == AppScreen::Stats {
            self.stats.close();
        }
        self.screen = AppScreen::Menu;
    }

    /// Enter the drill screen with a fresh session.
    pub fn start_key_practice(&mut self) {
        self.status = None;
        let request = self.key_practice.reset(&mut self.session);
        self.fetcher.submit(request);
        self.screen = AppScreen::KeyPractice;
    }

    /// Restart the drill after the session summary.
    pub fn restart_session(&mut self) {
        let request = self.key_practice.reset(&mut self.session);
        self.fetcher.submit(request);
    }

    pub fn go_to_sight_reading(&mut self) {
        self.status = None;
        self.sight_reading.difficulty = self.config.difficulty;
        self.sight_reading.clef = self.config.clef;
        self.screen = AppScreen::SightReading;
    }

    pub fn generate_melody(&mut self) {
        // Remember the chosen parameters across runs.
        self.config.difficulty = self.sight_reading.difficulty;
        self.config.clef = self.sight_reading.clef;
        let _ = self.config.save();
        let request = self.sight_reading.generate();
        self.fetcher.submit(request);
    }

    pub fn export_melody(&mut self) {
        if let Some(request) = self.sight_reading.export() {
            self.fetcher.submit(request);
        }
    }

    pub fn go_to_stats(&mut self) {
        self.status = None;
        for request in self.stats.open() {
            self.fetcher.submit(request);
        }
        self.screen = AppScreen::Stats;
    }

    /// Save the trend chart as a text snapshot next to the PDF exports.
    pub fn export_chart(&mut self) {
        let Some(points) = self.stats.graph.as_deref() else {
            return;
        };
        let Some(downloads) = &self.downloads else {
            self.status = Some("Download directory unavailable".to_string());
            return;
        };
        let lines = TrendChart::snapshot_lines(points, self.theme);
        match downloads.save_chart_snapshot(&lines) {
            Ok(path) => self.status = Some(format!("Saved {}", path.display())),
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    pub fn answer_key(&mut self, key: char) {
        if let Some(request) = self.key_practice.answer(key) {
            self.fetcher.submit(request);
        }
    }

    pub fn request_new_prompt(&mut self) {
        let request = self.key_practice.request_prompt();
        self.fetcher.submit(request);
    }

    pub fn toggle_theme(&mut self) {
        let next = if self.theme.is_dark() { "light" } else { "dark" };
        if let Some(new_theme) = Theme::load(next) {
            let theme: &'static Theme = Box::leak(Box::new(new_theme));
            self.theme = theme;
            self.menu.theme = theme;
            self.config.theme = next.to_string();
            let _ = self.config.save();
        }
    }

    /// Drain every pending fetch response, then advance timers.
    pub fn on_tick(&mut self, now: Instant) {
        while let Some(response) = self.fetcher.poll() {
            self.apply_response(&response, now);
        }

        if let Some(request) = self.key_practice.tick(now) {
            self.fetcher.submit(request);
        }
        self.sight_reading.tick(now);
    }

    fn apply_response(&mut self, response: &ApiResponse, now: Instant) {
        let wants_stats_refresh =
            self.key_practice
                .on_response(response, &mut self.session, self.tier, now);
        if wants_stats_refresh {
            let request = self.stats.refresh();
            self.fetcher.submit(request);
        }

        self.sight_reading
            .on_response(response, self.downloads.as_ref(), self.tier, now);
        if let Some(path) = self.sight_reading.last_saved.take() {
            self.status = Some(format!("Saved {}", path.display()));
        }

        self.stats.on_response(response);

        // Session progress comes from the server's statistics, never from
        // local counters. The fetch worker is serial, so the last applied
        // summary is the newest one.
        if let ApiResponse::Stats {
            result: Ok(summary),
            ..
        } = response
        {
            self.session.set_progress(summary.current_session_progress);
            if self.session.is_complete() && !self.key_practice.session_complete {
                self.key_practice.complete_session();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ApiError;
    use crate::api::types::{
        AnswerResult, Clef, Difficulty, GraphPoint, Melody, Prompt, StatsSummary,
    };
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Scripted backend: answers are checked against a fixed correct key,
    /// and the stats progress counter follows the number of checks.
    struct ScriptedApi {
        correct_key: char,
        checks: Mutex<u32>,
    }

    impl ScriptedApi {
        fn new(correct_key: char) -> Self {
            Self {
                correct_key,
                checks: Mutex::new(0),
            }
        }
    }

    impl PracticeApi for ScriptedApi {
        fn new_key(&self) -> Result<Prompt, ApiError> {
            Ok(serde_json::from_str(&format!(
                r#"{{"note":"{}","accidental":"","octave":4,"clef":"treble"}}"#,
                self.correct_key
            ))
            .unwrap())
        }

        fn check_key(&self, answer: &str) -> Result<AnswerResult, ApiError> {
            *self.checks.lock().unwrap() += 1;
            let correct = answer == self.correct_key.to_string();
            Ok(AnswerResult {
                correct,
                correct_answer: self.correct_key.to_string(),
                user_answer: Some(answer.to_string()),
                response_time: Some(500.0),
                session_complete: false,
            })
        }

        fn generate_melody(&self, _: Difficulty, _: Clef) -> Result<Melody, ApiError> {
            Err(ApiError::Status(reqwest::StatusCode::NOT_IMPLEMENTED))
        }

        fn export_melody(&self, _: &Melody) -> Result<Vec<u8>, ApiError> {
            Err(ApiError::Status(reqwest::StatusCode::NOT_IMPLEMENTED))
        }

        fn stats(&self) -> Result<StatsSummary, ApiError> {
            Ok(StatsSummary {
                current_session_progress: *self.checks.lock().unwrap(),
                ..StatsSummary::default()
            })
        }

        fn graph_data(&self) -> Result<Vec<GraphPoint>, ApiError> {
            Ok(Vec::new())
        }
    }

    fn test_app(correct_key: char) -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.download_dir = dir.path().to_string_lossy().to_string();
        config.set_path(dir.path().join("config.toml"));
        (dir, App::with_api(config, ScriptedApi::new(correct_key)))
    }

    fn drain(app: &mut App, now: Instant) {
        // The worker thread answers asynchronously; poll until quiet.
        for _ in 0..200 {
            std::thread::sleep(std::time::Duration::from_millis(1));
            app.on_tick(now);
        }
    }

    #[test]
    fn test_answer_round_trip_updates_session_and_feedback() {
        let now = Instant::now();
        let (_dir, mut app) = test_app('D');

        app.start_key_practice();
        drain(&mut app, now);
        assert!(app.key_practice.prompt.is_some());

        app.answer_key('C');
        drain(&mut app, now);

        let feedback = app.key_practice.feedback.as_ref().expect("feedback set");
        assert!(!feedback.correct);
        assert!(feedback.details.contains('D'));
        assert!(feedback.details.contains('C'));
        assert_eq!(app.key_practice.marked, Some(('C', false)));
        assert_eq!(app.session.total_attempts, 1);
        // Progress came back from the stats refresh.
        assert_eq!(app.session.current_progress, 1);
    }

    #[test]
    fn test_stats_screen_open_close() {
        let now = Instant::now();
        let (_dir, mut app) = test_app('C');

        app.go_to_stats();
        drain(&mut app, now);
        assert_eq!(app.screen, AppScreen::Stats);
        assert!(app.stats.stats.is_some());
        assert!(app.stats.graph.is_some());

        app.go_to_menu();
        assert!(app.stats.graph.is_none());
    }

    #[test]
    fn test_theme_toggle_flips_and_persists_choice() {
        let (dir, mut app) = test_app('C');
        assert_eq!(app.theme.name, "light");
        app.toggle_theme();
        assert_eq!(app.theme.name, "dark");
        assert_eq!(app.config.theme, "dark");

        // The choice survives a reload from the saved file.
        let reloaded = Config::load_from(dir.path().join("config.toml")).unwrap();
        assert_eq!(reloaded.theme, "dark");

        app.toggle_theme();
        assert_eq!(app.theme.name, "light");
    }
}
