mod api;
mod app;
mod config;
mod event;
mod notation;
mod session;
mod store;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use api::types::StatsSummary;
use app::{App, AppScreen};
use config::Config;
use event::{AppEvent, EventHandler};
use notation::layout::WidthTier;
use session::key_practice::PracticeState;
use session::state::SessionState;
use ui::components::answer_keys::AnswerKeys;
use ui::components::progress_bar::SessionProgress;
use ui::components::stats_panel::StatsPanel;
use ui::components::stave::{STAVE_HEIGHT, Stave};
use ui::components::trend_chart::TrendChart;
use ui::layout::{AppLayout, centered_rect, pack_hint_lines};

#[derive(Parser)]
#[command(name = "clefdr", version, about = "Terminal piano note trainer")]
struct Cli {
    #[arg(short, long, help = "Practice server base URL")]
    server: Option<String>,

    #[arg(short, long, help = "Theme name (light, dark)")]
    theme: Option<String>,

    #[arg(short, long, help = "Directory for exported PDFs and snapshots")]
    downloads: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(downloads) = cli.downloads {
        config.download_dir = downloads;
    }

    let mut app = App::new(config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        let size = terminal.size()?;
        app.tier = WidthTier::from_width(size.width);

        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick(now) => app.on_tick(now),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::KeyPractice => handle_practice_key(app, key),
        AppScreen::SightReading => handle_sight_reading_key(app, key),
        AppScreen::Stats => handle_stats_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('1') => app.start_key_practice(),
        KeyCode::Char('2') => app.go_to_sight_reading(),
        KeyCode::Char('s') => app.go_to_stats(),
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => match app.menu.selected {
            0 => app.start_key_practice(),
            1 => app.go_to_sight_reading(),
            2 => app.go_to_stats(),
            3 => app.toggle_theme(),
            _ => {}
        },
        _ => {}
    }
}

fn handle_practice_key(app: &mut App, key: KeyEvent) {
    if app.key_practice.session_complete {
        match key.code {
            KeyCode::Char('r') => app.restart_session(),
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => app.go_to_menu(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.go_to_menu(),
        KeyCode::Char('n') => app.request_new_prompt(),
        KeyCode::Char(ch) => app.answer_key(ch),
        _ => {}
    }
}

fn handle_sight_reading_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Char('g') | KeyCode::Enter => app.generate_melody(),
        KeyCode::Char('e') => app.export_melody(),
        KeyCode::Char('d') => app.sight_reading.cycle_difficulty(),
        KeyCode::Char('c') => app.sight_reading.cycle_clef(),
        _ => {}
    }
}

fn handle_stats_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Char('e') => app.export_chart(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::KeyPractice => render_practice(frame, app),
        AppScreen::SightReading => render_sight_reading(frame, app),
        AppScreen::Stats => render_stats(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect, title: &str) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " clefdr ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {title}"),
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: Rect, hints: &[&str]) {
    let colors = &app.theme.colors;
    let lines: Vec<Line> = pack_hint_lines(hints, area.width as usize)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.accent_dim()))))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let layout = AppLayout::new(frame.area());
    render_header(frame, app, layout.header, "Piano Note Trainer");

    let menu_area = centered_rect(50, 80, layout.main);
    frame.render_widget(&app.menu, menu_area);

    render_footer(
        frame,
        app,
        layout.footer,
        &["[1] Key Practice", "[2] Sight Reading", "[s] Stats", "[t] Theme", "[q] Quit"],
    );
}

fn score_readout(session: &SessionState) -> String {
    format!(
        "Score: {}/{}   Accuracy: {}%",
        session.score,
        session.total_attempts,
        session.accuracy_percent()
    )
}

/// Text of the end-of-session summary. Average response time comes from the
/// server statistics refreshed after every answer.
fn summary_lines(session: &SessionState, stats: Option<&StatsSummary>) -> Vec<String> {
    let mut lines = vec![
        format!("Score: {}/{}", session.score, session.total_attempts),
        format!("Accuracy: {}%", session.accuracy_percent()),
    ];
    if let Some(stats) = stats {
        lines.push(format!(
            "Avg response: {}ms",
            stats.avg_response_time.round() as i64
        ));
    }
    lines
}

fn render_practice(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let layout = AppLayout::new(frame.area());
    render_header(frame, app, layout.header, "Key Practice");

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(STAVE_HEIGHT),
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(layout.main);

    if let Some(stave) = app.key_practice.stave.layout() {
        frame.render_widget(
            Stave::new(stave, app.key_practice.stave.dimmed(), app.theme),
            rows[0],
        );
    } else {
        let waiting = match &app.key_practice.last_error {
            Some(err) => Line::from(Span::styled(
                format!("Could not reach the server: {err}"),
                Style::default().fg(colors.error()),
            )),
            None => Line::from(Span::styled(
                "Fetching a note...",
                Style::default().fg(colors.accent_dim()),
            )),
        };
        frame.render_widget(Paragraph::new(waiting).alignment(Alignment::Center), rows[0]);
    }

    let feedback_lines = match &app.key_practice.feedback {
        Some(feedback) => {
            let color = if feedback.correct {
                colors.correct()
            } else {
                colors.incorrect()
            };
            vec![
                Line::from(Span::styled(
                    feedback.message.clone(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    feedback.details.clone(),
                    Style::default().fg(colors.fg()),
                )),
            ]
        }
        None => vec![
            Line::from(Span::styled(
                "Which note is this?",
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
        ],
    };
    frame.render_widget(
        Paragraph::new(feedback_lines).alignment(Alignment::Center),
        rows[1],
    );

    let accepting = app.key_practice.state == PracticeState::AwaitingAnswer
        && !app.key_practice.session_complete;
    frame.render_widget(
        AnswerKeys::new(app.key_practice.marked, accepting, app.theme),
        rows[2],
    );

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            score_readout(&app.session),
            Style::default().fg(colors.fg()),
        )))
        .alignment(Alignment::Center),
        rows[3],
    );

    frame.render_widget(SessionProgress::new(&app.session, app.theme), rows[4]);

    render_footer(
        frame,
        app,
        layout.footer,
        &["[C-B] Answer", "[n] New note", "[Esc] Menu"],
    );

    if app.key_practice.session_complete {
        render_session_summary(frame, app);
    }
}

fn render_session_summary(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let area = centered_rect(40, 30, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(" Session Complete ")
        .border_style(Style::default().fg(colors.border_focused()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let mut lines = vec![Line::from("")];
    for (i, text) in summary_lines(&app.session, app.stats.stats.as_ref())
        .into_iter()
        .enumerate()
    {
        let style = if i == 0 {
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.fg())
        };
        lines.push(Line::from(Span::styled(text, style)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[r] Practice again   [Esc] Menu",
        Style::default().fg(colors.accent_dim()),
    )));
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        inner,
    );
}

fn render_sight_reading(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let layout = AppLayout::new(frame.area());
    render_header(frame, app, layout.header, "Sight Reading");

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(STAVE_HEIGHT),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(layout.main);

    let params = Line::from(vec![
        Span::styled("Difficulty: ", Style::default().fg(colors.accent_dim())),
        Span::styled(
            app.sight_reading.difficulty.as_str(),
            Style::default().fg(colors.accent()),
        ),
        Span::styled("   Clef: ", Style::default().fg(colors.accent_dim())),
        Span::styled(
            app.sight_reading.clef.as_str(),
            Style::default().fg(colors.accent()),
        ),
    ]);
    frame.render_widget(Paragraph::new(params).alignment(Alignment::Center), rows[0]);

    if let Some(stave) = app.sight_reading.stave.layout() {
        frame.render_widget(
            Stave::new(stave, app.sight_reading.stave.dimmed(), app.theme),
            rows[1],
        );
    } else {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Press [g] to generate a melody",
                Style::default().fg(colors.accent_dim()),
            )))
            .alignment(Alignment::Center),
            rows[1],
        );
    }

    let status = if let Some(err) = &app.sight_reading.last_error {
        Line::from(Span::styled(
            err.clone(),
            Style::default().fg(colors.error()),
        ))
    } else if let Some(melody) = &app.sight_reading.melody {
        Line::from(Span::styled(
            format!(
                "Key: {}   Time: {}",
                melody.key_signature, melody.time_signature
            ),
            Style::default().fg(colors.fg()),
        ))
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(status).alignment(Alignment::Center), rows[2]);

    if let Some(message) = &app.status {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                message.clone(),
                Style::default().fg(colors.correct()),
            )))
            .alignment(Alignment::Center),
            rows[3],
        );
    }

    let export_hint = if app.sight_reading.export_enabled {
        "[e] Export PDF"
    } else {
        ""
    };
    render_footer(
        frame,
        app,
        layout.footer,
        &["[g] Generate", export_hint, "[d] Difficulty", "[c] Clef", "[Esc] Menu"],
    );
}

fn render_stats(frame: &mut ratatui::Frame, app: &App) {
    let colors = &app.theme.colors;
    let layout = AppLayout::new(frame.area());
    render_header(frame, app, layout.header, "Statistics");

    // The current session's n/10 bar is mirrored here above the panels.
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(layout.main);
    frame.render_widget(SessionProgress::new(&app.session, app.theme), sections[0]);

    let panels: Vec<Rect> = if layout.tier == WidthTier::Full {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(sections[1])
            .to_vec()
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(sections[1])
            .to_vec()
    };

    let activities = app.stats.recent_activities();
    frame.render_widget(
        StatsPanel::new(app.stats.stats.as_ref(), &activities, app.theme),
        panels[0],
    );

    let empty: Vec<api::types::GraphPoint> = Vec::new();
    let points = app.stats.graph.as_deref().unwrap_or(&empty);
    frame.render_widget(TrendChart::new(points, app.theme), panels[1]);

    if let Some(err) = &app.stats.last_error {
        let line = Line::from(Span::styled(
            err.clone(),
            Style::default().fg(colors.error()),
        ));
        frame.render_widget(Paragraph::new(line), layout.footer);
        return;
    }
    if let Some(message) = &app.status {
        let line = Line::from(Span::styled(
            message.clone(),
            Style::default().fg(colors.correct()),
        ));
        frame.render_widget(Paragraph::new(line), layout.footer);
        return;
    }

    render_footer(
        frame,
        app,
        layout.footer,
        &["[e] Export chart", "[Esc] Menu"],
    );
}
