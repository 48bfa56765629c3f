use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::debug;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use prayer_ledger::utils::format::{format_days, format_percent};
use prayer_ledger::{DayLog, PrayerLedger, PrayerName, SqliteStore, Streak, WeeklyGrid};

use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{completion, header, prayers, statusbar, streak};

pub type Ledger = PrayerLedger<SqliteStore>;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Stats,
    Help,
}

pub struct App {
    pub view: View,
    pub focus_idx: usize,
    pub should_quit: bool,

    // Cached state (refreshed on load and on day rollover)
    pub today: NaiveDate,
    pub day_log: DayLog,
    pub streak: Streak,
    pub prayer_streaks: Vec<(PrayerName, u32)>,
    pub weekly: WeeklyGrid,
    pub completion: f64,
}

impl App {
    pub fn new(today: NaiveDate) -> Self {
        App {
            view: View::Dashboard,
            focus_idx: 0,
            should_quit: false,
            today,
            day_log: DayLog::new(today),
            streak: Streak::default(),
            prayer_streaks: Vec::new(),
            weekly: WeeklyGrid::default(),
            completion: 0.0,
        }
    }

    pub fn load(&mut self, ledger: &Ledger) {
        self.today = ledger.today();
        self.day_log = ledger.day_log(self.today);
        self.streak = ledger.streak(self.today);
        self.prayer_streaks = PrayerName::all()
            .map(|p| (p, ledger.prayer_streak(p, self.today)))
            .collect();
        self.weekly = ledger.weekly_grid(self.today);
        self.completion = ledger.last_7_days_completion();
    }

    /// Reload when the calendar day has moved on.
    pub fn tick(&mut self, ledger: &Ledger) {
        let today = ledger.today();
        if today != self.today {
            debug!("Day rolled over to {}", today);
            self.load(ledger);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, ledger: &mut Ledger) {
        // Some terminals also report release and repeat events
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.view {
            View::Dashboard => self.handle_dashboard_key(key, ledger),
            View::Stats => self.handle_stats_key(key),
            View::Help => self.handle_help_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent, ledger: &mut Ledger) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Char('s') => {
                self.view = View::Stats;
            }
            KeyCode::Up => {
                self.focus_idx = self.focus_idx.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.focus_idx < PrayerName::COUNT - 1 {
                    self.focus_idx += 1;
                }
            }
            KeyCode::Char('m') | KeyCode::Char(' ') | KeyCode::Enter => {
                self.toggle_focused(ledger);
            }
            _ => {}
        }
    }

    fn handle_stats_key(&mut self, key: KeyEvent) {
        if let KeyCode::Esc | KeyCode::Char('s') = key.code {
            self.view = View::Dashboard;
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        if let KeyCode::Esc | KeyCode::Char('?') = key.code {
            self.view = View::Dashboard;
        }
    }

    fn toggle_focused(&mut self, ledger: &mut Ledger) {
        if let Some(prayer) = PrayerName::ALL.get(self.focus_idx).copied() {
            ledger.toggle(prayer, self.today);
            self.load(ledger);
        }
    }

    pub fn draw(&self, frame: &mut Frame, ledger: &Ledger) {
        match self.view {
            View::Dashboard => self.draw_dashboard(frame, ledger),
            View::Stats => self.draw_stats(frame),
            View::Help => {
                self.draw_dashboard(frame, ledger);
                self.draw_help_overlay(frame);
            }
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame, ledger: &Ledger) {
        let area = frame.area();

        // Clear background
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(frame, outer_chunks[0], self.today);
        statusbar::render(frame, outer_chunks[2]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer_chunks[1]);

        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(0)])
            .split(columns[0]);

        prayers::render(
            frame,
            left_chunks[0],
            &self.day_log,
            self.focus_idx,
            ledger.offset(),
        );

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Length(5), Constraint::Min(0)])
            .split(columns[1]);

        streak::render(frame, right_chunks[0], &self.streak, &self.weekly);
        completion::render(frame, right_chunks[1], self.completion);
    }

    fn draw_stats(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("  Stats  ", theme::gold().add_modifier(Modifier::BOLD)),
            Span::styled("  [Esc] back", theme::dim()),
        ]));
        frame.render_widget(title, chunks[0]);

        let mut lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Streak (current):  ", theme::dim()),
                Span::styled(
                    format_days(self.streak.current),
                    theme::green().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("  Streak (best):     ", theme::dim()),
                Span::styled(format_days(self.streak.best), theme::green()),
            ]),
            Line::from(vec![
                Span::styled("  Last 7 days:       ", theme::dim()),
                Span::styled(format_percent(self.completion), theme::amber()),
            ]),
            Line::from(""),
            Line::from(Span::styled("  Per Prayer", theme::gold())),
            Line::from(""),
        ];

        for (prayer, days) in &self.prayer_streaks {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<10}", prayer.display_name()), theme::bold()),
                Span::styled(format_days(*days), theme::green()),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("  Last 7 Days", theme::gold())));
        lines.push(Line::from(""));

        // Weekly heatmap
        for stat in &self.weekly.days {
            let bar = match stat.prayers_done {
                5 => Span::styled("  ████████████  ", theme::green()),
                4 => Span::styled("  █████████░░░  ", theme::green()),
                3 => Span::styled("  ████████░░░░  ", theme::amber()),
                2 => Span::styled("  █████░░░░░░░  ", theme::amber()),
                1 => Span::styled("  ███░░░░░░░░░  ", theme::dim()),
                _ => Span::styled("  ░░░░░░░░░░░░  ", theme::dim()),
            };
            lines.push(Line::from(vec![
                bar,
                Span::styled(
                    format!("{}  {}/{}", stat.date, stat.prayers_done, stat.prayers_total),
                    theme::dim(),
                ),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), chunks[1]);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();

        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: area.height / 2,
        };

        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("  [m] / Enter  ", "Toggle prayer"),
            ("  [↑ ↓]        ", "Navigate prayers"),
            ("  [s]          ", "Stats view"),
            ("  [?]          ", "Toggle help"),
            ("  [Esc] / [q]  ", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(key, theme::gold()),
                Span::styled(label, theme::dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }
}

/// Run the dashboard event loop.
pub fn run(mut ledger: Ledger) -> Result<()> {
    let mut app = App::new(ledger.today());
    app.load(&ledger);

    let mut terminal = ratatui::init();
    let events = EventHandler::new(1000);

    let result = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| app.draw(frame, &ledger))?;

            match events.next()? {
                Event::Key(key) => {
                    app.handle_key(key, &mut ledger);
                    if app.should_quit {
                        return Ok(());
                    }
                }
                Event::Tick => app.tick(&ledger),
            }
        }
    })();

    ratatui::restore();
    result
}
