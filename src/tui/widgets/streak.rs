use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use prayer_ledger::utils::format::{format_days, progress_bar};
use prayer_ledger::{Streak, WeeklyGrid};

use crate::tui::theme;

/// Streak bar fills up over this many days.
const BAR_FULL_DAYS: u32 = 30;

pub fn render(frame: &mut Frame, area: Rect, streak: &Streak, weekly: &WeeklyGrid) {
    let block = Block::default()
        .title(Span::styled(" Streak ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let streak_line = Line::from(vec![
        Span::styled("  ", theme::dim()),
        Span::styled(
            progress_bar(streak.current.min(BAR_FULL_DAYS), BAR_FULL_DAYS, 12),
            theme::green(),
        ),
        Span::styled(
            format!("  {}", format_days(streak.current)),
            theme::green().add_modifier(Modifier::BOLD),
        ),
    ]);

    let mut dot_spans = vec![Span::styled("  ", theme::dim())];
    for day in &weekly.days {
        let (dot, style) = match day.prayers_done {
            5 => ("●", theme::green().add_modifier(Modifier::BOLD)),
            3 | 4 => ("●", theme::amber()),
            1 | 2 => ("◑", theme::amber()),
            _ => ("○", theme::dim()),
        };
        dot_spans.push(Span::styled(dot, style));
        dot_spans.push(Span::styled(" ", theme::dim()));
    }

    let meta_line = Line::from(vec![Span::styled(
        format!(
            "  Best: {}  ·  Week: {}/7",
            streak.best,
            weekly.days_with_full_prayers()
        ),
        theme::dim(),
    )]);

    let text = vec![
        Line::from(""),
        streak_line,
        Line::from(dot_spans),
        meta_line,
    ];
    frame.render_widget(Paragraph::new(text).block(block), area);
}
