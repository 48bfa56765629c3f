use ratatui::{
    layout::Rect,
    style::Style,
    text::Span,
    widgets::{Block, BorderType, Borders, Gauge},
    Frame,
};

use prayer_ledger::utils::format::format_percent;

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, ratio: f64) {
    let block = Block::default()
        .title(Span::styled(" Last 7 Days ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(
            Style::default()
                .fg(theme::completion_color(ratio))
                .bg(theme::EMPTY),
        )
        .ratio(ratio.clamp(0.0, 1.0))
        .label(Span::styled(format_percent(ratio), theme::bold()));

    frame.render_widget(gauge, area);
}
