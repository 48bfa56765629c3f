use chrono::FixedOffset;
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use prayer_ledger::utils::format::format_completed_at;
use prayer_ledger::{DayLog, PrayerName};

use crate::tui::theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    log: &DayLog,
    focused_idx: usize,
    offset: FixedOffset,
) {
    let title = format!(" Prayers {}/{} ", log.completed_count(), PrayerName::COUNT);
    let block = Block::default()
        .title(Span::styled(title, theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold())
        .style(theme::surface());

    let items: Vec<ListItem> = PrayerName::all()
        .enumerate()
        .map(|(i, prayer)| {
            let completed_at = log.completed_at(prayer);

            let (icon, icon_style, time_str) = match completed_at {
                Some(at) => ("●", theme::green(), format_completed_at(at, offset)),
                None => ("○", theme::dim(), "--:--".to_string()),
            };

            let name_style = if i == focused_idx {
                theme::gold().add_modifier(Modifier::BOLD)
            } else {
                theme::bold()
            };
            let cursor = if i == focused_idx { "›" } else { " " };

            let line = Line::from(vec![
                Span::styled(format!(" {} ", cursor), theme::gold()),
                Span::styled(format!("{:<9}", prayer.display_name()), name_style),
                Span::styled(icon, icon_style),
                Span::styled(format!("  {}", time_str), theme::dim()),
            ]);

            ListItem::new(line)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
