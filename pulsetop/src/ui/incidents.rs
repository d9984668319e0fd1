//! Incident list, newest first.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::incidents::{marker, FeedView, IncidentFeed};
use crate::ui::theme::MUTED;

pub fn draw_incidents(f: &mut ratatui::Frame<'_>, area: Rect, feed: &IncidentFeed) {
    if area.height < 3 {
        return;
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Incidents ({})", feed.len()));

    let lines: Vec<Line> = match feed.view() {
        FeedView::Placeholder(text) => {
            vec![Line::from(Span::styled(text, Style::default().fg(MUTED)))]
        }
        FeedView::Items(items) => items
            .into_iter()
            .flat_map(|inc| {
                let m = marker(inc.level);
                [
                    Line::from(vec![
                        Span::styled(format!("{} ", m.glyph), Style::default().fg(m.color)),
                        Span::styled(
                            inc.level.as_str(),
                            Style::default().fg(m.color).add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!("  {}", inc.timestamp.label()),
                            Style::default().fg(MUTED),
                        ),
                    ]),
                    Line::from(format!("  {}", inc.message)),
                ]
            })
            .collect(),
    };
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
