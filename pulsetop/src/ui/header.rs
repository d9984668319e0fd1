//! Top header with connection status and last update times.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::dashboard::{Dashboard, View};
use crate::ui::theme::{MUTED, STATUS_DOWN, STATUS_LIVE, STATUS_WAIT};
use crate::ws::ConnState;

pub fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, d: &Dashboard) {
    let state = d.conn_state().unwrap_or(ConnState::Connecting);
    let color = match state {
        ConnState::Open => STATUS_LIVE,
        ConnState::Closed => STATUS_DOWN,
        ConnState::Connecting => STATUS_WAIT,
    };
    let status = format!("● {}", state.label());
    let mut spans = vec![
        Span::styled("pulsetop ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(status, Style::default().fg(color)),
    ];
    if let Some(s) = d.scalars() {
        let telemetry = s
            .updated_at
            .as_ref()
            .map(|t| t.label())
            .unwrap_or_else(|| "n/a".into());
        spans.push(Span::styled(
            format!("  | updated {} (server {telemetry})", s.received_at),
            Style::default().fg(MUTED),
        ));
    }
    let view = match d.view() {
        View::Overview => "overview",
        View::Details => "details",
    };
    spans.push(Span::styled(
        format!("  [{view}]  (press 'q' to quit)"),
        Style::default().fg(MUTED),
    ));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
