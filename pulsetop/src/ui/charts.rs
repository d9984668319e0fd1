//! CPU and memory line charts over the sliding windows.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};

use crate::history::TimeSeriesWindow;
use crate::ui::theme::MUTED;

pub fn draw_series(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    window: &TimeSeriesWindow,
    color: Color,
) {
    let title = match window.latest() {
        Some(p) => format!("{title} (now: {:>5.1}%)", p.value),
        None => title.to_string(),
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    if area.height < 3 || area.width < 10 {
        return;
    }
    if window.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("waiting for data...", Style::default().fg(MUTED)))
                .block(block),
            area,
        );
        return;
    }

    let points: Vec<(f64, f64)> = window
        .snapshot()
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.value.clamp(0.0, 100.0)))
        .collect();
    let snap = window.snapshot();
    let first = snap.front().map(|p| p.label.clone()).unwrap_or_default();
    let last = snap.back().map(|p| p.label.clone()).unwrap_or_default();
    let x_max = (window.capacity().saturating_sub(1)).max(1) as f64;

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points);
    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(MUTED))
                .bounds([0.0, x_max])
                .labels(vec![Span::raw(first), Span::raw(last)]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(MUTED))
                .bounds([0.0, 100.0])
                .labels(vec![Span::raw("0"), Span::raw("50"), Span::raw("100")]),
        );
    f.render_widget(chart, area);
}
