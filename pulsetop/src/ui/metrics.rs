//! Scalar readouts: CPU, memory and disk gauges plus network totals.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::dashboard::Scalars;
use crate::ui::theme::load_color;
use crate::ui::util::{human, pct};

fn gauge<'a>(title: &'a str, v: f64) -> Gauge<'a> {
    Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .gauge_style(Style::default().fg(load_color(v)))
        .ratio(if v.is_finite() { (v / 100.0).clamp(0.0, 1.0) } else { 0.0 })
        .label(pct(v))
}

pub fn draw_metrics(f: &mut ratatui::Frame<'_>, area: Rect, s: Option<&Scalars>) {
    if area.height < 3 {
        return;
    }
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(40),
        ])
        .split(area);

    let (cpu, mem, disk) = s
        .map(|s| (s.cpu, s.memory, s.disk_percent))
        .unwrap_or((0.0, 0.0, 0.0));
    f.render_widget(gauge("CPU", cpu), cols[0]);
    f.render_widget(gauge("Memory", mem), cols[1]);
    f.render_widget(gauge("Disk", disk), cols[2]);

    let net = match s {
        Some(s) => format!("{} sent / {} recv", human(s.net_sent), human(s.net_recv)),
        None => "--".into(),
    };
    f.render_widget(
        Paragraph::new(net).block(Block::default().borders(Borders::ALL).title("Network")),
        cols[3],
    );
}
