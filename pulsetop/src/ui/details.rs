//! System details view (static host facts).

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::types::SystemInfo;
use crate::ui::theme::MUTED;
use crate::ui::util::human;

fn row(label: &str, value: Option<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<14}"), Style::default().fg(MUTED)),
        Span::raw(value.unwrap_or_else(|| "--".into())),
    ])
}

pub fn draw_details(f: &mut ratatui::Frame<'_>, area: Rect, sys: Option<&SystemInfo>) {
    let block = Block::default().borders(Borders::ALL).title("System details");
    let Some(s) = sys else {
        f.render_widget(
            Paragraph::new(Span::styled(
                "Waiting for system info...",
                Style::default().fg(MUTED),
            ))
            .block(block),
            area,
        );
        return;
    };
    let lines = vec![
        row("CPU cores", s.cpu_count.map(|c| c.to_string())),
        row(
            "CPU frequency",
            s.cpu_freq.map(|mhz| format!("{:.2} GHz", mhz / 1000.0)),
        ),
        row("Memory total", s.mem_total.map(human)),
        row("Disk total", s.disk_total.map(human)),
        row("Disk free", s.disk_free.map(human)),
        row("Boot time", s.boot_time.clone()),
        row("OS", s.os_name.clone()),
    ];
    f.render_widget(Paragraph::new(lines).block(block), area);
}
