//! Centered popups: terminate confirmation and one-shot notices.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::dashboard::Notice;
use crate::ui::theme::MUTED;

pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

fn popup(f: &mut ratatui::Frame<'_>, title: &str, color: Color, lines: Vec<Line<'_>>) {
    let area = centered(f.area(), 50, 6);
    if area.height < 3 {
        return;
    }
    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            title.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

pub fn draw_confirm(f: &mut ratatui::Frame<'_>, pid: u32) {
    popup(
        f,
        "Confirm",
        Color::Yellow,
        vec![
            Line::from(format!("Terminate process {pid}?")),
            Line::from(""),
            Line::from(Span::styled("[y] yes   [n/Esc] no", Style::default().fg(MUTED))),
        ],
    );
}

pub fn draw_sending(f: &mut ratatui::Frame<'_>, pid: u32) {
    popup(
        f,
        "Terminate",
        Color::Yellow,
        vec![Line::from(format!("Terminating process {pid}..."))],
    );
}

pub fn draw_notice(f: &mut ratatui::Frame<'_>, notice: &Notice) {
    let (title, color) = match notice {
        Notice::Info(_) => ("Notice", Color::Cyan),
        Notice::Error(_) => ("Error", Color::Red),
    };
    popup(
        f,
        title,
        color,
        vec![
            Line::from(notice.text().to_string()),
            Line::from(""),
            Line::from(Span::styled("press any key", Style::default().fg(MUTED))),
        ],
    );
}
