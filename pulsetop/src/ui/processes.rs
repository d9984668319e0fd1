//! Process table with search line, per-cell coloring, row cursor, and a scrollbar.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::style::Modifier;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::table::{ProcessTable, TableView};
use crate::ui::theme::{load_color, MUTED, SB_ARROW, SB_THUMB, SB_TRACK};
use crate::ui::util::truncate_middle;

// Keep the header widths here so drawing and paging match.
const COLS: [Constraint; 4] = [
    Constraint::Length(8),      // PID
    Constraint::Percentage(50), // Name
    Constraint::Length(8),      // CPU %
    Constraint::Length(8),      // Mem %
];

/// Rows visible in the table body for a panel of this size.
pub fn page_rows(area: Rect) -> usize {
    // borders (2) + search line (1) + header (1)
    area.height.saturating_sub(4).max(1) as usize
}

pub fn draw_processes(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    table: &ProcessTable,
    searching: bool,
) {
    let shown = table.filtered().len();
    let total = table.rows().len();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Processes ({shown}/{total})  [/] search  [k] terminate"));
    f.render_widget(block, area);

    let inner = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };
    if inner.height < 2 || inner.width < 3 {
        return;
    }

    // Search line
    let cursor = if searching { "█" } else { "" };
    let search_style = if searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(MUTED)
    };
    let search = Line::from(vec![
        Span::styled("Search: ", search_style),
        Span::raw(table.query().to_string()),
        Span::styled(cursor, search_style),
    ]);
    f.render_widget(
        Paragraph::new(search),
        Rect {
            height: 1,
            ..inner
        },
    );

    let content = Rect {
        x: inner.x,
        y: inner.y + 1,
        width: inner.width.saturating_sub(2),
        height: inner.height - 1,
    };

    let rows = match table.view() {
        TableView::Rows(rows) => rows,
        other => {
            if let Some(text) = other.placeholder() {
                f.render_widget(
                    Paragraph::new(Span::styled(text, Style::default().fg(MUTED))),
                    content,
                );
            }
            return;
        }
    };

    // Scrolling follows the cursor kept by the table
    let total_rows = rows.len();
    let viewport_rows = content.height.saturating_sub(1) as usize;
    let max_off = total_rows.saturating_sub(viewport_rows);
    let offset = table.scroll_offset().min(max_off);
    let selected = table.selected();
    let name_width = (content.width as usize / 2).max(4);

    let body = rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(viewport_rows)
        .map(|(ix, p)| {
            let row_style = if ix == selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(p.pid.to_string()).style(Style::default().fg(Color::DarkGray)),
                Cell::from(truncate_middle(&p.name, name_width)),
                Cell::from(format!("{:>5.1}%", p.cpu_percent))
                    .style(Style::default().fg(load_color(p.cpu_percent))),
                Cell::from(format!("{:>5.1}%", p.memory_percent))
                    .style(Style::default().fg(mem_color(p.memory_percent))),
            ])
            .style(row_style)
        });

    let header = Row::new(vec!["PID", "Name", "CPU %", "Mem %"]).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let t = Table::new(body, COLS.to_vec())
        .header(header)
        .column_spacing(1);
    f.render_widget(t, content);

    draw_scrollbar(
        f,
        Rect {
            x: inner.x + inner.width.saturating_sub(1),
            y: content.y,
            width: 1,
            height: content.height,
        },
        total_rows,
        viewport_rows,
        offset,
    );
}

fn mem_color(v: f64) -> Color {
    match v {
        x if x < 5.0 => Color::Blue,
        x if x < 20.0 => Color::Magenta,
        _ => Color::Red,
    }
}

fn draw_scrollbar(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    total_rows: usize,
    viewport_rows: usize,
    offset: usize,
) {
    if area.height < 3 {
        return;
    }
    let track = (area.height - 2) as usize;
    let total = total_rows.max(1);
    let view = viewport_rows.clamp(1, total);
    let max_off = total.saturating_sub(view);

    let thumb_len = (track * view).div_ceil(total).max(1).min(track);
    let thumb_top = if max_off == 0 {
        0
    } else {
        ((track - thumb_len) * offset + max_off / 2) / max_off
    };

    // Build lines: top arrow, track (with thumb), bottom arrow
    let mut lines: Vec<Line> = Vec::with_capacity(area.height as usize);
    lines.push(Line::from(Span::styled("▲", Style::default().fg(SB_ARROW))));
    for i in 0..track {
        if i >= thumb_top && i < thumb_top + thumb_len {
            lines.push(Line::from(Span::styled("█", Style::default().fg(SB_THUMB))));
        } else {
            lines.push(Line::from(Span::styled("│", Style::default().fg(SB_TRACK))));
        }
    }
    lines.push(Line::from(Span::styled("▼", Style::default().fg(SB_ARROW))));
    f.render_widget(Paragraph::new(lines), area);
}

/// Handle cursor keys (Up/Down/PageUp/PageDown/Home/End). Returns true if consumed.
pub fn processes_handle_key(table: &mut ProcessTable, key: KeyEvent, page_size: usize) -> bool {
    let page = page_size.max(1);
    match key.code {
        KeyCode::Up => table.move_selection(-1, page),
        KeyCode::Down => table.move_selection(1, page),
        KeyCode::PageUp => table.move_selection(-(page as isize), page),
        KeyCode::PageDown => table.move_selection(page as isize, page),
        KeyCode::Home => table.select_first(page),
        KeyCode::End => table.select_last(page),
        _ => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProcessEntry;
    use crossterm::event::KeyModifiers;

    #[test]
    fn keys_move_cursor() {
        let mut t = ProcessTable::new();
        t.replace(
            (1..=20)
                .map(|pid| ProcessEntry {
                    pid,
                    name: format!("p{pid}"),
                    cpu_percent: 0.0,
                    memory_percent: 0.0,
                })
                .collect(),
        );
        let key = |c| KeyEvent::new(c, KeyModifiers::NONE);
        assert!(processes_handle_key(&mut t, key(KeyCode::PageDown), 5));
        assert_eq!(t.selected(), 5);
        assert!(processes_handle_key(&mut t, key(KeyCode::End), 5));
        assert_eq!(t.selected_pid(), Some(20));
        assert!(processes_handle_key(&mut t, key(KeyCode::Up), 5));
        assert_eq!(t.selected(), 18);
        assert!(!processes_handle_key(&mut t, key(KeyCode::Char('x')), 5));
    }

    #[test]
    fn page_rows_accounts_for_chrome() {
        assert_eq!(page_rows(Rect::new(0, 0, 40, 14)), 10);
        assert_eq!(page_rows(Rect::new(0, 0, 40, 2)), 1);
    }
}
