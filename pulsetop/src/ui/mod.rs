//! UI module root: lays out the panels and draws the dashboard.

pub mod charts;
pub mod details;
pub mod dialog;
pub mod header;
pub mod incidents;
pub mod metrics;
pub mod processes;
pub mod theme;
pub mod util;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::dashboard::{Dashboard, View};
use crate::kill::KillPhase;
use theme::{CPU_LINE, MEM_LINE, MUTED};

/// Draw one frame. Returns the process panel area for input handling.
pub fn draw(f: &mut ratatui::Frame<'_>, d: &Dashboard, searching: bool) -> Option<Rect> {
    let area = f.area();

    // Root rows: header, body, footer
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    header::draw_header(f, rows[0], d);

    let procs_area = match d.view() {
        View::Overview => Some(draw_overview(f, rows[1], d, searching)),
        View::Details => {
            details::draw_details(f, rows[1], d.system());
            None
        }
    };

    let keys = if searching {
        "type to filter  [Enter/Esc] done  [Backspace] delete"
    } else {
        "[q] quit  [Tab] view  [/] search  [↑↓] select  [k] terminate"
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(keys, Style::default().fg(MUTED)))),
        rows[2],
    );

    match d.kill_phase() {
        KillPhase::Confirming(pid) => dialog::draw_confirm(f, pid),
        KillPhase::InFlight(pid) => dialog::draw_sending(f, pid),
        KillPhase::Idle => {}
    }
    if let Some(n) = d.notice() {
        dialog::draw_notice(f, n);
    }
    procs_area
}

fn draw_overview(f: &mut ratatui::Frame<'_>, area: Rect, d: &Dashboard, searching: bool) -> Rect {
    // charts, metrics, bottom (processes + incidents)
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Length(3),
            Constraint::Min(6),
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    charts::draw_series(f, top[0], "CPU", d.cpu_window(), CPU_LINE);
    charts::draw_series(f, top[1], "Memory", d.mem_window(), MEM_LINE);

    metrics::draw_metrics(f, rows[1], d.scalars());

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(rows[2]);
    processes::draw_processes(f, bottom[0], d.table(), searching);
    incidents::draw_incidents(f, bottom[1], d.incidents());
    bottom[0]
}
