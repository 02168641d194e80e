pub mod cores;
pub mod header;
pub mod help;
pub mod process_table;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::App;

/// Leading help entries repeated in the status bar.
const STATUSBAR_KEYS: usize = 5;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let width = frame.area().width;
    let core_rows = app
        .report
        .as_ref()
        .map_or(0, |r| cores::panel_height(r.cpu_per_core.len(), width));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(core_rows),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    header::render(
        frame,
        chunks[0],
        &app.cpu_model,
        app.report.as_ref(),
        &app.theme,
    );

    if let Some(report) = &app.report {
        cores::render(frame, chunks[1], &report.cpu_per_core, &app.theme);
    }

    // Borders and the column header take three rows.
    app.table_rows = chunks[2].height.saturating_sub(3);
    let processes = app.report.as_ref().map_or(&[][..], |r| &r.processes[..]);
    process_table::render(frame, chunks[2], processes, app.scroll, &app.theme);

    let keys = app.help_entries();
    statusbar::render(
        frame,
        chunks[3],
        app.report.is_some(),
        &keys[..keys.len().min(STATUSBAR_KEYS)],
        app.status_message.as_ref(),
        &app.theme,
    );

    // Help overlay, rendered last to appear on top
    if app.show_help() {
        help::render(frame, frame.area(), &keys, &app.theme);
    }
}
