use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Row, Table};

use crate::format::truncate_unicode;
use crate::system::process::ProcessUsage;
use crate::ui::theme::Theme;

const PID_WIDTH: u16 = 8;
const PERCENT_WIDTH: u16 = 7;

/// Ranked process list starting at `scroll`.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    processes: &[ProcessUsage],
    scroll: usize,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(
            format!(" Processes ({}) ", processes.len()),
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let header = Row::new(["PID", "CPU%", "MEM%", "NAME"]).style(
        Style::default()
            .fg(theme.table_header)
            .add_modifier(Modifier::BOLD),
    );

    let name_width = area
        .width
        .saturating_sub(2 + PID_WIDTH + 2 * PERCENT_WIDTH + 3) as usize;

    let rows = processes.iter().skip(scroll).map(|p| {
        Row::new([
            Cell::from(format!("{:>7}", p.pid)),
            Cell::from(format!("{:>6.1}", p.cpu_percent))
                .style(Style::default().fg(theme.cpu_color(p.cpu_percent))),
            Cell::from(format!("{:>6.1}", p.mem_percent)),
            Cell::from(truncate_unicode(&p.name, name_width)),
        ])
        .style(Style::default().fg(theme.text_primary))
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(PID_WIDTH),
            Constraint::Length(PERCENT_WIDTH),
            Constraint::Length(PERCENT_WIDTH),
            Constraint::Min(1),
        ],
    )
    .header(header)
    .block(block);

    frame.render_widget(table, area);
}
