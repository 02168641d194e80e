//! Per-core utilization, laid out column by column.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::format::format_percent;
use crate::ui::theme::Theme;

/// Rows a grid of full-width cells may use before switching to compact cells.
const MAX_ROWS: usize = 8;
const BAR_WIDTH: usize = 10;
const FULL_CELL_WIDTH: u16 = 25;
const COMPACT_CELL_WIDTH: u16 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Grid {
    columns: usize,
    rows: usize,
    compact: bool,
}

/// Cell arrangement that shows every core within `width` columns.
fn grid(cores: usize, width: u16) -> Grid {
    let inner = width.saturating_sub(2);
    let fit = |cell: u16| usize::from((inner / cell).max(1));

    let columns = fit(FULL_CELL_WIDTH);
    let rows = cores.div_ceil(columns);
    if rows <= MAX_ROWS {
        return Grid {
            columns,
            rows,
            compact: false,
        };
    }

    let columns = fit(COMPACT_CELL_WIDTH);
    Grid {
        columns,
        rows: cores.div_ceil(columns),
        compact: true,
    }
}

/// Rows the panel needs for `cores` entries at `width`, borders included. Zero hides the panel.
pub fn panel_height(cores: usize, width: u16) -> u16 {
    if cores == 0 {
        return 0;
    }
    u16::try_from(grid(cores, width).rows + 2).unwrap_or(u16::MAX)
}

pub fn render(frame: &mut Frame, area: Rect, per_core: &[Option<f64>], theme: &Theme) {
    if per_core.is_empty() || area.height == 0 {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(" Cores ", Style::default().fg(theme.text_secondary)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let grid = grid(per_core.len(), area.width);
    let constraints = vec![Constraint::Ratio(1, grid.columns as u32); grid.columns];
    let columns = Layout::horizontal(constraints).split(inner);

    for (col, column_area) in columns.iter().enumerate() {
        let lines: Vec<Line> = per_core
            .iter()
            .enumerate()
            .skip(col * grid.rows)
            .take(grid.rows)
            .map(|(idx, usage)| core_line(idx, *usage, grid.compact, theme))
            .collect();
        frame.render_widget(Paragraph::new(lines), *column_area);
    }
}

fn core_line(idx: usize, usage: Option<f64>, compact: bool, theme: &Theme) -> Line<'static> {
    let pct = usage.unwrap_or(0.0);
    let mut spans = vec![Span::styled(
        format!(" CPU{idx:<3}"),
        Style::default().fg(theme.text_secondary),
    )];

    if !compact {
        let filled = (((pct / 100.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
        spans.push(Span::styled(
            "\u{2588}".repeat(filled),
            Style::default().fg(theme.cpu_color(pct)),
        ));
        spans.push(Span::styled(
            "\u{2591}".repeat(BAR_WIDTH - filled),
            Style::default().fg(theme.gauge_unfilled),
        ));
    }

    spans.push(Span::styled(
        format!(" {:>6}", format_percent(usage)),
        Style::default().fg(if compact {
            theme.cpu_color(pct)
        } else {
            theme.text_primary
        }),
    ));
    Line::from(spans)
}
