use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph};

use crate::format::{format_memory, format_percent, format_uptime};
use crate::system::sampler::TickReport;
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    cpu_model: &str,
    report: Option<&TickReport>,
    theme: &Theme,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_overview(frame, chunks[0], cpu_model, report, theme);
    render_memory_gauge(frame, chunks[1], report, theme);
}

fn render_overview(
    frame: &mut Frame,
    area: Rect,
    cpu_model: &str,
    report: Option<&TickReport>,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut spans = vec![Span::styled(
        " ticktop ",
        Style::default()
            .fg(theme.header_accent_fg)
            .bg(theme.header_accent_bg)
            .add_modifier(Modifier::BOLD),
    )];

    let cpu_percent = report.and_then(|r| r.cpu_usage_percent);
    let cpu_style = match cpu_percent {
        Some(pct) => Style::default()
            .fg(theme.cpu_color(pct))
            .add_modifier(Modifier::BOLD),
        None => Style::default().fg(theme.text_secondary),
    };
    spans.extend([
        Span::raw(" "),
        Span::styled(cpu_model.to_string(), Style::default().fg(theme.text_primary)),
        Span::raw("  "),
        Span::styled(format!("CPU {}", format_percent(cpu_percent)), cpu_style),
    ]);

    if let Some(uptime) = report.and_then(|r| r.uptime) {
        spans.extend([
            Span::raw("  "),
            Span::styled(
                format!("up {}", format_uptime(uptime.whole_secs())),
                Style::default().fg(theme.text_secondary),
            ),
        ]);
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn render_memory_gauge(frame: &mut Frame, area: Rect, report: Option<&TickReport>, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(
            " MEM ",
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let (ratio, label) = match report.and_then(|r| r.memory) {
        Some(usage) => (
            usage.ratio().clamp(0.0, 1.0),
            format_memory(usage.used_kb, usage.total_kb),
        ),
        None => (0.0, "n/a".to_string()),
    };

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(
            Style::default()
                .fg(theme.gauge_filled)
                .bg(theme.gauge_unfilled),
        )
        .ratio(ratio)
        .label(label);

    frame.render_widget(gauge, area);
}
