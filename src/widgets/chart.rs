//! Terminal chart: line (`Chart`), bar (`BarChart`) and pie (`Canvas`), with
//! the chart-type selector above it.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph,
        Widget,
    },
};

use crate::chart_data::{self, format_value, ChartKind, PieSlice};
use crate::config::Theme;
use crate::record::Record;
use crate::widgets::radio_block::RadioBlock;

const LEGEND_WIDTH: u16 = 28;
/// Bar heights are scaled into this many units; labels carry the real values.
const BAR_SCALE: f64 = 1000.0;
const PIE_RINGS: usize = 48;

/// Renders the chart-type selector and the chart for `records`.
pub fn render_chart_view(
    area: Rect,
    buf: &mut Buffer,
    records: &[Record],
    kind: ChartKind,
    selected: Option<usize>,
    theme: &Theme,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Fill(1)])
        .split(area);

    let labels: Vec<&str> = ChartKind::ALL.iter().map(|k| k.as_str()).collect();
    RadioBlock::new(" Type de graphique (1/2/3) ", &labels, kind.index())
        .colors(theme.get("modal_border"), theme.get("modal_border_active"))
        .render(layout[0], buf);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.get("modal_border")))
        .title(format!(" {} ", kind.as_str()));
    let inner = block.inner(layout[1]);
    block.render(layout[1], buf);

    if inner.width < 4 || inner.height < 2 {
        return;
    }
    if records.is_empty() {
        Paragraph::new("Aucune donnée. Ajoutez une valeur avec le formulaire.")
            .style(Style::default().fg(theme.get("text_secondary")))
            .centered()
            .render(inner, buf);
        return;
    }

    match kind {
        ChartKind::Line => render_line(inner, buf, records, selected, theme),
        ChartKind::Bar => render_bars(inner, buf, records, selected, theme),
        ChartKind::Pie => render_pie(inner, buf, records, selected, theme),
    }
}

fn render_line(
    area: Rect,
    buf: &mut Buffer,
    records: &[Record],
    selected: Option<usize>,
    theme: &Theme,
) {
    let points = chart_data::indexed_points(records);
    let (y_min, y_max) = chart_data::value_bounds(records, false);
    let last = (records.len() - 1) as f64;
    let (x_min, x_max) = if last > 0.0 {
        (0.0, last)
    } else {
        (-0.5, 0.5)
    };

    let selected_point: Vec<(f64, f64)> = selected
        .and_then(|i| points.get(i).copied())
        .into_iter()
        .collect();

    let mut datasets = vec![Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(theme.get("line_series")))
        .data(&points)];
    if !selected_point.is_empty() {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Block)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(theme.get("warning")))
                .data(&selected_point),
        );
    }

    let label_style = Style::default().fg(theme.get("text_primary"));
    let x_labels = x_axis_labels(records)
        .into_iter()
        .map(|s| Span::styled(s, label_style))
        .collect::<Vec<_>>();
    let y_labels = vec![
        Span::styled(format_value(y_min), label_style),
        Span::styled(format_value((y_min + y_max) / 2.0), label_style),
        Span::styled(format_value(y_max), label_style),
    ];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .bounds([x_min, x_max])
                .style(Style::default().fg(theme.get("axis")))
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .bounds([y_min, y_max])
                .style(Style::default().fg(theme.get("axis")))
                .labels(y_labels),
        )
        .legend_position(None)
        .render(area, buf);
}

/// First, middle and last record names (fewer when the list is short).
fn x_axis_labels(records: &[Record]) -> Vec<String> {
    match records.len() {
        0 => Vec::new(),
        1 => vec![records[0].name.clone()],
        2 => vec![records[0].name.clone(), records[1].name.clone()],
        n => vec![
            records[0].name.clone(),
            records[n / 2].name.clone(),
            records[n - 1].name.clone(),
        ],
    }
}

fn render_bars(
    area: Rect,
    buf: &mut Buffer,
    records: &[Record],
    selected: Option<usize>,
    theme: &Theme,
) {
    let (_, max) = chart_data::value_bounds(records, true);
    let bar_color = theme.get("bar_series");
    let selected_color = theme.get("warning");
    let n = records.len() as u16;
    let gap = 1;
    let bar_width = (area.width.saturating_sub(n.saturating_sub(1) * gap) / n.max(1)).clamp(1, 12);

    let bars: Vec<Bar> = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let height = (r.value.max(0.0) / max * BAR_SCALE).round() as u64;
            let color = if selected == Some(i) {
                selected_color
            } else {
                bar_color
            };
            Bar::default()
                .value(height)
                .text_value(format_value(r.value))
                .label(Line::from(r.name.as_str()))
                .style(Style::default().fg(color))
                .value_style(
                    Style::default()
                        .fg(theme.get("text_inverse"))
                        .bg(color)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(gap)
        .max(BAR_SCALE as u64)
        .label_style(Style::default().fg(theme.get("text_primary")))
        .render(area, buf);
}

fn render_pie(
    area: Rect,
    buf: &mut Buffer,
    records: &[Record],
    selected: Option<usize>,
    theme: &Theme,
) {
    let slices = chart_data::pie_slices(records);
    if slices.is_empty() {
        Paragraph::new("Pas de valeur positive à représenter.")
            .style(Style::default().fg(theme.get("text_secondary")))
            .centered()
            .render(area, buf);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Fill(1), Constraint::Length(LEGEND_WIDTH)])
        .split(area);
    let pie_area = layout[0];

    // Terminal cells are about twice as tall as wide.
    let aspect = if pie_area.height > 0 {
        (pie_area.width as f64 / (pie_area.height as f64 * 2.0)).max(1.0)
    } else {
        1.0
    };
    let slice_points: Vec<(usize, Vec<(f64, f64)>)> = slices
        .iter()
        .map(|s| (s.index, slice_points(s, selected == Some(s.index))))
        .collect();

    Canvas::default()
        .marker(symbols::Marker::Braille)
        .x_bounds([-1.1 * aspect, 1.1 * aspect])
        .y_bounds([-1.1, 1.1])
        .paint(|ctx| {
            for (index, coords) in &slice_points {
                ctx.draw(&Points {
                    coords,
                    color: theme.slice_color(*index),
                });
            }
        })
        .render(pie_area, buf);

    render_pie_legend(layout[1], buf, &slices, selected, theme);
}

/// Sample points filling a slice. The selected slice is pushed out slightly.
fn slice_points(slice: &PieSlice, offset: bool) -> Vec<(f64, f64)> {
    let (dx, dy) = if offset {
        let mid = slice.mid_angle();
        (0.08 * mid.cos(), 0.08 * mid.sin())
    } else {
        (0.0, 0.0)
    };
    let mut coords = Vec::new();
    for ring in 1..=PIE_RINGS {
        let r = ring as f64 / PIE_RINGS as f64;
        // Roughly constant spacing along each ring.
        let steps = ((slice.sweep * r * PIE_RINGS as f64 * 2.0).ceil() as usize).max(1);
        for step in 0..=steps {
            let angle = slice.start_angle + slice.sweep * step as f64 / steps as f64;
            coords.push((dx + r * angle.cos(), dy + r * angle.sin()));
        }
    }
    coords
}

fn render_pie_legend(
    area: Rect,
    buf: &mut Buffer,
    slices: &[PieSlice],
    selected: Option<usize>,
    theme: &Theme,
) {
    let lines: Vec<Line> = slices
        .iter()
        .map(|s| {
            let name_style = if selected == Some(s.index) {
                Style::default()
                    .fg(theme.get("warning"))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.get("text_primary"))
            };
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(theme.slice_color(s.index))),
                Span::styled(s.name.clone(), name_style),
                Span::styled(
                    format!(" {:.0}%", s.fraction * 100.0),
                    Style::default().fg(theme.get("text_secondary")),
                ),
            ])
        })
        .collect();
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::LEFT)
                .border_style(Style::default().fg(theme.get("modal_border"))),
        )
        .render(area, buf);
}
