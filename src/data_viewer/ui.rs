//! Grid viewer overlay - pure rendering layer.

use super::GridViewerState;
use crate::data::Dataset;
use crate::grid::UNSUPPORTED_MARKER;
use crate::ui::ThemeColors;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Clear, Paragraph, Row, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Table, Wrap,
    },
    Frame,
};

const COL_WIDTH: usize = 12;
const ROW_HEADER_WIDTH: usize = 8;

/// Draw the grid overlay.
pub fn draw_grid_viewer(
    f: &mut Frame<'_>,
    state: &mut GridViewerState,
    dataset: Option<&Dataset>,
    colors: &ThemeColors,
) {
    if !state.visible {
        return;
    }

    let area = centered_rect(90, 90, f.area());

    // Clear the background
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" Grid - {} ", state.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.border))
        .style(Style::default().bg(colors.bg));

    let inner = block.inner(area);
    f.render_widget(block, area);

    if let Some(error) = state.error.clone() {
        draw_error(f, inner, &error, colors);
        return;
    }
    let Some(dataset) = dataset else {
        draw_error(f, inner, "The dataset is no longer available", colors);
        return;
    };

    let has_layers = state.active_layer.is_some();
    let mut constraints = vec![Constraint::Min(3)];
    if has_layers {
        constraints.push(Constraint::Length(2));
    }
    constraints.push(Constraint::Length(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    draw_table(f, chunks[0], state, dataset, colors);
    if has_layers {
        draw_layer_selectors(f, chunks[1], state, colors);
    }
    draw_footer(f, chunks[chunks.len() - 1], colors);
}

fn draw_table(
    f: &mut Frame<'_>,
    area: Rect,
    state: &mut GridViewerState,
    dataset: &Dataset,
    colors: &ThemeColors,
) {
    let Some((total_rows, total_cols)) = state.view.as_ref().map(|v| v.shape()) else {
        return;
    };

    // Account for border and header
    let visible_rows = (area.height as usize).saturating_sub(3);
    let visible_cols =
        ((area.width as usize).saturating_sub(ROW_HEADER_WIDTH + 2) / COL_WIDTH).clamp(1, 20);

    let start_row = state.scroll.row;
    let start_col = state.scroll.col;
    let numeric = dataset.is_numeric();
    let cells = state.window(dataset, visible_rows, visible_cols);

    let rows: Vec<Row<'_>> = cells
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut line = vec![Cell::from(format!("{:>7}", start_row + i))
                .style(Style::default().fg(colors.label))];
            line.extend(row.iter().map(|text| {
                let color = if !numeric && text.as_str() == UNSUPPORTED_MARKER {
                    colors.muted
                } else {
                    colors.value
                };
                Cell::from(format!("{:>11}", text)).style(Style::default().fg(color))
            }));
            Row::new(line)
        })
        .collect();

    let end_col = (start_col + visible_cols).min(total_cols);
    let mut header_cells = vec![Cell::from("")];
    header_cells.extend((start_col..end_col).map(|c| {
        Cell::from(format!("{:>11}", c)).style(
            Style::default()
                .fg(colors.label)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let mut widths = vec![Constraint::Length(ROW_HEADER_WIDTH as u16)];
    widths.extend((0..visible_cols).map(|_| Constraint::Length(COL_WIDTH as u16)));

    let title = format!(
        " {} | {} x {} | {} ",
        dataset.summary(),
        total_rows,
        total_cols,
        if dataset.is_loaded() { "loaded" } else { "not loaded" }
    );

    let table = Table::new(rows, widths)
        .header(Row::new(header_cells))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.border))
                .title(title)
                .title_style(Style::default().fg(colors.heading)),
        )
        .style(Style::default().fg(colors.text));

    f.render_widget(table, area);

    if total_rows > visible_rows {
        let mut scrollbar_state =
            ScrollbarState::new(total_rows.saturating_sub(visible_rows)).position(start_row);
        f.render_stateful_widget(
            Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("^"))
                .end_symbol(Some("v")),
            area,
            &mut scrollbar_state,
        );
    }
}

fn draw_layer_selectors(f: &mut Frame<'_>, area: Rect, state: &GridViewerState, colors: &ThemeColors) {
    let Some(view) = state.view.as_ref() else {
        return;
    };

    let mut spans = vec![Span::styled("Layers: ", Style::default().fg(colors.label))];
    for dim in 0..view.layer_count() {
        let index = view.layer(dim).unwrap_or(0);
        let extent = view.layer_extent(dim).unwrap_or(0);
        let style = if state.active_layer == Some(dim) {
            Style::default()
                .fg(colors.cursor_fg)
                .bg(colors.cursor_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.text)
        };
        spans.push(Span::styled(
            format!(" d{}={}/{} ", dim, index + 1, extent),
            style,
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(colors.border)),
        );

    f.render_widget(paragraph, area);
}

fn draw_footer(f: &mut Frame<'_>, area: Rect, colors: &ThemeColors) {
    let help = "Arrows/hjkl: Pan | ]/[: Layer | s: Layer dim | g/G: First/Last | q/Esc: Close";
    let paragraph = Paragraph::new(help)
        .style(Style::default().fg(colors.label))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn draw_error(f: &mut Frame<'_>, area: Rect, error: &str, colors: &ThemeColors) {
    let lines = vec![
        Line::from(Span::styled(
            "Cannot show grid",
            Style::default()
                .fg(colors.error)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(error.to_string(), Style::default().fg(colors.text))),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter on the node again to retry, Esc to close",
            Style::default().fg(colors.muted),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
