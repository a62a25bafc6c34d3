//! Browser UI rendering.

use super::ThemeColors;
use crate::app::App;
use crate::data::Node;
use crate::data_viewer::ui::draw_grid_viewer;
use crate::explorer::tree::draw_tree;
use crate::store::ContainerStore;
use crate::util::format_node_info;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Draw the browser UI.
pub(super) fn draw_browser<S: ContainerStore>(f: &mut Frame<'_>, app: &mut App<S>) {
    let colors = ThemeColors::from_theme(&app.theme);

    // Main layout with status bar and key map bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1), Constraint::Length(1)])
        .split(f.area());

    // Content area
    if app.explorer.show_preview {
        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[0]);

        draw_tree(f, &mut app.explorer, content[0], &colors);
        draw_details(f, app, content[1], &colors);
    } else {
        draw_tree(f, &mut app.explorer, chunks[0], &colors);
    }

    // Status bar
    draw_status(f, app, chunks[1], &colors);

    // Key map bar
    draw_keymap(f, app, chunks[2], &colors);

    // Grid overlay
    let App {
        viewer, containers, ..
    } = app;
    let dataset = viewer
        .location
        .as_ref()
        .and_then(|location| location.resolve(containers.as_slice()))
        .and_then(|node| node.dataset.as_ref());
    draw_grid_viewer(f, viewer, dataset, &colors);
}

fn draw_details<S: ContainerStore>(f: &mut Frame<'_>, app: &App<S>, area: Rect, colors: &ThemeColors) {
    let lines = if let Some(node) = app.current_node() {
        format_node_details(node, colors)
    } else {
        vec![Line::from(Span::styled(
            "Select a node to view details",
            Style::default().fg(colors.text),
        ))]
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Details ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.border))
                .style(Style::default().bg(colors.bg)),
        )
        .style(Style::default().fg(colors.text))
        .wrap(Wrap { trim: true })
        .scroll((app.explorer.preview_scroll, 0));

    f.render_widget(paragraph, area);
}

fn draw_status<S: ContainerStore>(f: &mut Frame<'_>, app: &App<S>, area: Rect, colors: &ThemeColors) {
    let (text, fg) = match &app.error_message {
        Some(error) => (error.clone(), colors.error),
        None => (app.status.clone(), colors.status_fg),
    };

    let paragraph = Paragraph::new(text).style(Style::default().fg(fg).bg(colors.status_bg));

    f.render_widget(paragraph, area);
}

fn draw_keymap<S: ContainerStore>(f: &mut Frame<'_>, app: &App<S>, area: Rect, colors: &ThemeColors) {
    let keymap_text = if app.viewer.visible {
        "hjkl:pan | ]/[:layer | s:layer dim | g/G:first/last | NG:layer N | q/Esc:close"
    } else {
        "q:quit | hjkl:nav | Enter:grid | o:open recent | t:details | J/K:scroll details | T:theme"
    };

    let paragraph =
        Paragraph::new(keymap_text).style(Style::default().fg(colors.text).bg(colors.bg));

    f.render_widget(paragraph, area);
}

fn format_node_details(node: &Node, colors: &ThemeColors) -> Vec<Line<'static>> {
    let mut lines = vec![];

    // Header
    lines.push(Line::from(Span::styled(
        node.display_name(),
        Style::default()
            .fg(colors.heading)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    for (label, value) in format_node_info(node) {
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", label), Style::default().fg(colors.label)),
            Span::styled(value, Style::default().fg(colors.value)),
        ]));
    }

    let attributes: Vec<&Node> = node.children.iter().filter(|c| c.is_attribute()).collect();
    if !attributes.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Attributes:",
            Style::default()
                .fg(colors.heading)
                .add_modifier(Modifier::BOLD),
        )));

        for attribute in attributes {
            let summary = attribute
                .dataset
                .as_ref()
                .map(|d| d.summary())
                .unwrap_or_default();
            lines.push(Line::from(vec![
                Span::styled(format!("  {}: ", attribute.name), Style::default().fg(colors.label)),
                Span::styled(summary, Style::default().fg(colors.value)),
            ]));
        }
    }

    lines
}
