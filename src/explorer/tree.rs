//! Tree panel UI rendering.

use super::ExplorerState;
use crate::data::NodeKind;
use crate::ui::ThemeColors;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Draw the tree panel UI.
pub fn draw_tree(f: &mut Frame<'_>, explorer: &mut ExplorerState, area: Rect, colors: &ThemeColors) {
    if explorer.visible_items().is_empty() {
        draw_welcome(f, area, colors);
        return;
    }

    // Adjust scroll to keep cursor visible (subtract 2 for borders)
    let viewport_height = area.height.saturating_sub(2) as usize;
    explorer.adjust_scroll(viewport_height);

    let cursor = explorer.cursor();
    let scroll_offset = explorer.scroll_offset();

    // Only show items within the viewport
    let items: Vec<ListItem<'_>> = explorer
        .visible_items()
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(viewport_height)
        .map(|(idx, item)| {
            let indent = "  ".repeat(item.level);
            let expand_icon = match (item.has_children, item.expanded) {
                (true, true) => "▼ ",
                (true, false) => "▶ ",
                (false, _) => "  ",
            };

            let line = if idx == cursor {
                let text = format!("{}{}{}", indent, expand_icon, item.label);
                Line::from(text).style(
                    Style::default()
                        .fg(colors.cursor_fg)
                        .bg(colors.cursor_bg)
                        .add_modifier(Modifier::BOLD),
                )
            } else if matches!(item.kind, NodeKind::Variable | NodeKind::Attribute) {
                // Split after the name to dim the shape summary
                let (name_part, meta_part) = split_label(&item.label);
                let name_color = if item.unresolved {
                    colors.warning
                } else if item.loaded {
                    colors.value
                } else if item.numeric {
                    colors.numeric
                } else {
                    colors.text
                };

                Line::from(vec![
                    Span::raw(indent),
                    Span::raw(expand_icon),
                    Span::styled(
                        name_part.to_string(),
                        Style::default().fg(name_color).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(meta_part.to_string(), Style::default().fg(colors.muted)),
                ])
            } else {
                let text = format!("{}{}{}", indent, expand_icon, item.label);
                Line::from(text).style(Style::default().fg(colors.text))
            };

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Strata ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.border))
            .style(Style::default().bg(colors.bg)),
    );

    f.render_widget(list, area);
}

/// Split `icon name summary` after the name.
fn split_label(label: &str) -> (&str, &str) {
    let name_end = label
        .char_indices()
        .filter(|&(_, c)| c == ' ')
        .nth(1)
        .map(|(i, _)| i)
        .unwrap_or(label.len());
    label.split_at(name_end)
}

/// Draw the welcome screen.
pub fn draw_welcome(f: &mut Frame<'_>, area: Rect, colors: &ThemeColors) {
    let lines = vec![
        Line::from(Span::styled(
            "Welcome to Strata!",
            Style::default()
                .fg(colors.heading)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("No container is open."),
        Line::from(""),
        Line::from("Usage: strata <file.nc|file.h5>..."),
        Line::from(""),
        Line::from("Keyboard shortcuts:"),
        Line::from("  o           - Open most recent file"),
        Line::from("  j/k or ↓/↑  - Navigate"),
        Line::from("  h/l or ←/→  - Collapse/Expand"),
        Line::from("  Enter       - View as grid"),
        Line::from("  t           - Toggle details"),
        Line::from("  T           - Cycle theme"),
        Line::from("  q           - Quit"),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Strata ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.border))
                .style(Style::default().bg(colors.bg)),
        )
        .style(Style::default().fg(colors.text));

    f.render_widget(paragraph, area);
}
