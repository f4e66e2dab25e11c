use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::view::CardsProps;

use super::{format_age, truncate};

pub fn render(frame: &mut Frame, props: &CardsProps<'_>, selected: usize, area: Rect) {
    let has_error = !props.error_message.is_empty();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(if has_error { 1 } else { 0 }),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    if has_error {
        let error = Paragraph::new(Line::from(Span::styled(
            format!(" {}", props.error_message),
            Style::default().fg(Color::Red),
        )));
        frame.render_widget(error, chunks[0]);
    }

    render_list(frame, props, selected, chunks[1]);
    render_footer(frame, props, chunks[2]);
}

fn render_list(frame: &mut Frame, props: &CardsProps<'_>, selected: usize, area: Rect) {
    let title = if props.is_showing_only_bookmarks {
        format!(" {} - bookmarks ({}) ", props.column_id, props.item_identities.len())
    } else {
        format!(" {} ({}) ", props.column_id, props.item_identities.len())
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if props.item_identities.is_empty() {
        let message = if props.is_showing_only_bookmarks {
            "No bookmarks"
        } else {
            "Nothing here"
        };
        let empty = Paragraph::new(message)
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let fixed = 52; // kind(3) + repo(25) + #num(7) + @author(~13) + age(~4)
    let flex = w.saturating_sub(fixed).max(10);

    let items: Vec<ListItem> = props
        .items()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let (kind, kind_color) = if item.is_pull_request {
                ("PR", Color::Magenta)
            } else {
                ("IS", Color::Green)
            };
            let bookmark = if item.saved { "*" } else { " " };

            let line = Line::from(vec![
                Span::styled(format!("{} ", kind), Style::default().fg(kind_color)),
                Span::styled(
                    format!("{:<25}", truncate(&item.repo, 25)),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!("#{:<6}", item.number),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(bookmark, Style::default().fg(Color::Yellow)),
                Span::styled(format!("{:<flex$}", truncate(&item.title, flex)), style),
                Span::raw("  "),
                Span::styled(
                    format!("@{}", truncate(&item.author, 12)),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw("  "),
                Span::styled(format_age(item.updated_at), Style::default().fg(Color::DarkGray)),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_footer(frame: &mut Frame, props: &CardsProps<'_>, area: Rect) {
    let mut spans = Vec::new();
    if props.fetch_next_page.is_some() {
        spans.push(Span::styled(
            " [n] load more ",
            Style::default().fg(Color::Cyan),
        ));
    } else {
        spans.push(Span::styled(" end of list ", Style::default().fg(Color::DarkGray)));
    }
    if let Some(at) = props.last_fetch_success_at {
        let age = match format_age(at).as_str() {
            "now" => "just now".to_string(),
            age => format!("{} ago", age),
        };
        spans.push(Span::styled(
            format!(" updated {}", age),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
