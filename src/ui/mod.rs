mod cards;
mod prompt;

use chrono::{DateTime, Utc};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Tabs};
use ratatui::Frame;

use crate::app::App;
use crate::view::{PrivateProbing, ViewState};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    let view = app.current_view();
    match &view {
        None | Some(ViewState::NoSubscription) | Some(ViewState::ColumnMissing) => {}
        Some(ViewState::NoToken { github_app_type }) => {
            prompt::render_no_token(frame, *github_app_type, chunks[1])
        }
        Some(ViewState::PrivateProbing(PrivateProbing::ConnectApp { github_app_type })) => {
            prompt::render_no_token(frame, *github_app_type, chunks[1])
        }
        Some(ViewState::PrivateProbing(PrivateProbing::Loading)) => {
            prompt::render_loading(frame, chunks[1])
        }
        Some(ViewState::PrivateProbing(PrivateProbing::Install(install))) => {
            prompt::render_install(frame, install, chunks[1])
        }
        Some(ViewState::Cards(props)) => cards::render(frame, props, app.item_index, chunks[1]),
    }

    render_status_bar(frame, app, view.as_ref(), chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<String> = app
        .containers
        .iter()
        .map(|c| format!(" {} ", c.column_id()))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.column_index)
        .style(Style::default().fg(Color::Gray).bg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider("|");

    frame.render_widget(tabs, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, view: Option<&ViewState<'_>>, area: Rect) {
    let status = if let Some(error) = &app.error {
        Line::from(vec![Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )])
    } else if let Some(notice) = &app.notice {
        Line::from(vec![Span::styled(
            notice.clone(),
            Style::default().fg(Color::Green),
        )])
    } else {
        let help = match view {
            Some(ViewState::Cards(props)) if props.fetch_next_page.is_some() => {
                "h/l: columns | j/k: nav | n: more | r: refresh | b: bookmark | c: clear | q: quit"
            }
            Some(ViewState::Cards(_)) => {
                "h/l: columns | j/k: nav | r: refresh | b: bookmark | c: clear | q: quit"
            }
            Some(ViewState::PrivateProbing(PrivateProbing::Install(_))) => {
                "h/l: columns | i: install app | y: copy link | r: refresh | q: quit"
            }
            _ => "h/l: columns | r: refresh | q: quit",
        };
        Line::from(vec![Span::styled(help, Style::default().fg(Color::Gray))])
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}

/// Cut to `max` characters, adding "..." when shortened
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn format_age(dt: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(dt);

    if duration.num_days() > 0 {
        format!("{}d", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m", duration.num_minutes())
    } else {
        "now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ünïcödé title", 8), "ünïcö...");
    }

    #[test]
    fn age_buckets() {
        let now = Utc::now();
        assert_eq!(format_age(now - Duration::days(3)), "3d");
        assert_eq!(format_age(now - Duration::hours(5)), "5h");
        assert_eq!(format_age(now - Duration::minutes(7)), "7m");
        assert_eq!(format_age(now), "now");
    }
}
