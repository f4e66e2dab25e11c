use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::install::InstallPrompt;
use crate::view::GitHubAppType;

fn centered(frame: &mut Frame, lines: Vec<Line>, area: Rect) {
    let top = area.height.saturating_sub(lines.len() as u16 + 2) / 2;
    let mut padded = vec![Line::from(""); top as usize];
    padded.extend(lines);

    let paragraph = Paragraph::new(padded)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

pub fn render_no_token(frame: &mut Frame, github_app_type: GitHubAppType, area: Rect) {
    let (title, detail) = match github_app_type {
        GitHubAppType::Both => (
            "Connect your GitHub account",
            "Set GITHUB_TOKEN and COLVIEW_APP_TOKEN, or store them under ~/.config/colview/tokens/",
        ),
        GitHubAppType::Oauth => (
            "Log in with GitHub",
            "A personal token is missing. Set GITHUB_TOKEN or run `gh auth login`.",
        ),
        GitHubAppType::App => (
            "Connect the GitHub App",
            "This column may be private. Set GITHUB_APP_TOKEN to access it.",
        ),
    };

    centered(
        frame,
        vec![
            Line::from(Span::styled(
                title,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(detail, Style::default().fg(Color::Gray))),
        ],
        area,
    );
}

pub fn render_loading(frame: &mut Frame, area: Rect) {
    centered(
        frame,
        vec![Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        ))],
        area,
    );
}

pub fn render_install(frame: &mut Frame, prompt: &InstallPrompt, area: Rect) {
    let button_style = if prompt.disabled {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    };
    let button = if prompt.loading {
        "[i] Install GitHub App (loading...)"
    } else {
        "[i] Install GitHub App"
    };

    centered(
        frame,
        vec![
            Line::from(Span::styled(
                prompt.title,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::raw(prompt.subtitle)),
            Line::from(""),
            Line::from(Span::styled(button, button_style)),
            Line::from(""),
            Line::from(Span::styled(
                prompt.href.as_str(),
                Style::default().fg(Color::DarkGray),
            )),
        ],
        area,
    );
}
