//! UI rendering helpers for the terminal user interface.
//!
//! Every frame is drawn from the `App` model alone using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration, time::Instant};

use crate::app::{App, Screen};
use crate::config::UiSettings;
use crate::gesture::SwipeOutcome;
use crate::track::Track;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("h/l", "drag left/right");
    map.insert("enter", "let go");
    map.insert("a/d", "skip/keep");
    map.insert("esc", "recenter");
    map.insert("space/p", "play/pause");
    map.insert("j/k", "up/down");
    map.insert("play", "play/stop row");
    map.insert("q", "quit");
    map
});

/// Render the controls help text for `screen`.
fn controls_text(screen: &Screen) -> String {
    let order: &[&str] = match screen {
        Screen::Swipe => &["h/l", "enter", "a/d", "esc", "space/p", "q"],
        Screen::Playlist => &["j/k", "play", "q"],
        Screen::Exhausted | Screen::Failed(_) => &["q"],
    };
    order
        .iter()
        .filter_map(|k| {
            let label = if *k == "play" { "enter" } else { *k };
            CONTROLS_MAP.get(k).map(|v| format!("[{}] {}", label, v))
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// One-line drag meter: `✗ ─────●───── ♥`, the dot follows `progress`.
fn drag_meter(progress: f32, width: usize) -> String {
    let width = width.max(3);
    let p = if progress.is_finite() {
        progress.clamp(-1.0, 1.0)
    } else {
        0.0
    };
    let center = (width - 1) as f32 / 2.0;
    let pos = (center + p * center).round() as usize;
    let bar: String = (0..width)
        .map(|i| if i == pos.min(width - 1) { '●' } else { '─' })
        .collect();
    format!("✗ {bar} ♥")
}

fn tag_line(track: &Track) -> String {
    track
        .tag_labels()
        .map(|t| format!("#{t}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn status_text(app: &App) -> String {
    let mut parts: Vec<String> = Vec::new();
    parts.push(format!(
        " ❤ {}/{}",
        app.session.like_count, app.session.threshold
    ));

    let state = match (app.playback.track_id, app.playback.playing) {
        (Some(_), true) => format!("Playing {}", format_mmss(app.playback.elapsed)),
        (Some(_), false) => "Paused".to_string(),
        (None, _) => "Stopped".to_string(),
    };
    parts.push(state);

    if app.session.pending_requests > 0 {
        parts.push(format!("finding {} more", app.session.pending_requests));
    }
    parts.push(format!("{} in deck", app.session.queued));

    if let Some(notice) = &app.session.notice {
        parts.push(format!("! {notice}"));
    } else if let Some(err) = &app.playback.last_error {
        parts.push(format!("! {err}"));
    }
    parts.join(" • ")
}

/// Card rectangle shifted by the current drag, kept inside `area`.
fn card_rect(area: Rect, offset: i32) -> Rect {
    let width = area.width.min(48).max(10);
    let height = area.height.min(9);
    let base_x = area.x as i32 + (area.width.saturating_sub(width) / 2) as i32;
    let min_x = area.x as i32;
    let max_x = (area.x + area.width.saturating_sub(width)) as i32;
    let x = (base_x + offset).clamp(min_x, max_x.max(min_x));
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x: x as u16,
        y,
        width,
        height,
    }
}

fn draw_card(frame: &mut Frame, app: &App, area: Rect) {
    let Some(track) = app.session.head.as_ref() else {
        let waiting = Paragraph::new("Waiting for the next recommendation…")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" deck "));
        frame.render_widget(waiting, area);
        return;
    };

    let progress = app.drag.progress();
    let border = if progress >= 1.0 {
        Style::default().fg(Color::Green)
    } else if progress <= -1.0 {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    let tilt = app.drag.rotation_deg();
    let title = if tilt.abs() >= 1.0 {
        format!(" {:+.0}° ", tilt)
    } else {
        " now playing ".to_string()
    };

    let mut lines = vec![
        Line::from(Span::styled(
            track.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(track.artist.as_str()),
        Line::from(""),
        Line::from(tag_line(track)).italic(),
    ];
    let meter_width = area.width.min(48).saturating_sub(8) as usize;
    lines.push(Line::from(""));
    lines.push(Line::from(drag_meter(progress, meter_width)));

    let card = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(title)
                .title_alignment(Alignment::Center),
        );
    let rect = card_rect(area, app.drag.dx().round() as i32);
    frame.render_widget(card, rect);

    if app.departure_visible(Instant::now()) {
        if let Some(d) = &app.departure {
            let (mark, color) = match d.outcome {
                SwipeOutcome::Accept => ("♥ kept", Color::Green),
                SwipeOutcome::Reject => ("✗ skipped", Color::Red),
                SwipeOutcome::Cancel => ("", Color::Reset),
            };
            let flash = Paragraph::new(format!("{mark}: {}", d.title))
                .alignment(Alignment::Center)
                .fg(color);
            let line = Rect {
                height: 1,
                y: area.y,
                ..area
            };
            frame.render_widget(flash, line);
        }
    }
}

fn draw_playlist(frame: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let liked_len = app.playlist.liked.len();
    let item = |t: &Track| {
        let marker = if app.playing_row == Some(t.id) { "▶ " } else { "  " };
        ListItem::new(format!("{marker}{}", t.display()))
    };

    let sections = [
        (" liked ", &app.playlist.liked, 0usize),
        (" recommended ", &app.playlist.recommended, liked_len),
    ];
    for ((title, tracks, first_row), rect) in sections.into_iter().zip(halves.iter()) {
        let items: Vec<ListItem> = tracks.iter().map(&item).collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if (first_row..first_row + tracks.len()).contains(&app.selected) {
            state.select(Some(app.selected - first_row));
        }
        frame.render_stateful_widget(list, *rect, &mut state);
    }

    let overlay = match (&app.playlist_error, app.playlist_loading) {
        (Some(err), _) => Some(format!("Could not load the playlist: {err}")),
        (None, true) => Some("Loading your playlist...".to_string()),
        (None, false) => None,
    };
    if let Some(text) = overlay {
        let msg = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        let inner = Rect {
            y: area.y + area.height / 2,
            height: area.height.min(2),
            ..area
        };
        frame.render_widget(msg, inner);
    }
}

fn draw_message(frame: &mut Frame, area: Rect, title: &str, text: &str) {
    let msg = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(msg, area);
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" swipetune ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status = Paragraph::new(status_text(app))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    match &app.screen {
        Screen::Swipe => draw_card(frame, app, chunks[2]),
        Screen::Playlist => draw_playlist(frame, app, chunks[2]),
        Screen::Exhausted => draw_message(
            frame,
            chunks[2],
            " out of tracks ",
            "No more recommendations for this photo. Take another one to keep going.",
        ),
        Screen::Failed(reason) => draw_message(frame, chunks[2], " audio error ", reason),
    }

    let footer = Paragraph::new(controls_text(&app.screen))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}
