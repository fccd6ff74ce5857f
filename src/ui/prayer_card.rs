//! Prayer times screen rendering
//!
//! Renders the day's five prayers with the next one highlighted, the live
//! countdown, and the Hijri date.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, PrayerStatus};
use crate::countdown::to_arabic_numerals;
use crate::data::{Prayer, PrayerDay};

/// Renders the prayer times screen
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(5), // Countdown
            Constraint::Min(7),    // Prayer list
            Constraint::Length(1), // Footer
        ])
        .split(area);

    render_header(frame, chunks[0], app.day.as_ref());
    render_countdown(frame, chunks[1], app);
    render_prayer_list(frame, chunks[2], app);
    render_footer(frame, chunks[3], app);
}

fn render_header(frame: &mut Frame, area: Rect, day: Option<&PrayerDay>) {
    let date_line = match day {
        Some(day) => format!(
            "{}  |  {} {} {}",
            day.date.readable,
            day.date.hijri.weekday.ar,
            day.date.hijri.month.ar,
            to_arabic_numerals(&day.date.hijri.year),
        ),
        None => "Prayer Times".to_string(),
    };

    let header = Paragraph::new(Line::from(Span::styled(
        date_line,
        Style::default().fg(Color::White),
    )))
    .block(
        Block::default()
            .title(" Noor Al-Huda ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)),
    )
    .alignment(Alignment::Center);

    frame.render_widget(header, area);
}

fn render_countdown(frame: &mut Frame, area: Rect, app: &App) {
    let lines = match (&app.status, app.countdown) {
        (_, Some(countdown)) => vec![
            Line::from(vec![
                Span::styled("Next prayer: ", Style::default().fg(Color::Gray)),
                Span::styled(
                    format!("{} ({})", countdown.next, countdown.next.arabic_name()),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                format!(
                    "{}   {}",
                    app.countdown_text(),
                    to_arabic_numerals(&app.countdown_text())
                ),
                Style::default()
                    .fg(Color::LightYellow)
                    .add_modifier(Modifier::BOLD),
            )),
        ],
        (PrayerStatus::NoLocation, None) => vec![
            Line::from("Set a location to see prayer times"),
            Line::from(Span::styled(
                "noorhuda --lat <LAT> --lng <LNG>",
                Style::default().fg(Color::DarkGray),
            )),
        ],
        (PrayerStatus::Failed(message), None) => vec![
            Line::from(Span::styled(
                "Could not load prayer times",
                Style::default().fg(Color::Red),
            )),
            Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::DarkGray),
            )),
        ],
        (_, None) => vec![
            Line::from("Loading prayer times..."),
            Line::from(app.countdown_text()),
        ],
    };

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn render_prayer_list(frame: &mut Frame, area: Rect, app: &App) {
    let next = app.countdown.map(|c| c.next);

    let lines: Vec<Line> = Prayer::ALL
        .iter()
        .map(|&prayer| {
            let time = app
                .timings
                .map(|t| t.get(prayer).format("%H:%M").to_string())
                .unwrap_or_else(|| "--:--".to_string());

            let is_next = next == Some(prayer);
            let marker = if is_next { "▶ " } else { "  " };
            let style = if is_next {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            Line::from(vec![
                Span::styled(marker, style),
                Span::styled(format!("{:<10}", prayer.key()), style),
                Span::styled(format!("{:<8}", prayer.arabic_name()), style),
                Span::styled(time, style),
            ])
        })
        .collect();

    let list = Paragraph::new(lines).block(
        Block::default()
            .title(" Today ")
            .borders(Borders::ALL),
    );

    frame.render_widget(list, area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let refreshed = app
        .last_refresh
        .map(|t| format!("Updated {}  ", t.format("%H:%M")))
        .unwrap_or_default();

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(refreshed, Style::default().fg(Color::DarkGray)),
        Span::styled(
            "r refresh  ? help  q quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countdown::{CountdownResult, CountdownUpdate, Remaining};
    use crate::data::{Coordinates, PrayerClient, PrayerTimings};
    use chrono::{NaiveDate, NaiveTime};
    use ratatui::{backend::TestBackend, Terminal};

    fn render_to_string(app: &App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app_with_countdown() -> App {
        let hm = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        let mut app = App::with_client(
            Coordinates::new(21.42, 39.83),
            PrayerClient::new().with_base_url("http://127.0.0.1:9/v1"),
        );
        app.timings = Some(PrayerTimings {
            fajr: hm(5, 0),
            dhuhr: hm(12, 0),
            asr: hm(15, 30),
            maghrib: hm(18, 10),
            isha: hm(19, 40),
        });
        app.status = PrayerStatus::Ready;
        app.apply_update(CountdownUpdate::Tick(CountdownResult {
            next: Prayer::Asr,
            at: NaiveDate::from_ymd_opt(2026, 10, 14).unwrap().and_time(hm(15, 30)),
            remaining: Remaining {
                hours: 2,
                minutes: 30,
                seconds: 0,
            },
        }));
        app
    }

    #[test]
    fn test_renders_countdown_and_prayers() {
        let content = render_to_string(&app_with_countdown());

        assert!(content.contains("Next prayer: Asr"), "Should name the next prayer");
        assert!(content.contains("02:30:00"), "Should show the countdown");
        assert!(content.contains("15:30"), "Should list Asr's time");
        assert!(content.contains("Maghrib"));
    }

    #[test]
    fn test_renders_no_location_hint() {
        let app = App::with_client(None, PrayerClient::new());
        let content = render_to_string(&app);

        assert!(content.contains("Set a location"));
        assert!(content.contains("--:--"), "Times show placeholders");
    }

    #[test]
    fn test_renders_failure_message() {
        let mut app = App::with_client(Coordinates::new(21.42, 39.83), PrayerClient::new());
        app.status = PrayerStatus::Failed("Request quota exceeded".to_string());

        let content = render_to_string(&app);

        assert!(content.contains("Could not load prayer times"));
        assert!(content.contains("Request quota exceeded"));
    }
}
