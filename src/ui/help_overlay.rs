//! Help overlay listing the dashboard's keys

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Key and description pairs shown in the overlay
const KEYBINDINGS: &[(&str, &str)] = &[
    ("r", "Refresh prayer times"),
    ("?", "Toggle this help"),
    ("q / Esc", "Quit"),
];

const OVERLAY_WIDTH: u16 = 44;
const OVERLAY_HEIGHT: u16 = 13;

/// Draws the overlay centered over whatever is already on screen
pub fn render(frame: &mut Frame) {
    let area = overlay_area(frame.area());

    let title_style = Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD);
    let key_style = Style::default().fg(Color::Yellow);

    let mut lines = vec![
        Line::from(Span::styled("Keyboard Shortcuts", title_style)),
        Line::default(),
    ];
    lines.extend(KEYBINDINGS.iter().map(|(key, description)| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", key), key_style),
            Span::raw(*description),
        ])
    }));
    lines.extend([
        Line::default(),
        Line::from(Span::styled(
            "Countdown",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  Recomputed every second. After Isha it counts down to tomorrow's Fajr."),
        Line::default(),
        Line::from(Span::styled(
            "Esc or ? closes",
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    let help = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(help, area);
}

/// Centers the overlay in `screen`, shrinking it to fit small terminals
fn overlay_area(screen: Rect) -> Rect {
    let width = OVERLAY_WIDTH.min(screen.width);
    let height = OVERLAY_HEIGHT.min(screen.height);
    Rect::new(
        screen.x + (screen.width - width) / 2,
        screen.y + (screen.height - height) / 2,
        width,
        height,
    )
}
