use ratatui::style::{Color, Modifier, Style};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Rgb(142, 192, 124))
    .add_modifier(Modifier::BOLD);
pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(131, 165, 152))
    .fg(Color::Black)
    .add_modifier(Modifier::BOLD);
pub const TOTALS_STYLE: Style = Style::new()
    .fg(Color::Rgb(250, 189, 47))
    .add_modifier(Modifier::BOLD);
pub const MUTED_STYLE: Style = Style::new().fg(Color::Rgb(146, 131, 116));
pub const KEY_STYLE: Style = Style::new().fg(Color::Cyan);
pub const ERROR_STYLE: Style = Style::new().fg(Color::Rgb(254, 128, 25));

pub fn zebra_row_style(index: usize) -> Style {
    let bg = if index % 2 == 0 {
        Color::Rgb(18, 20, 26)
    } else {
        Color::Rgb(24, 27, 34)
    };
    Style::new().bg(bg)
}

pub fn cluster_status_color(status: &str) -> Color {
    match status.to_uppercase().as_str() {
        "OK" => Color::Rgb(184, 187, 38),
        "REDISTRIBUTING" | "REBUILDING" | "PARTIALLY_PROTECTED" => Color::Rgb(250, 189, 47),
        "UNKNOWN" => Color::Rgb(146, 131, 116),
        _ => Color::Rgb(254, 128, 25),
    }
}

pub fn role_color(role: &str) -> Color {
    match role.to_uppercase().as_str() {
        "DRIVES" => Color::Rgb(131, 165, 152),
        "COMPUTE" => Color::Rgb(211, 134, 155),
        "FRONTEND" => Color::Rgb(142, 192, 124),
        _ => Color::Rgb(146, 131, 116),
    }
}
