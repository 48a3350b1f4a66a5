use ratatui::style::Stylize;
use ratatui::style::{Color, Style};

pub fn title_style() -> Style { Style::default().fg(Color::Cyan).bold() }
pub fn hint_style() -> Style { Style::default().fg(Color::DarkGray) }
pub fn correct_style() -> Style { Style::default().fg(Color::Green).bold() }
pub fn incorrect_style() -> Style { Style::default().fg(Color::Red).bold() }
pub fn footer_style() -> Style { Style::default().fg(Color::Gray) }
