use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::BrightCyan;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const HOST: Color = Color::BrightWhite;
pub const IPV4_ADDR: Color = Color::BrightBlue;

pub const OK: Color = Color::Green;
pub const WARN: Color = Color::Yellow;
pub const FAIL: Color = Color::Red;
