use colored::Color;

pub const PRIMARY: Color = Color::BrightBlue;
pub const ACCENT: Color = Color::BrightYellow;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const TARGET_LEGACY: Color = Color::Magenta;
pub const TARGET_NEW: Color = Color::Cyan;

pub const GOOD: Color = Color::Green;
pub const BAD: Color = Color::Red;
pub const WARNING: Color = Color::Yellow;
pub const MUTED: Color = Color::BrightBlack;
