//! Terminal rendering of moods and themes.

use colored::{ColoredString, Colorize};
use moodskin_application::DisplayState;
use moodskin_core::CanonicalMood;
use moodskin_core::theme::Theme;

/// Parses `#rgb` or `#rrggbb`.
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut digits = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some((digits.next()??, digits.next()??, digits.next()??))
        }
        6 => Some((
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
        )),
        _ => None,
    }
}

/// A colored block for `color`, or the raw value when it is not a hex color.
fn swatch(color: &str) -> ColoredString {
    match parse_hex(color) {
        Some((r, g, b)) => "██".truecolor(r, g, b),
        None => color.normal(),
    }
}

pub fn mood_label(mood: Option<CanonicalMood>) -> String {
    match mood {
        Some(mood) => format!("{} {}", mood.emoji(), mood.title()),
        None => "No mood yet".to_string(),
    }
}

pub fn print_theme(theme: &Theme) {
    let stops: Vec<String> = theme
        .gradient
        .stops
        .iter()
        .map(|stop| format!("{} {}", swatch(stop), stop))
        .collect();
    println!("  {}", theme.description.italic());
    println!("  {} {}", "gradient".dimmed(), stops.join("  "));
    println!("  {} {}", "css".dimmed(), theme.gradient.to_css());
    println!(
        "  {} {} {}  {} {}  {} {}",
        "button".dimmed(),
        swatch(&theme.button.bg),
        theme.button.bg,
        swatch(&theme.button.hover),
        theme.button.hover,
        swatch(&theme.button.text),
        theme.button.text
    );
}

pub fn print_display(state: &DisplayState) {
    println!("{}", mood_label(state.mood).bold());
    print_theme(&state.theme);
}
