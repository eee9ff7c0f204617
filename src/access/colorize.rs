//! Chat color translation
//!
//! Turns `&`-prefixed color codes (`&aHello`) into the section-sign form
//! game clients render (`§aHello`), and hex colors (`&#ff8800` or `#ff8800`)
//! into the `§x§f§f§8§8§0§0` sequence used by 1.16+ clients.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Section sign that prefixes every client color code
pub const SECTION_SIGN: char = '§';

static HEX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&?#([0-9a-fA-F]{6})").expect("hex color pattern is valid"));

/// Post-processes text read from configuration
pub trait Colorizer {
    fn colorize(&self, text: &str) -> String;

    fn colorize_all(&self, lines: &[String]) -> Vec<String> {
        lines.iter().map(|line| self.colorize(line)).collect()
    }
}

/// Leaves text untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl Colorizer for PlainText {
    fn colorize(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Translates legacy `&` codes and, optionally, hex colors
#[derive(Debug, Clone, Copy)]
pub struct LegacyColorizer {
    hex: bool,
}

impl Default for LegacyColorizer {
    fn default() -> Self {
        Self { hex: true }
    }
}

impl LegacyColorizer {
    /// Colorizer for clients older than 1.16, which can't show hex colors
    pub fn without_hex() -> Self {
        Self { hex: false }
    }

    pub fn supports_hex(&self) -> bool {
        self.hex
    }
}

impl Colorizer for LegacyColorizer {
    fn colorize(&self, text: &str) -> String {
        if self.hex {
            let expanded = HEX_PATTERN.replace_all(text, |caps: &Captures<'_>| hex_sequence(&caps[1]));
            translate_alternate_codes('&', &expanded)
        } else {
            translate_alternate_codes('&', text)
        }
    }
}

fn hex_sequence(hex: &str) -> String {
    let mut out = String::with_capacity(14 * SECTION_SIGN.len_utf8());
    out.push(SECTION_SIGN);
    out.push('x');
    for c in hex.chars() {
        out.push(SECTION_SIGN);
        out.push(c.to_ascii_lowercase());
    }
    out
}

fn is_color_code(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), '0'..='9' | 'a'..='f' | 'k'..='o' | 'r' | 'x')
}

/// Replaces `alt` with the section sign wherever it precedes a color code
pub fn translate_alternate_codes(alt: char, text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(&next) if c == alt && is_color_code(next) => {
                out.push(SECTION_SIGN);
                out.push(next.to_ascii_lowercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }

    out
}
