//! Terminal rendering for a scopr run.
//!
//! Every line goes through [`print`], which logs on the print target. That keeps
//! output clear of the stage spinners and out of `scopr.log`.

use std::fmt::Display;

use colored::*;
use scopr_common::log::PRINT_TARGET;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use crate::terminal::colors;

pub const WIDTH: usize = 64;
const TAGLINE: &str = "scope in, targets out";

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

pub fn blank() {
    print("");
}

pub fn banner(no_banner: bool, quiet: u8) {
    if no_banner || quiet > 0 {
        return;
    }

    let title = format!(" scopr v{} ", env!("CARGO_PKG_VERSION"));
    let rest = WIDTH.saturating_sub(title.width() + 2);
    print(&format!(
        "{}{}{}",
        "━━".color(colors::SEPARATOR),
        title.color(colors::PRIMARY).bold(),
        "━".repeat(rest).color(colors::SEPARATOR)
    ));
    print(&format!("   {}", TAGLINE.color(colors::SEPARATOR).italic()));
}

/// Left-aligned section title followed by a rule to the full width.
pub fn section(title: &str, quiet: u8) {
    if quiet > 0 {
        return;
    }

    let title = format!(" {} ", title.to_uppercase());
    let rest = WIDTH.saturating_sub(title.width() + 2);
    print(&format!(
        "{}{}{}",
        "──".color(colors::SEPARATOR),
        title.color(colors::PRIMARY),
        "─".repeat(rest).color(colors::SEPARATOR)
    ));
}

pub fn note<T: AsRef<str>>(msg: T) {
    print(&format!("  {} {}", ">".color(colors::SEPARATOR), msg.as_ref()));
}

pub fn numbered(idx: usize, text: &str) {
    print(&format!(
        "  {}{}{} {}",
        "[".color(colors::SEPARATOR),
        idx.to_string().color(colors::ACCENT),
        "]".color(colors::SEPARATOR),
        text
    ));
}

/// Key/value rows rendered with dotted leaders, aligned on the longest key.
#[derive(Default)]
pub struct Fields {
    rows: Vec<(String, ColoredString)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<ColoredString>) -> &mut Self {
        self.rows.push((key.into(), value.into()));
        self
    }

    pub fn render(&self) {
        let width = self.rows.iter().map(|(key, _)| key.width()).max().unwrap_or(0);
        for (key, value) in &self.rows {
            let leader = "·".repeat(width - key.width() + 2);
            print(&format!(
                "  {} {} {}",
                key.color(colors::PRIMARY),
                leader.color(colors::SEPARATOR),
                value
            ));
        }
    }
}

/// A titled block with one branch per row. Left cells are padded so the right
/// cells line up.
pub fn tree<L, R>(title: ColoredString, rows: &[(L, R)])
where
    L: AsRef<str>,
    R: Display,
{
    print(&format!("  {title}"));

    let width = rows.iter().map(|(left, _)| left.as_ref().width()).max().unwrap_or(0);
    for (i, (left, right)) in rows.iter().enumerate() {
        let branch = if i + 1 == rows.len() { "└─" } else { "├─" };
        let left = left.as_ref();
        print(&format!(
            "  {} {}{}  {}",
            branch.color(colors::SEPARATOR),
            left.color(colors::HOST),
            " ".repeat(width - left.width()),
            right
        ));
    }
}

/// Shown in place of the in-scope tree, with the reason nothing landed there.
pub fn nothing_in_scope(why: &str) {
    print(&format!(
        "  {} {}",
        "∅".color(colors::WARN).bold(),
        "no in-scope hosts".bold()
    ));
    note(why);
}

pub fn rule() {
    print(&format!("{}", "─".repeat(WIDTH).color(colors::SEPARATOR)));
}
