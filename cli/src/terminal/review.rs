//! Interactive checkpoint shown before discovery starts.
//!
//! The list is printed, already saved to disk, and the user picks one key:
//! `c`/Enter continues, `e` opens the file in `$VISUAL`/`$EDITOR` and reloads
//! it afterwards, `q`/Esc/Ctrl-C aborts the run.

use std::collections::BTreeSet;
use std::io;
use std::path::Path;
use std::process::Command;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use scopr_common::utils::files;
use scopr_common::{success, warn};
use scopr_core::apex::{ReviewCheckpoint, ReviewError};

use crate::terminal::print;

const FALLBACK_EDITOR: &str = "vi";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Continue,
    Edit,
    Quit,
}

pub struct TerminalReview {
    quiet: u8,
}

impl TerminalReview {
    pub fn new(quiet: u8) -> Self {
        Self { quiet }
    }
}

impl ReviewCheckpoint for TerminalReview {
    fn review(
        &self,
        stage: &str,
        file: &Path,
        items: BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ReviewError> {
        print::section(&format!("review {stage}"), self.quiet);
        for (idx, item) in items.iter().enumerate() {
            print::numbered(idx, item);
        }
        print::note(format!("{} entries saved to {}", items.len(), file.display()));
        print::note("[c]ontinue  [e]dit  [q]uit");

        match wait_for_choice()? {
            Choice::Continue => Ok(items),
            Choice::Quit => Err(ReviewError::Aborted),
            Choice::Edit => {
                open_editor(file)?;
                let edited = files::read_hostnames(file)?;
                if edited.is_empty() {
                    warn!("{} is empty after editing", file.display());
                }
                success!("Continuing with {} reviewed {}", edited.len(), stage);
                Ok(edited)
            }
        }
    }
}

fn key_to_choice(key: &KeyEvent) -> Option<Choice> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return (key.code == KeyCode::Char('c')).then_some(Choice::Quit);
    }
    match key.code {
        KeyCode::Char('c') | KeyCode::Enter => Some(Choice::Continue),
        KeyCode::Char('e') => Some(Choice::Edit),
        KeyCode::Char('q') | KeyCode::Esc => Some(Choice::Quit),
        _ => None,
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

fn wait_for_choice() -> io::Result<Choice> {
    let _guard = RawModeGuard::enable()?;
    loop {
        if let Event::Key(key) = event::read()?
            && let Some(choice) = key_to_choice(&key)
        {
            return Ok(choice);
        }
    }
}

fn editor_command() -> String {
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}

fn open_editor(file: &Path) -> io::Result<()> {
    let editor = editor_command();
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or(FALLBACK_EDITOR);

    let status = Command::new(program).args(parts).arg(file).status()?;
    if !status.success() {
        return Err(io::Error::other(format!("{program} exited with {status}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn keys_map_to_choices() {
        assert_eq!(key_to_choice(&press(KeyCode::Char('c'))), Some(Choice::Continue));
        assert_eq!(key_to_choice(&press(KeyCode::Enter)), Some(Choice::Continue));
        assert_eq!(key_to_choice(&press(KeyCode::Char('e'))), Some(Choice::Edit));
        assert_eq!(key_to_choice(&press(KeyCode::Char('q'))), Some(Choice::Quit));
        assert_eq!(key_to_choice(&press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn ctrl_c_quits_instead_of_continuing() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_choice(&key), Some(Choice::Quit));
    }

    #[test]
    fn releases_are_ignored() {
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        assert_eq!(key_to_choice(&key), None);
    }
}
