//! Rustyline helper with slash-command and mode-name completion

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::borrow::Cow;

use crate::views::Mode;

/// Slash commands for tab completion
pub const SLASH_COMMANDS: &[&str] = &[
    "/help",
    "/mode",
    "/modes",
    "/caption",
    "/history",
    "/context",
    "/clear",
    "/quit",
    "/exit",
];

pub struct DeskHelper {
    hinter: HistoryHinter,
}

impl DeskHelper {
    pub fn new() -> Self {
        Self {
            hinter: HistoryHinter::new(),
        }
    }
}

impl Default for DeskHelper {
    fn default() -> Self {
        Self::new()
    }
}

/// Candidates for `line` with the cursor at its end
pub fn completions(line: &str) -> (usize, Vec<String>) {
    if let Some(arg) = line.strip_prefix("/mode ") {
        let start = line.len() - arg.len();
        let modes = Mode::all()
            .iter()
            .map(|m| m.as_str())
            .filter(|m| m.starts_with(arg.trim_start()))
            .map(str::to_string)
            .collect();
        return (start, modes);
    }

    if line.starts_with('/') && !line.contains(' ') {
        let commands = SLASH_COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| cmd.to_string())
            .collect();
        return (0, commands);
    }

    (line.len(), Vec::new())
}

impl Completer for DeskHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, candidates) = completions(&line[..pos]);
        let pairs = candidates
            .into_iter()
            .map(|c| Pair {
                display: c.clone(),
                replacement: c,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for DeskHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        if !line.starts_with('/') {
            self.hinter.hint(line, pos, ctx)
        } else {
            None
        }
    }
}

impl Highlighter for DeskHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[2m{}\x1b[0m", hint))
    }
}

impl Validator for DeskHelper {}

impl Helper for DeskHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_commands() {
        let (start, c) = completions("/ca");
        assert_eq!(start, 0);
        assert_eq!(c, vec!["/caption"]);

        let (_, c) = completions("/mode");
        assert_eq!(c, vec!["/mode", "/modes"]);
    }

    #[test]
    fn test_complete_mode_names() {
        let (start, c) = completions("/mode em");
        assert_eq!(start, 6);
        assert_eq!(c, vec!["embed"]);
    }

    #[test]
    fn test_plain_text_has_no_completions() {
        let (_, c) = completions("hello there");
        assert!(c.is_empty());
    }
}
