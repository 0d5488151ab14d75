// src/repl/terminal.rs
// Surface that prints to stdout

use image::DynamicImage;
use std::io::{self, Write};

use super::colors::{self, ansi};
use crate::session::MessageRole;
use crate::surface::Surface;
use crate::views::ViewState;

/// Values printed per line when showing an embedding
const VALUES_PER_LINE: usize = 6;

#[derive(Debug, Default)]
pub struct TerminalSurface {
    /// A "thinking..." line is on screen and must be cleared before output
    spinner_visible: bool,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn clear_spinner(&mut self) {
        if self.spinner_visible {
            print!("{}", ansi::CLEAR_LINE);
            let _ = io::stdout().flush();
            self.spinner_visible = false;
        }
    }
}

/// Embedding values, a few per line
pub fn format_embedding(values: &[f32]) -> String {
    values
        .chunks(VALUES_PER_LINE)
        .map(|chunk| {
            chunk
                .iter()
                .map(|v| format!("{:>10.6}", v))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl Surface for TerminalSurface {
    fn title(&mut self, text: &str) {
        self.clear_spinner();
        println!();
        println!("{}", colors::header(text));
        println!("{}", colors::separator(40));
    }

    fn chat_turn(&mut self, role: MessageRole, text: &str) {
        self.clear_spinner();
        let label = match role {
            MessageRole::User => colors::speaker("you", true),
            MessageRole::Assistant => colors::speaker("gemini", false),
        };
        println!("{} {}", label, text);
    }

    fn markdown(&mut self, text: &str) {
        self.clear_spinner();
        println!("{}", text);
    }

    fn info(&mut self, text: &str) {
        self.clear_spinner();
        println!("{}", colors::info(text));
    }

    fn error(&mut self, message: &str) {
        self.clear_spinner();
        println!("{}", colors::error(message));
    }

    fn image(&mut self, image: &DynamicImage) {
        self.clear_spinner();
        println!(
            "{}",
            colors::status(&format!("[preview {}x{}]", image.width(), image.height()))
        );
    }

    fn embedding(&mut self, values: &[f32]) {
        self.clear_spinner();
        println!("{}", colors::status(&format!("{} dimensions", values.len())));
        println!("{}", format_embedding(values));
    }

    fn set_state(&mut self, state: ViewState) {
        match state {
            ViewState::Processing => {
                print!("{}", colors::status("thinking..."));
                let _ = io::stdout().flush();
                self.spinner_visible = true;
            }
            ViewState::Idle => self.clear_spinner(),
        }
    }
}
