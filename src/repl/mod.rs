//! Interactive terminal front-end
//!
//! One REPL is one connection: it owns a single chat session for its whole
//! lifetime and tears it down on exit. The active mode decides where plain
//! input goes; slash commands switch modes and upload images.

pub mod colors;
mod helper;
mod terminal;

pub use terminal::TerminalSurface;

use anyhow::Result;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::gemini::GenerativeApi;
use crate::session::{Message, SessionId, SessionStore};
use crate::surface::Surface;
use crate::views::{Mode, ModeRouter, Upload, ViewInput};
use helper::DeskHelper;

/// A parsed line of input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    /// `/mode` alone shows the current mode
    Mode(Option<String>),
    Modes,
    Caption(String),
    History,
    Context,
    Clear,
    Quit,
    Unknown(String),
    /// Anything that isn't a slash command
    Input(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let trimmed = line.trim();
        if !trimmed.starts_with('/') {
            return Command::Input(line.to_string());
        }

        let (name, arg) = match trimmed.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (trimmed, ""),
        };
        let arg = (!arg.is_empty()).then(|| arg.to_string());

        match name {
            "/help" | "/?" => Command::Help,
            "/mode" => Command::Mode(arg),
            "/modes" => Command::Modes,
            "/caption" => match arg {
                Some(path) => Command::Caption(path),
                None => Command::Unknown("/caption needs a file path".into()),
            },
            "/history" => Command::History,
            "/context" => Command::Context,
            "/clear" => Command::Clear,
            "/quit" | "/exit" => Command::Quit,
            other => Command::Unknown(format!("Unknown command: {}. Try /help", other)),
        }
    }
}

/// Strip the quotes terminals add when a file is dragged in
fn clean_path(raw: &str) -> PathBuf {
    PathBuf::from(raw.trim().trim_matches(|c| c == '"' || c == '\''))
}

pub struct Repl {
    editor: Editor<DeskHelper, DefaultHistory>,
    api: Arc<dyn GenerativeApi>,
    sessions: SessionStore,
    session_id: SessionId,
    mode: Mode,
    surface: TerminalSurface,
    history_path: PathBuf,
}

impl Repl {
    pub fn new(api: Arc<dyn GenerativeApi>) -> Result<Self> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(DeskHelper::new()));

        // History file in ~/.gemini-desk/history
        let history_path = dirs::home_dir()
            .unwrap_or_default()
            .join(".gemini-desk")
            .join("history");

        Ok(Self {
            editor,
            api,
            sessions: SessionStore::new(),
            session_id: SessionId::new(),
            mode: Mode::default(),
            surface: TerminalSurface::new(),
            history_path,
        })
    }

    fn load_history(&mut self) {
        if self.history_path.exists() {
            let _ = self.editor.load_history(&self.history_path);
        }
    }

    fn save_history(&mut self) {
        if let Some(parent) = self.history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = self.editor.save_history(&self.history_path);
    }

    /// Run until EOF or /quit
    pub async fn run(&mut self) -> Result<()> {
        self.load_history();

        println!("Type /help for commands, /mode <name> to switch, Ctrl+D to exit");
        self.enter_mode(self.mode).await;

        loop {
            let prompt = colors::prompt(self.mode.as_str());
            let line = match self.editor.readline(&prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            };

            if line.trim().is_empty() {
                continue;
            }
            self.editor.add_history_entry(line.as_str())?;

            if !self.handle(Command::parse(&line)).await {
                break;
            }
        }

        println!("Goodbye!");
        self.save_history();
        self.sessions.remove(self.session_id).await;
        Ok(())
    }

    /// Returns false when the REPL should exit
    async fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Help => print_help(),
            Command::Mode(None) => println!("Current mode: {}", self.mode),
            Command::Mode(Some(name)) => match name.parse::<Mode>() {
                Ok(mode) => self.enter_mode(mode).await,
                Err(e) => println!("{}", colors::warning(&e)),
            },
            Command::Modes => {
                for mode in Mode::all() {
                    let marker = if mode == self.mode { "*" } else { " " };
                    println!(" {} {:<8} {}", marker, mode.as_str(), mode.title());
                }
            }
            Command::Caption(path) => {
                if self.mode != Mode::Caption {
                    self.enter_mode(Mode::Caption).await;
                }
                self.caption_file(&clean_path(&path)).await;
            }
            Command::History => {
                let router = ModeRouter::new(self.api.as_ref(), &self.sessions, self.session_id);
                router.enter(Mode::Chat, &mut self.surface).await;
            }
            Command::Context => self.show_context().await,
            Command::Clear => {
                self.sessions.remove(self.session_id).await;
                self.session_id = SessionId::new();
                println!("Conversation cleared.");
            }
            Command::Quit => return false,
            Command::Unknown(msg) => println!("{}", colors::warning(&msg)),
            Command::Input(text) => match self.mode {
                Mode::Caption => self.caption_file(&clean_path(&text)).await,
                mode => {
                    let router = ModeRouter::new(self.api.as_ref(), &self.sessions, self.session_id);
                    router
                        .submit(mode, ViewInput::Text(text), &mut self.surface)
                        .await;
                }
            },
        }
        true
    }

    async fn enter_mode(&mut self, mode: Mode) {
        debug!("switching to {} mode", mode);
        self.mode = mode;
        let router = ModeRouter::new(self.api.as_ref(), &self.sessions, self.session_id);
        router.enter(mode, &mut self.surface).await;
        println!("{}", colors::status(mode.placeholder()));
    }

    async fn caption_file(&mut self, path: &Path) {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.surface
                    .error(&format!("Error processing image: {}: {}", path.display(), e));
                return;
            }
        };
        info!("captioning {}", path.display());

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let upload = Upload::new(filename, bytes);

        let router = ModeRouter::new(self.api.as_ref(), &self.sessions, self.session_id);
        router
            .submit(Mode::Caption, ViewInput::Upload(upload), &mut self.surface)
            .await;
    }

    /// What the conversational handle will send as context on the next turn
    async fn show_context(&mut self) {
        let Some(session) = self.sessions.get(self.session_id).await else {
            println!("No conversation yet.");
            return;
        };
        let session = session.lock().await;
        let history = session.context_history();
        if history.is_empty() {
            println!("No turns committed yet.");
            return;
        }
        println!(
            "{}",
            colors::status(&format!("{} turns remembered by the model", history.len()))
        );
        for content in history {
            let message = Message::from_content(content);
            self.surface.chat_turn(message.role, &message.content);
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /help              - Show this help");
    println!("  /mode [name]       - Show or switch mode (chat, caption, embed, ask)");
    println!("  /modes             - List modes");
    println!("  /caption <path>    - Caption a jpg/jpeg/png image");
    println!("  /history           - Replay the chat transcript");
    println!("  /context           - Show the turns the model remembers");
    println!("  /clear             - Start a new chat session");
    println!("  /quit              - Exit");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_input() {
        assert_eq!(
            Command::parse("what is rust?"),
            Command::Input("what is rust?".into())
        );
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(Command::parse("/mode"), Command::Mode(None));
        assert_eq!(
            Command::parse("/mode   embed "),
            Command::Mode(Some("embed".into()))
        );
        assert_eq!(Command::parse("/modes"), Command::Modes);
    }

    #[test]
    fn test_parse_caption() {
        assert_eq!(
            Command::parse("/caption ~/Pictures/dog on beach.png"),
            Command::Caption("~/Pictures/dog on beach.png".into())
        );
        assert!(matches!(Command::parse("/caption"), Command::Unknown(_)));
    }

    #[test]
    fn test_parse_quit_and_unknown() {
        assert_eq!(Command::parse("/exit"), Command::Quit);
        assert!(matches!(Command::parse("/frobnicate"), Command::Unknown(m) if m.contains("/frobnicate")));
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(" '/tmp/a b.png' "), PathBuf::from("/tmp/a b.png"));
        assert_eq!(clean_path("\"x.jpg\""), PathBuf::from("x.jpg"));
    }
}
