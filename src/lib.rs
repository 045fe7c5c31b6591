//! AITerm - a command shell with optional natural-language translation.
//!
//! Each input line is either a session built-in (`cd`, `pwd`, `clear`,
//! `exit`) or an external command. With AI mode on, anything that is not a
//! built-in is first sent to a language model that rewrites it into a single
//! shell command.
//!
//! # Architecture
//!
//! - [`session`] - Working directory and AI toggle for one session
//! - [`classify`] - Built-in vs. external classification and tokenizing
//! - [`translator`] - Natural-language to command translation
//! - [`executor`] - Runs external commands in the session directory
//! - [`builtins`] - Session-local commands
//! - [`router`] - The dispatch pipeline tying the above together
//! - [`output`] - Lines and control signals handed to the front end
//! - [`terminal`] - Line-oriented front end
//! - [`history`] - In-session command history
//! - [`config`] - Configuration management (API key, model, endpoint)
//! - [`http_client`] - HTTP client abstraction
//! - [`error`] - Error kinds produced during dispatch
//!
//! # Example
//!
//! ```ignore
//! use aiterm::{router::InputRouter, session::SessionState, translator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = aiterm::config::Config::load()?;
//!     let router = InputRouter::new(translator::from_config(&config));
//!     let mut session = SessionState::from_current_dir(true)?;
//!
//!     let dispatch = router.dispatch("list the files here", &mut session).await;
//!     for line in dispatch.lines {
//!         println!("{}", line.text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Limitations
//!
//! Commands are split on whitespace only: no pipes, redirection, quoting,
//! globbing or variable expansion. Commands run with the full privileges
//! of the shell process.

pub mod builtins;
pub mod classify;
pub mod config;
pub mod error;
pub mod executor;
pub mod history;
pub mod http_client;
pub mod output;
pub mod router;
pub mod session;
pub mod terminal;
pub mod translator;
