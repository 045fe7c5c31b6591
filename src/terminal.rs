//! Line-oriented front end: prompt, colors, and the read/dispatch loop.
//!
//! The front end owns the AI toggle (`:ai`), the session history
//! (`:history`), and acts on the router's control signals. Everything else
//! goes through [`InputRouter::dispatch`].

use crate::history::CommandHistory;
use crate::output::{Control, Dispatch, LineKind, OutputLine};
use crate::router::InputRouter;
use crate::session::SessionState;
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

/// Front-end command that flips AI translation on or off.
pub const TOGGLE_AI: &str = ":ai";
/// Front-end command that lists the lines entered so far.
pub const SHOW_HISTORY: &str = ":history";

const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const RED: &str = "\x1b[31m";
const GRAY: &str = "\x1b[90m";
const RESET: &str = "\x1b[0m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Whether a session ended by `exit` or by running out of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Exit,
    EndOfInput,
}

pub struct Terminal<W: Write> {
    output: W,
    color: bool,
    history: CommandHistory,
}

impl<W: Write> Terminal<W> {
    pub fn new(output: W, color: bool) -> Self {
        Self {
            output,
            color,
            history: CommandHistory::new(),
        }
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    pub fn render(&self, line: &OutputLine) -> String {
        let color = match line.kind {
            LineKind::Echo => Some(GREEN),
            LineKind::Interpreted => Some(CYAN),
            LineKind::Error | LineKind::Stderr => Some(RED),
            LineKind::Info => Some(GRAY),
            LineKind::Stdout => None,
        };
        match color {
            Some(code) if self.color => format!("{}{}{}", code, line.text, RESET),
            _ => line.text.clone(),
        }
    }

    pub fn show(&mut self, dispatch: &Dispatch) -> Result<()> {
        for line in &dispatch.lines {
            let text = self.render(line);
            writeln!(self.output, "{}", text)?;
        }
        if dispatch.control == Some(Control::ClearOutput) {
            write!(self.output, "{}", CLEAR_SCREEN)?;
        }
        self.output.flush()?;
        Ok(())
    }

    pub fn info(&mut self, text: &str) -> Result<()> {
        let text = self.render(&OutputLine::new(LineKind::Info, text));
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    pub fn welcome(&mut self, session: &SessionState) -> Result<()> {
        writeln!(self.output, "Welcome to AITerm!")?;
        self.info("A terminal with AI command interpretation.")?;
        self.info(&format!(
            "AI mode is {} - type '{}' to toggle it, 'exit' to quit.",
            if session.ai_translation_enabled { "on" } else { "off" },
            TOGGLE_AI
        ))?;
        self.info(&format!("Type '{}' to list previous commands.", SHOW_HISTORY))?;
        Ok(())
    }

    fn show_history(&mut self) -> Result<()> {
        let entries: Vec<String> = self
            .history
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{:>5}  {}", i + 1, line))
            .collect();
        for entry in entries {
            writeln!(self.output, "{}", entry)?;
        }
        self.output.flush()?;
        Ok(())
    }

    fn prompt(&mut self, session: &SessionState) -> Result<()> {
        let mode = if session.ai_translation_enabled { " [AI]" } else { "" };
        write!(self.output, "{}{}❯ ", session.working_directory().display(), mode)?;
        self.output.flush()?;
        Ok(())
    }

    /// Reads lines from `input` and dispatches them one at a time until
    /// `exit` or end of input.
    pub async fn run<R: AsyncBufRead + Unpin>(
        &mut self,
        router: &InputRouter,
        session: &mut SessionState,
        input: R,
        interactive: bool,
    ) -> Result<SessionEnd> {
        let mut lines = input.lines();
        loop {
            if interactive {
                self.prompt(session)?;
            }
            let Some(line) = lines.next_line().await? else {
                if interactive {
                    writeln!(self.output)?;
                }
                return Ok(SessionEnd::EndOfInput);
            };

            match line.trim() {
                TOGGLE_AI => {
                    let enabled = session.toggle_ai();
                    info!("AI mode toggled: {}", enabled);
                    let state = if enabled { "enabled" } else { "disabled" };
                    self.info(&format!("AI mode {}", state))?;
                    continue;
                }
                SHOW_HISTORY => {
                    self.show_history()?;
                    continue;
                }
                _ => {}
            }

            self.history.add(&line);
            let dispatch = router.dispatch(&line, session).await;
            self.show(&dispatch)?;
            if dispatch.control == Some(Control::Terminate) {
                return Ok(SessionEnd::Exit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translator::PatternTranslator;

    fn router() -> InputRouter {
        InputRouter::new(Box::new(PatternTranslator::new()))
    }

    fn output_of(terminal: Terminal<Vec<u8>>) -> String {
        String::from_utf8(terminal.into_inner()).unwrap()
    }

    #[test]
    fn test_render_colors_only_when_enabled() {
        let line = OutputLine::new(LineKind::Echo, "/tmp$ ls");
        assert_eq!(Terminal::new(Vec::new(), false).render(&line), "/tmp$ ls");
        assert_eq!(
            Terminal::new(Vec::new(), true).render(&line),
            "\x1b[32m/tmp$ ls\x1b[0m"
        );
    }

    #[test]
    fn test_clear_writes_clear_screen() {
        let mut terminal = Terminal::new(Vec::new(), false);
        let dispatch = Dispatch {
            lines: Vec::new(),
            control: Some(Control::ClearOutput),
            exit_code: None,
        };
        terminal.show(&dispatch).unwrap();
        assert_eq!(output_of(terminal), CLEAR_SCREEN);
    }

    #[tokio::test]
    async fn test_exit_stops_reading_further_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = SessionState::new(dir.path().canonicalize().unwrap(), false);
        let mut terminal = Terminal::new(Vec::new(), false);

        let end = terminal
            .run(&router(), &mut session, &b"echo first\nexit\necho second\n"[..], false)
            .await
            .unwrap();

        assert_eq!(end, SessionEnd::Exit);
        let out = output_of(terminal);
        assert!(out.contains("first"));
        assert!(!out.contains("second"));
    }

    #[tokio::test]
    async fn test_toggle_is_handled_by_front_end() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = SessionState::new(dir.path().canonicalize().unwrap(), true);
        let mut terminal = Terminal::new(Vec::new(), false);

        let end = terminal
            .run(&router(), &mut session, &b":ai\n"[..], false)
            .await
            .unwrap();

        assert_eq!(end, SessionEnd::EndOfInput);
        assert!(!session.ai_translation_enabled);
        let out = output_of(terminal);
        assert!(out.contains("AI mode disabled"));
        assert!(!out.contains("$ :ai"));
    }

    #[tokio::test]
    async fn test_history_lists_entered_lines_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = SessionState::new(dir.path().canonicalize().unwrap(), false);
        let mut terminal = Terminal::new(Vec::new(), false);

        terminal
            .run(&router(), &mut session, &b"pwd
pwd

echo hi
:ai
:history
"[..], false)
            .await
            .unwrap();

        assert_eq!(terminal.history().iter().collect::<Vec<_>>(), vec!["pwd", "echo hi"]);
        let out = output_of(terminal);
        assert!(out.contains("    1  pwd\n"), "{}", out);
        assert!(out.contains("    2  echo hi\n"), "{}", out);
        assert!(!out.contains(":history"));
        assert!(!out.contains("  :ai"));
    }
}
