//! The line protocol handed from the router to the front end.

use crate::error::ShellError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Prompt echo of the submitted line. Always first.
    Echo,
    /// What the translator turned the input into.
    Interpreted,
    Stdout,
    Stderr,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub kind: LineKind,
    pub text: String,
}

impl OutputLine {
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Signals the front end must act on after rendering the lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Terminate,
    ClearOutput,
}

/// Everything one dispatch produced, in emission order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub lines: Vec<OutputLine>,
    pub control: Option<Control>,
    /// Exit code of the external command, when one ran to completion.
    pub exit_code: Option<i32>,
}

impl Dispatch {
    pub fn push(&mut self, kind: LineKind, text: impl Into<String>) {
        self.lines.push(OutputLine::new(kind, text));
    }

    pub fn push_error(&mut self, err: &ShellError) {
        self.push(LineKind::Error, err.to_string());
    }

    /// Pushes every line of `text` with the given kind, dropping the trailing newline.
    pub fn push_block(&mut self, kind: LineKind, text: &str) {
        for line in text.trim_end_matches(['\n', '\r']).lines() {
            self.push(kind, line);
        }
    }

    pub fn has_errors(&self) -> bool {
        self.lines.iter().any(|l| l.kind == LineKind::Error)
    }

    /// True when an error was reported or the external command exited non-zero.
    pub fn failed(&self) -> bool {
        self.has_errors() || self.exit_code.is_some_and(|code| code != 0)
    }

    pub fn texts(&self, kind: LineKind) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| l.text.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_block_splits_lines_and_drops_trailing_newline() {
        let mut dispatch = Dispatch::default();
        dispatch.push_block(LineKind::Stdout, "a\nb\n");
        assert_eq!(dispatch.texts(LineKind::Stdout), vec!["a", "b"]);
    }

    #[test]
    fn test_push_block_empty_text_adds_nothing() {
        let mut dispatch = Dispatch::default();
        dispatch.push_block(LineKind::Stderr, "\n");
        assert!(dispatch.lines.is_empty());
    }

    #[test]
    fn test_has_errors() {
        let mut dispatch = Dispatch::default();
        dispatch.push(LineKind::Info, "hi");
        assert!(!dispatch.has_errors());
        dispatch.push_error(&ShellError::ProgramNotFound("x".into()));
        assert!(dispatch.has_errors());
    }

    #[test]
    fn test_non_zero_exit_fails_without_error_line() {
        let mut dispatch = Dispatch::default();
        dispatch.push(LineKind::Stderr, "ls: missing: No such file or directory");
        dispatch.exit_code = Some(2);
        assert!(!dispatch.has_errors());
        assert!(dispatch.failed());

        dispatch.exit_code = Some(0);
        assert!(!dispatch.failed());
    }
}
