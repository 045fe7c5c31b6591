//! Classification of a command line into a built-in or an external command.
//!
//! Both the translation gate and the final dispatch decision go through
//! [`classify`], so switching [`ClassificationPolicy`] changes the matching
//! rule everywhere at once.

/// Session-local commands, in match order.
pub const BUILTIN_NAMES: [&str; 4] = ["cd", "pwd", "exit", "clear"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cd,
    Pwd,
    Exit,
    Clear,
}

impl Builtin {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "cd" => Some(Self::Cd),
            "pwd" => Some(Self::Pwd),
            "exit" => Some(Self::Exit),
            "clear" => Some(Self::Clear),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassificationPolicy {
    /// Line starts with a built-in name; `cdx` counts as `cd`.
    #[default]
    Prefix,
    /// First whitespace token equals a built-in name.
    ExactToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// `arg` is the trimmed remainder after the first token, if any.
    Builtin { builtin: Builtin, arg: Option<String> },
    External { argv: Vec<String> },
}

pub fn classify(text: &str, policy: ClassificationPolicy) -> Classification {
    let text = text.trim();
    let (head, rest) = match text.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (text, ""),
    };

    let builtin = match policy {
        ClassificationPolicy::Prefix => BUILTIN_NAMES
            .into_iter()
            .find(|name| text.starts_with(name))
            .and_then(Builtin::from_name),
        ClassificationPolicy::ExactToken => Builtin::from_name(head),
    };

    match builtin {
        Some(builtin) => Classification::Builtin {
            builtin,
            arg: (!rest.is_empty()).then(|| rest.to_string()),
        },
        None => Classification::External {
            argv: split_whitespace(text),
        },
    }
}

/// Whether a line is routed to a built-in under `policy`.
pub fn is_builtin(text: &str, policy: ClassificationPolicy) -> bool {
    matches!(classify(text, policy), Classification::Builtin { .. })
}

/// Naive tokenizer: no quoting, escaping or globbing.
pub fn split_whitespace(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin(text: &str) -> (Builtin, Option<String>) {
        match classify(text, ClassificationPolicy::Prefix) {
            Classification::Builtin { builtin, arg } => (builtin, arg),
            other => panic!("expected builtin, got {:?}", other),
        }
    }

    #[test]
    fn test_builtins_are_recognised() {
        assert_eq!(builtin("pwd"), (Builtin::Pwd, None));
        assert_eq!(builtin("exit"), (Builtin::Exit, None));
        assert_eq!(builtin("clear"), (Builtin::Clear, None));
        assert_eq!(builtin("cd"), (Builtin::Cd, None));
    }

    #[test]
    fn test_cd_argument_is_remainder() {
        assert_eq!(builtin("cd   /tmp  "), (Builtin::Cd, Some("/tmp".to_string())));
        assert_eq!(
            builtin("cd my dir"),
            (Builtin::Cd, Some("my dir".to_string()))
        );
    }

    #[test]
    fn test_prefix_policy_matches_cdx() {
        assert_eq!(builtin("cdx foo"), (Builtin::Cd, Some("foo".to_string())));
        assert_eq!(builtin("pwdx"), (Builtin::Pwd, None));
    }

    #[test]
    fn test_exact_token_policy_rejects_cdx() {
        let result = classify("cdx foo", ClassificationPolicy::ExactToken);
        assert_eq!(
            result,
            Classification::External {
                argv: vec!["cdx".to_string(), "foo".to_string()]
            }
        );
        assert!(is_builtin("cd foo", ClassificationPolicy::ExactToken));
    }

    #[test]
    fn test_external_splits_on_whitespace_only() {
        let result = classify(r#"echo "a b""#, ClassificationPolicy::Prefix);
        assert_eq!(
            result,
            Classification::External {
                argv: vec!["echo".into(), "\"a".into(), "b\"".into()]
            }
        );
    }

    #[test]
    fn test_natural_language_is_external() {
        assert!(!is_builtin("list the files here", ClassificationPolicy::Prefix));
    }
}
