//! Interactive prompting.
//!
//! The wizard talks to the user exclusively through the [`Prompt`] trait,
//! which keeps the interactive boundary mockable in tests. The stdin
//! implementation prints `Label: ` (or `Label (default): `) and reads one
//! trimmed line; interpretation of empty input is left to the caller.

use std::io::{self, Write};

/// One field of a multi-field prompt, with the default shown inline.
#[derive(Debug, Clone)]
pub struct PromptField {
    pub label: String,
    pub default: String,
}

impl PromptField {
    pub fn new(label: &str, default: &str) -> Self {
        Self {
            label: label.to_string(),
            default: default.to_string(),
        }
    }
}

/// The wizard's interactive boundary: line input plus user-facing output.
pub trait Prompt {
    /// Ask for one line of input; returns the trimmed answer, which may
    /// be empty.
    fn input(&mut self, label: &str) -> io::Result<String>;

    /// Print a user-facing message.
    fn say(&mut self, message: &str);

    /// Yes/no confirmation defaulting to yes: empty input or anything
    /// starting with `y`/`Y` confirms, everything else declines.
    fn confirm_default_yes(&mut self, label: &str) -> io::Result<bool> {
        let answer = self.input(&format!("{} (y)", label))?;
        Ok(answer.is_empty() || answer.to_lowercase().starts_with('y'))
    }

    /// Ask a group of related questions in one pass, returning one answer
    /// per field in order.
    fn multi(&mut self, fields: &[PromptField]) -> io::Result<Vec<String>> {
        fields
            .iter()
            .map(|field| self.input(&format!("{} ({})", field.label, field.default)))
            .collect()
    }
}

/// Prompt implementation over stdin/stdout.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl StdinPrompt {
    pub fn new() -> Self {
        Self
    }
}

impl Prompt for StdinPrompt {
    fn input(&mut self, label: &str) -> io::Result<String> {
        print!("{}: ", label);
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn say(&mut self, message: &str) {
        println!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedPrompt;
    use pretty_assertions::assert_eq;

    #[test]
    fn confirm_default_yes_accepts_empty_and_y_answers() {
        let mut prompt = ScriptedPrompt::new(&["", "y", "Yes", "n", "no", "q"]);
        assert!(prompt.confirm_default_yes("Use this").unwrap());
        assert!(prompt.confirm_default_yes("Use this").unwrap());
        assert!(prompt.confirm_default_yes("Use this").unwrap());
        assert!(!prompt.confirm_default_yes("Use this").unwrap());
        assert!(!prompt.confirm_default_yes("Use this").unwrap());
        assert!(!prompt.confirm_default_yes("Use this").unwrap());
    }

    #[test]
    fn multi_returns_one_answer_per_field() {
        let mut prompt = ScriptedPrompt::new(&["custom.nut", ""]);
        let answers = prompt
            .multi(&[
                PromptField::new("Device code file", "a.device.nut"),
                PromptField::new("Agent code file", "a.agent.nut"),
            ])
            .unwrap();
        assert_eq!(answers, vec!["custom.nut".to_string(), String::new()]);
    }
}
