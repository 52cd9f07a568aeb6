//! Terminal prompts
//!
//! The session talks to the operator only through [`Prompt`], so the flow
//! can be driven by a script in tests.

use std::io;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};

pub trait Prompt {
    /// Free-text answer, trimmed
    fn text(&mut self, label: &str) -> io::Result<String>;

    /// Hidden answer
    fn secret(&mut self, label: &str) -> io::Result<String>;

    /// Yes/no question
    fn confirm(&mut self, label: &str) -> io::Result<bool>;

    /// Index into `items`
    fn choose(&mut self, label: &str, items: &[String]) -> io::Result<usize>;

    /// Informational line for the operator
    fn say(&mut self, message: &str);
}

/// Interactive prompts on the controlling terminal
pub struct TerminalPrompt {
    theme: ColorfulTheme,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

fn input_error(e: dialoguer::Error) -> io::Error {
    io::Error::other(e)
}

impl Prompt for TerminalPrompt {
    fn text(&mut self, label: &str) -> io::Result<String> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(label)
            .allow_empty(true)
            .interact_text()
            .map_err(input_error)?;
        Ok(answer.trim().to_string())
    }

    fn secret(&mut self, label: &str) -> io::Result<String> {
        Password::with_theme(&self.theme)
            .with_prompt(label)
            .allow_empty_password(true)
            .interact()
            .map_err(input_error)
    }

    fn confirm(&mut self, label: &str) -> io::Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(label)
            .default(false)
            .interact()
            .map_err(input_error)
    }

    fn choose(&mut self, label: &str, items: &[String]) -> io::Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(label)
            .items(items)
            .default(0)
            .interact()
            .map_err(input_error)
    }

    fn say(&mut self, message: &str) {
        println!("{message}");
    }
}
