//! Terminal prompts

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use nodeup_errors::{Error, InstallError};
use nodeup_install::Prompter;

/// Prompter reading answers from the controlling terminal
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

fn prompt_error(err: &dialoguer::Error) -> Error {
    InstallError::PromptFailed {
        message: err.to_string(),
    }
    .into()
}

impl Prompter for DialoguerPrompter {
    fn read_string(&mut self, prompt: &str, default: &str) -> Result<String, Error> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        // An empty default would render as "()"
        if !default.is_empty() {
            input = input.default(default.to_string());
        }

        let answer = input.interact_text().map_err(|e| prompt_error(&e))?;
        Ok(answer.trim().to_string())
    }

    fn read_bool(&mut self, prompt: &str, default: bool) -> Result<bool, Error> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(|e| prompt_error(&e))
    }
}
