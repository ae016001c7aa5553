//! Operator prompt abstraction

use nodeup_errors::Error;

/// Interactive console used to collect operator input.
///
/// Prompts are blocking and are never issued concurrently. Implementations
/// show `default` and return it when the operator submits an empty answer.
pub trait Prompter {
    /// Read a free-form line
    ///
    /// # Errors
    ///
    /// Returns an error if the console cannot be read.
    fn read_string(&mut self, prompt: &str, default: &str) -> Result<String, Error>;

    /// Read a yes/no answer
    ///
    /// # Errors
    ///
    /// Returns an error if the console cannot be read.
    fn read_bool(&mut self, prompt: &str, default: bool) -> Result<bool, Error>;
}
