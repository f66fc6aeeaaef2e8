//! Prompter trait and helpers

use crate::error::Result;

/// Synchronous question/answer channel
///
/// Implementations decide where questions are written and answers come
/// from; the builder only relies on the three behaviours below:
/// prompt suppression (`prompt` may write nothing), auto-accepting
/// defaults (`assume_yes`) and re-asking until valid ([`ask_until`]).
pub trait Prompter {
    /// Show informational text
    fn prompt(&mut self, message: &str);

    /// Report a recoverable problem with an answer
    ///
    /// Non-interactive prompters fail instead, since nobody can correct
    /// the answer.
    fn warn(&mut self, message: &str) -> Result<()>;

    /// Whether questions with a default are answered without asking
    fn assume_yes(&self) -> bool;

    /// Block until the next answer is available
    fn next_answer(&mut self, query: &str) -> Result<String>;

    /// Ask a question, taking the default when `assume_yes` is active
    fn ask(&mut self, query: &str, default: Option<&str>) -> Result<String> {
        self.prompt(query);
        if let Some(default) = default {
            if self.assume_yes() {
                self.prompt("\n");
                return Ok(default.to_string());
            }
        }
        self.next_answer(query)
    }
}

/// Ask until `validate` accepts an answer
///
/// `validate` returns `Ok(Some(value))` to accept, `Ok(None)` to ask again
/// silently, or `Err(message)` to warn and ask again. A default is taken
/// without asking when the prompter or the caller assumes yes.
pub fn ask_until<P, T, F>(
    prompter: &mut P,
    query: &str,
    default: Option<T>,
    assume_yes: bool,
    mut validate: F,
) -> Result<T>
where
    P: Prompter + ?Sized,
    F: FnMut(&str) -> std::result::Result<Option<T>, String>,
{
    prompter.prompt(query);
    if let Some(default) = default {
        if assume_yes || prompter.assume_yes() {
            prompter.prompt("\n");
            return Ok(default);
        }
    }
    loop {
        let answer = prompter.next_answer(query)?;
        match validate(&answer) {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(message) => prompter.warn(&message)?,
        }
        prompter.prompt(query);
    }
}

/// Return `answer` when non-empty, otherwise ask until a non-empty answer
pub fn ask_when_empty<P>(prompter: &mut P, query: &str, answer: Option<&str>) -> Result<String>
where
    P: Prompter + ?Sized,
{
    if let Some(answer) = answer.filter(|a| !a.is_empty()) {
        return Ok(answer.to_string());
    }
    ask_until(prompter, query, None, false, |a| {
        let a = a.trim();
        Ok((!a.is_empty()).then(|| a.to_string()))
    })
}
