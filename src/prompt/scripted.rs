//! Prompter fed from a fixed list of answers

use super::types::Prompter;
use crate::error::{Error, Result};
use std::collections::VecDeque;

/// Prompter answering from a queue and recording every question
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    yes: bool,
    asked: Vec<String>,
    warnings: Vec<String>,
    output: String,
}

impl ScriptedPrompter {
    /// Answer questions in order from `answers`
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Accept every default; questions without one fail
    pub fn auto() -> Self {
        Self {
            yes: true,
            ..Default::default()
        }
    }

    /// Enable/disable auto-accepting defaults
    #[must_use]
    pub fn with_yes(mut self, yes: bool) -> Self {
        self.yes = yes;
        self
    }

    /// Questions asked so far, in order
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Warnings reported so far
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Everything written through `prompt`
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&mut self, message: &str) {
        self.output.push_str(message);
    }

    fn warn(&mut self, message: &str) -> Result<()> {
        self.warnings.push(message.to_string());
        Ok(())
    }

    fn assume_yes(&self) -> bool {
        self.yes
    }

    fn next_answer(&mut self, query: &str) -> Result<String> {
        self.answers.pop_front().ok_or_else(|| Error::PromptClosed {
            query: query.trim().to_string(),
        })
    }

    fn ask(&mut self, query: &str, default: Option<&str>) -> Result<String> {
        self.asked.push(query.to_string());
        self.prompt(query);
        match default {
            Some(default) if self.yes => Ok(default.to_string()),
            _ => self.next_answer(query),
        }
    }
}
