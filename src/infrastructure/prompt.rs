//! Operator confirmation prompt

use std::io::{self, BufRead, Write};

use crate::error::{AppError, AppResult};

const INVALID_ANSWER_HINT: &str = "Please answer yes, y, no, or n.\n";

/// Name used for the operator's input stream in error messages
const OPERATOR_INPUT: &str = "<stdin>";

/// Source of yes/no decisions from the operator
pub trait ConfirmationProvider {
    /// Ask `question` and return `true` for yes, `false` for no
    fn confirm(&mut self, question: &str) -> AppResult<bool>;
}

/// Answers accepted at the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    /// Parse `yes`, `y`, `no`, `n` in any case; anything else is `None`
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "yes" | "y" => Some(Answer::Yes),
            "no" | "n" => Some(Answer::No),
            _ => None,
        }
    }
}

/// Line-oriented prompt that repeats the question until it gets a valid answer
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LinePrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's standard input and output
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    fn show(&mut self, text: &str) {
        if let Err(e) = self.output.write_all(text.as_bytes()).and_then(|_| self.output.flush()) {
            tracing::warn!(error = %e, "Failed to write prompt output");
        }
    }
}

impl<R: BufRead, W: Write> ConfirmationProvider for LinePrompt<R, W> {
    fn confirm(&mut self, question: &str) -> AppResult<bool> {
        let mut line = String::new();
        loop {
            self.show(&format!("{} (yes/no): ", question));

            line.clear();
            let read = match self.input.read_line(&mut line) {
                Ok(read) => read,
                // The bad line is consumed, so asking again reads the next one
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    tracing::debug!(error = %e, "Operator input is not valid text");
                    self.show(INVALID_ANSWER_HINT);
                    continue;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read operator input");
                    return Err(AppError::file_access(OPERATOR_INPUT, e));
                }
            };

            // End of input can never produce a valid answer
            if read == 0 {
                tracing::warn!("Operator input closed, treating as no");
                return Ok(false);
            }

            match Answer::parse(&line) {
                Some(answer) => return Ok(answer == Answer::Yes),
                None => {
                    tracing::debug!(input = line.trim(), "Invalid confirmation answer");
                    self.show(INVALID_ANSWER_HINT);
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod canned {
    use super::*;
    use std::collections::VecDeque;

    /// Replays a fixed sequence of decisions and records the questions asked
    #[derive(Default)]
    pub struct CannedAnswers {
        answers: VecDeque<bool>,
        pub questions: Vec<String>,
    }

    impl CannedAnswers {
        pub fn new(answers: &[bool]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                questions: Vec::new(),
            }
        }
    }

    impl ConfirmationProvider for CannedAnswers {
        fn confirm(&mut self, question: &str) -> AppResult<bool> {
            self.questions.push(question.to_string());
            Ok(self.answers.pop_front().expect("unexpected confirmation prompt"))
        }
    }
}
