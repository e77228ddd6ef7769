//! Operator-facing presentation and input
//!
//! The sequencer never prints or reads stdin itself. Everything the
//! operator sees or answers goes through a [`Console`], so the same run can
//! drive a styled terminal or a scripted transcript.

use std::collections::VecDeque;
use std::time::Duration;

use vmac_protocol::AtCommand;

use crate::dispatch::CommandResult;
use crate::error::SessionError;
use crate::sequencer::Step;

/// Emphasis of a console message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Info,
    Success,
    Warning,
    Error,
}

/// Presentation and operator input for a provisioning run
pub trait Console {
    /// A new numbered step begins
    fn step(&mut self, step: Step);

    /// Show a message
    fn say(&mut self, tone: Tone, text: &str);

    /// Show one line of device output as it arrives
    fn device_line(&mut self, line: &str);

    /// A command is about to be sent
    fn command_sent(&mut self, command: &AtCommand, settle: Duration);

    /// Show the outcome of a command exchange
    fn command_result(&mut self, result: &CommandResult);

    /// Prompt and return one line of operator input, without the newline
    fn ask(&mut self, prompt: &str) -> Result<String, SessionError>;

    fn info(&mut self, text: &str) {
        self.say(Tone::Info, text);
    }

    fn success(&mut self, text: &str) {
        self.say(Tone::Success, text);
    }

    fn warning(&mut self, text: &str) {
        self.say(Tone::Warning, text);
    }

    fn error(&mut self, text: &str) {
        self.say(Tone::Error, text);
    }

    fn plain(&mut self, text: &str) {
        self.say(Tone::Plain, text);
    }
}

/// Console fed from a fixed list of answers, recording everything shown
///
/// Used for unattended runs against the simulated tracker. Running out of
/// answers behaves like a closed input stream.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    transcript: Vec<String>,
    prompts: Vec<String>,
}

impl ScriptedConsole {
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

    /// Everything shown, one entry per call
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Prompts asked, in order
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Whether any transcript entry contains `needle`
    pub fn shows(&self, needle: &str) -> bool {
        self.transcript.iter().any(|l| l.contains(needle))
    }
}

impl Console for ScriptedConsole {
    fn step(&mut self, step: Step) {
        self.transcript
            .push(format!("== {}. {}", step.number(), step.title()));
    }

    fn say(&mut self, tone: Tone, text: &str) {
        self.transcript.push(format!("[{tone:?}] {text}"));
    }

    fn device_line(&mut self, line: &str) {
        self.transcript.push(format!("<< {line}"));
    }

    fn command_sent(&mut self, command: &AtCommand, _settle: Duration) {
        self.transcript.push(format!(">> {command}"));
    }

    fn command_result(&mut self, result: &CommandResult) {
        if result.is_no_response() {
            self.transcript.push("(no response)".to_string());
        }
        for line in result.at_lines().iter().chain(result.log_lines()) {
            self.transcript.push(format!("<< {line}"));
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<String, SessionError> {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| SessionError::Unexpected("operator input closed".to_string()))
    }
}
