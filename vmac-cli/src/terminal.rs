//! Styled terminal console
//!
//! Prompts are answered from stdin, read on a helper thread so that a
//! pending prompt still notices Ctrl-C.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use console::Style;
use vmac_protocol::AtCommand;
use vmac_session::{CommandResult, Console, InterruptFlag, SessionError, Step, Tone};

/// How often a pending prompt checks for an interrupt
const INPUT_POLL: Duration = Duration::from_millis(50);

/// One event from the stdin reader: a line, end of input, or a read failure
type InputEvent = io::Result<Option<String>>;

pub struct TerminalConsole {
    input: Receiver<InputEvent>,
    interrupt: InterruptFlag,
}

impl TerminalConsole {
    pub fn new(interrupt: InterruptFlag) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = io::stdin();
            let mut lock = stdin.lock();
            loop {
                let mut line = String::new();
                let event = match lock.read_line(&mut line) {
                    Ok(0) => Ok(None),
                    Ok(_) => Ok(Some(line)),
                    Err(e) => Err(e),
                };
                let done = !matches!(event, Ok(Some(_)));
                if tx.send(event).is_err() || done {
                    break;
                }
            }
        });
        Self {
            input: rx,
            interrupt,
        }
    }

    fn print(&self, text: impl std::fmt::Display) {
        println!("{text}");
    }
}

impl Console for TerminalConsole {
    fn step(&mut self, step: Step) {
        let rule = Style::new().dim().apply_to("-".repeat(50));
        println!();
        self.print(&rule);
        self.print(
            Style::new()
                .bold()
                .cyan()
                .apply_to(format!("[{}] {}", step.number(), step.title())),
        );
        self.print(&rule);
    }

    fn say(&mut self, tone: Tone, text: &str) {
        match tone {
            Tone::Plain => self.print(text),
            Tone::Info => self.print(Style::new().cyan().apply_to(format!("i {text}"))),
            Tone::Success => self.print(Style::new().green().apply_to(format!("+ {text}"))),
            Tone::Warning => self.print(Style::new().yellow().apply_to(format!("! {text}"))),
            Tone::Error => self.print(Style::new().red().bold().apply_to(format!("x {text}"))),
        }
    }

    fn device_line(&mut self, line: &str) {
        self.print(format!("  {} {line}", Style::new().dim().apply_to("[log]")));
    }

    fn command_sent(&mut self, command: &AtCommand, settle: Duration) {
        self.print(format!(
            "{} {}",
            Style::new().bold().apply_to("Sending:"),
            Style::new().yellow().apply_to(command)
        ));
        self.print(
            Style::new()
                .dim()
                .apply_to(format!("  {} (waiting {}s)", command.description(), settle.as_secs())),
        );
    }

    fn command_result(&mut self, result: &CommandResult) {
        if result.is_no_response() {
            self.print(Style::new().yellow().apply_to("  (no response)"));
            return;
        }
        if !result.at_lines().is_empty() {
            self.print(Style::new().bold().apply_to("AT response:"));
            for line in result.at_lines() {
                self.print(Style::new().green().apply_to(format!("  {line}")));
            }
        }
        if !result.log_lines().is_empty() {
            self.print(Style::new().bold().apply_to("Device log:"));
            for line in result.log_lines() {
                self.print(Style::new().dim().apply_to(format!("  {line}")));
            }
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<String, SessionError> {
        print!("{}", Style::new().bold().apply_to(prompt));
        io::stdout().flush()?;

        loop {
            self.interrupt.check()?;
            match self.input.recv_timeout(INPUT_POLL) {
                Ok(Ok(Some(line))) => return Ok(line.trim_end_matches(['\r', '\n']).to_string()),
                Ok(Ok(None)) | Err(RecvTimeoutError::Disconnected) => {
                    return Err(SessionError::Unexpected("operator input closed".to_string()))
                }
                Ok(Err(e)) => return Err(e.into()),
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
    }
}
