// ABOUTME: Prompt/print capability threaded through the menu and settings setup
// ABOUTME: Terminal implementation uses dialoguer; scripted implementation replays canned input

use dialoguer::{theme::ColorfulTheme, Input, Password};
use std::collections::VecDeque;
use std::io;

/// Line-oriented user interaction.
///
/// Every read blocks until the user answers. Implementations return
/// `UnexpectedEof` once no more input can arrive.
pub trait Console {
    /// Ask for one line of input. Empty answers are allowed.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    /// Ask for input that should not be echoed (passwords).
    fn read_secret(&mut self, prompt: &str) -> io::Result<String>;

    fn write_line(&mut self, line: &str) -> io::Result<()>;

    fn clear(&mut self) -> io::Result<()>;
}

/// Console bound to the process stdin/stdout.
pub struct TerminalConsole {
    theme: ColorfulTheme,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

fn dialoguer_io(err: dialoguer::Error) -> io::Error {
    match err {
        dialoguer::Error::IO(e) => e,
    }
}

impl Console for TerminalConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(dialoguer_io)
    }

    fn read_secret(&mut self, prompt: &str) -> io::Result<String> {
        Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(dialoguer_io)
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        println!("{}", line);
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        // ANSI: erase display, cursor home
        print!("\x1B[2J\x1B[1;1H");
        Ok(())
    }
}

/// Console that answers prompts from a fixed script and records everything
/// written to it.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    prompts: Vec<String>,
    output: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Prompts shown so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Lines written so far, in order.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn remaining_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// True when any written line contains `needle`.
    pub fn printed(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }

    fn next_input(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        self.inputs.pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("script exhausted at prompt '{}'", prompt),
            )
        })
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.next_input(prompt)
    }

    fn read_secret(&mut self, prompt: &str) -> io::Result<String> {
        self.next_input(prompt)
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.output.push(line.to_string());
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_console_replays_in_order() {
        let mut console = ScriptedConsole::new(["a", "", "c"]);
        assert_eq!(console.read_line("first").unwrap(), "a");
        assert_eq!(console.read_secret("second").unwrap(), "");
        assert_eq!(console.read_line("third").unwrap(), "c");
        assert_eq!(console.prompts(), ["first", "second", "third"]);
        assert_eq!(console.remaining_inputs(), 0);
    }

    #[test]
    fn scripted_console_reports_eof_when_exhausted() {
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        let err = console.read_line("anything").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn scripted_console_records_output() {
        let mut console = ScriptedConsole::default();
        console.write_line("hello").unwrap();
        console.write_line("world").unwrap();
        assert!(console.printed("wor"));
        assert!(!console.printed("missing"));
        assert_eq!(console.output().len(), 2);
    }
}
