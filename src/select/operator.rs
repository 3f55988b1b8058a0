use anyhow::{bail, Context, Result};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use super::keyboard::{Key, KeyTerminal, TerminalKeys};

/// Source of operator decisions: typed lines and, when available, key presses
pub trait Operator {
    /// Show `prompt` and read one line, without its trailing newline
    ///
    /// Returns `None` once input is exhausted.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Open a key-press terminal for keyboard mode
    ///
    /// Returns `None` when no interactive terminal is attached.
    fn keyboard(&mut self) -> Result<Option<Box<dyn KeyTerminal>>>;
}

/// Check if we're running in an interactive terminal
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}

/// Operator at the process's own terminal
#[derive(Debug, Default)]
pub struct TerminalOperator;

impl TerminalOperator {
    pub fn new() -> Self {
        TerminalOperator
    }
}

impl Operator for TerminalOperator {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{prompt}");
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;

        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn keyboard(&mut self) -> Result<Option<Box<dyn KeyTerminal>>> {
        if !is_interactive() {
            return Ok(None);
        }
        Ok(Some(Box::new(TerminalKeys::open()?)))
    }
}

/// Operator replaying a fixed script of lines and key presses
///
/// Used to drive the selector without a terminal.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    lines: VecDeque<String>,
    keys: Option<Vec<Key>>,
    /// Height reported by the scripted key terminal
    pub height: usize,
    /// Every prompt shown, in order
    pub prompts: Vec<String>,
}

impl ScriptedOperator {
    /// Script typed lines only; keyboard mode reports no terminal
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        ScriptedOperator {
            lines: lines.into_iter().map(Into::into).collect(),
            keys: None,
            height: super::keyboard::DEFAULT_TERMINAL_HEIGHT,
            prompts: Vec::new(),
        }
    }

    /// Also script the key presses delivered once keyboard mode opens
    pub fn with_keys(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.keys = Some(keys.into_iter().collect());
        self
    }

    /// Lines not yet consumed
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl Operator for ScriptedOperator {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }

    fn keyboard(&mut self) -> Result<Option<Box<dyn KeyTerminal>>> {
        Ok(self
            .keys
            .take()
            .map(|keys| Box::new(ScriptedKeys::new(keys, self.height)) as Box<dyn KeyTerminal>))
    }
}

/// Key terminal replaying scripted key presses
#[derive(Debug)]
pub struct ScriptedKeys {
    keys: VecDeque<Key>,
    height: usize,
    /// Every frame drawn, in order
    pub frames: Vec<Vec<String>>,
}

impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = Key>, height: usize) -> Self {
        ScriptedKeys {
            keys: keys.into_iter().collect(),
            height,
            frames: Vec::new(),
        }
    }
}

impl KeyTerminal for ScriptedKeys {
    fn read_key(&mut self) -> Result<Key> {
        match self.keys.pop_front() {
            Some(key) => Ok(key),
            None => bail!("Key script exhausted before selection finished"),
        }
    }

    fn height(&self) -> usize {
        self.height
    }

    fn draw(&mut self, lines: &[String]) -> Result<()> {
        self.frames.push(lines.to_vec());
        Ok(())
    }
}
