//! Keyboard selection mode.
//!
//! The selection state is an owned [`KeyboardState`]; each key press is a
//! pure transition on it and each frame is a pure rendering of it. Only
//! [`TerminalKeys`] touches the real terminal.

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, ExecutableCommand, QueueableCommand};
use std::collections::BTreeSet;
use std::io::{self, Write};

/// Terminal height assumed when it cannot be detected
pub const DEFAULT_TERMINAL_HEIGHT: usize = 24;

/// Rows kept free for header, rules, indicators and the status line
const RESERVED_ROWS: usize = 8;

const RULE: &str =
    "─────────────────────────────────────────────────────────────────────────────";

/// A key press, as far as selection cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Toggle,
    SelectAll,
    SelectNone,
    Confirm,
    Cancel,
    Other,
}

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
            return Key::Cancel;
        }
        match event.code {
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Char(' ') => Key::Toggle,
            KeyCode::Enter => Key::Confirm,
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Key::Cancel,
            KeyCode::Char('a') | KeyCode::Char('A') => Key::SelectAll,
            KeyCode::Char('n') | KeyCode::Char('N') => Key::SelectNone,
            _ => Key::Other,
        }
    }
}

/// A screen that delivers key presses and shows frames
pub trait KeyTerminal {
    /// Block until the next key press
    fn read_key(&mut self) -> Result<Key>;

    /// Rows available for drawing
    fn height(&self) -> usize;

    /// Replace the screen contents with `lines`
    fn draw(&mut self, lines: &[String]) -> Result<()>;
}

/// Outcome of a single key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Keep reading keys
    Continue,
    /// Selection confirmed; indices ascending
    Confirmed(Vec<usize>),
    /// Operator quit; nothing selected
    Cancelled,
}

/// Highlight position and selected indices over `count` candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardState {
    count: usize,
    highlight: usize,
    selected: BTreeSet<usize>,
}

impl KeyboardState {
    /// Nothing selected, first candidate highlighted
    pub fn new(count: usize) -> Self {
        KeyboardState {
            count,
            highlight: 0,
            selected: BTreeSet::new(),
        }
    }

    pub fn highlight(&self) -> usize {
        self.highlight
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Apply one key press
    pub fn apply(&mut self, key: Key) -> Transition {
        if self.count == 0 {
            return match key {
                Key::Confirm => Transition::Confirmed(Vec::new()),
                Key::Cancel => Transition::Cancelled,
                _ => Transition::Continue,
            };
        }

        match key {
            Key::Up => {
                self.highlight = if self.highlight == 0 {
                    self.count - 1
                } else {
                    self.highlight - 1
                };
            }
            Key::Down => {
                self.highlight = (self.highlight + 1) % self.count;
            }
            Key::Toggle => {
                if !self.selected.remove(&self.highlight) {
                    self.selected.insert(self.highlight);
                }
            }
            Key::SelectAll => self.selected = (0..self.count).collect(),
            Key::SelectNone => self.selected.clear(),
            Key::Confirm => return Transition::Confirmed(self.selected.iter().copied().collect()),
            Key::Cancel => return Transition::Cancelled,
            Key::Other => {}
        }
        Transition::Continue
    }
}

/// Half-open range of candidate indices visible in a viewport of `max_visible` rows
///
/// The window is centered on `highlight` and clamped to both ends of the list.
pub fn visible_window(count: usize, highlight: usize, max_visible: usize) -> (usize, usize) {
    let max_visible = max_visible.max(1);
    if count <= max_visible {
        return (0, count);
    }

    let start = highlight
        .saturating_sub(max_visible / 2)
        .min(count - max_visible);
    (start, start + max_visible)
}

/// Render one frame for a terminal of `height` rows
pub fn render(candidates: &[String], state: &KeyboardState, height: usize) -> Vec<String> {
    let max_visible = height.saturating_sub(RESERVED_ROWS).max(1);
    let (start, end) = visible_window(candidates.len(), state.highlight, max_visible);

    let mut lines = Vec::with_capacity(end - start + 6);
    lines.push("📁 Select files to sync".to_string());
    lines.push(RULE.to_string());

    for (index, path) in candidates.iter().enumerate().take(end).skip(start) {
        let pointer = if index == state.highlight { "▶" } else { " " };
        let mark = if state.is_selected(index) { "✓" } else { " " };
        lines.push(format!("{pointer} {mark} {path}"));
    }

    if start > 0 {
        lines.push("... ↑ more files above ↑ ...".to_string());
    }
    if end < candidates.len() {
        lines.push("... ↓ more files below ↓ ...".to_string());
    }

    lines.push(RULE.to_string());
    lines.push("↑/↓ move  Space toggle  a all  n none  Enter confirm  Esc/q cancel".to_string());
    lines.push(format!(
        "Selected: {}/{} files",
        state.selected_count(),
        candidates.len()
    ));
    lines
}

/// Run keyboard selection until confirm or cancel
///
/// Returns the selected indices in ascending order; cancelling selects nothing.
pub fn run(candidates: &[String], terminal: &mut dyn KeyTerminal) -> Result<Vec<usize>> {
    let mut state = KeyboardState::new(candidates.len());

    loop {
        terminal.draw(&render(candidates, &state, terminal.height()))?;

        match state.apply(terminal.read_key()?) {
            Transition::Continue => {}
            Transition::Confirmed(indices) => {
                log::debug!("Keyboard selection confirmed {} file(s)", indices.len());
                return Ok(indices);
            }
            Transition::Cancelled => {
                log::debug!("Keyboard selection cancelled");
                return Ok(Vec::new());
            }
        }
    }
}

/// Raw-mode terminal on stdout; restored when dropped
pub struct TerminalKeys {
    out: io::Stdout,
}

impl TerminalKeys {
    /// Enter raw mode on the alternate screen
    pub fn open() -> Result<Self> {
        terminal::enable_raw_mode().context("Failed to initialize keyboard input")?;

        let mut out = io::stdout();
        let entered = out
            .execute(EnterAlternateScreen)
            .and_then(|out| out.execute(cursor::Hide))
            .map(|_| ());
        if let Err(e) = entered {
            let _ = terminal::disable_raw_mode();
            return Err(e).context("Failed to switch to the alternate screen");
        }

        Ok(TerminalKeys { out })
    }
}

impl KeyTerminal for TerminalKeys {
    fn read_key(&mut self) -> Result<Key> {
        loop {
            match event::read().context("Keyboard input error")? {
                Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(Key::from(key)),
                _ => continue,
            }
        }
    }

    fn height(&self) -> usize {
        terminal::size()
            .map(|(_, rows)| rows as usize)
            .ok()
            .filter(|rows| *rows > 0)
            .unwrap_or(DEFAULT_TERMINAL_HEIGHT)
    }

    fn draw(&mut self, lines: &[String]) -> Result<()> {
        self.out
            .queue(cursor::MoveTo(0, 0))?
            .queue(Clear(ClearType::All))?;
        for line in lines {
            // Raw mode does not translate \n into a carriage return
            write!(self.out, "{line}\r\n")?;
        }
        self.out.flush().context("Failed to draw selection")?;
        Ok(())
    }
}

impl Drop for TerminalKeys {
    fn drop(&mut self) {
        let _ = self.out.execute(cursor::Show);
        let _ = self.out.execute(LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::ScriptedKeys;

    fn files(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("file{i:02}.txt")).collect()
    }

    #[test]
    fn test_movement_wraps_both_ends() {
        let mut state = KeyboardState::new(3);

        state.apply(Key::Up);
        assert_eq!(state.highlight(), 2);
        state.apply(Key::Down);
        assert_eq!(state.highlight(), 0);
        state.apply(Key::Down);
        assert_eq!(state.highlight(), 1);
    }

    #[test]
    fn test_toggle_and_confirm_ascending() {
        let mut state = KeyboardState::new(4);

        state.apply(Key::Down);
        state.apply(Key::Down);
        state.apply(Key::Toggle);
        state.apply(Key::Up);
        state.apply(Key::Up);
        state.apply(Key::Toggle);

        assert_eq!(state.apply(Key::Confirm), Transition::Confirmed(vec![0, 2]));
    }

    #[test]
    fn test_toggle_twice_deselects() {
        let mut state = KeyboardState::new(2);
        state.apply(Key::Toggle);
        state.apply(Key::Toggle);
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn test_select_all_then_none() {
        let mut state = KeyboardState::new(3);

        state.apply(Key::SelectAll);
        assert_eq!(state.selected_count(), 3);
        state.apply(Key::SelectNone);
        assert_eq!(state.apply(Key::Confirm), Transition::Confirmed(Vec::new()));
    }

    #[test]
    fn test_cancel_and_other_keys() {
        let mut state = KeyboardState::new(3);
        assert_eq!(state.apply(Key::Other), Transition::Continue);
        assert_eq!(state.apply(Key::Cancel), Transition::Cancelled);
    }

    #[test]
    fn test_window_covers_short_list() {
        assert_eq!(visible_window(5, 4, 16), (0, 5));
    }

    #[test]
    fn test_window_centered_and_clamped() {
        assert_eq!(visible_window(100, 0, 10), (0, 10));
        assert_eq!(visible_window(100, 50, 10), (45, 55));
        assert_eq!(visible_window(100, 99, 10), (90, 100));
    }

    #[test]
    fn test_render_shows_indicators_when_scrolled() {
        let candidates = files(40);
        let mut state = KeyboardState::new(candidates.len());
        for _ in 0..20 {
            state.apply(Key::Down);
        }
        state.apply(Key::Toggle);

        let lines = render(&candidates, &state, 24);

        assert!(lines.iter().any(|l| l.contains("more files above")));
        assert!(lines.iter().any(|l| l.contains("more files below")));
        assert!(lines.iter().any(|l| l == "▶ ✓ file21.txt"));
        assert!(lines.len() <= 24);
        assert_eq!(lines.last().unwrap(), "Selected: 1/40 files");
    }

    #[test]
    fn test_render_without_indicators_when_everything_fits() {
        let candidates = files(3);
        let state = KeyboardState::new(3);
        let lines = render(&candidates, &state, 24);

        assert!(!lines.iter().any(|l| l.contains("more files")));
        assert!(lines.contains(&"▶   file01.txt".to_string()));
    }

    #[test]
    fn test_run_with_scripted_keys() {
        let candidates = files(3);
        let mut terminal = ScriptedKeys::new(
            [Key::Down, Key::Toggle, Key::Down, Key::Toggle, Key::Confirm],
            24,
        );

        let indices = run(&candidates, &mut terminal).unwrap();

        assert_eq!(indices, vec![1, 2]);
        assert_eq!(terminal.frames.len(), 5);
    }

    #[test]
    fn test_run_cancel_selects_nothing() {
        let candidates = files(3);
        let mut terminal = ScriptedKeys::new([Key::SelectAll, Key::Cancel], 24);
        assert!(run(&candidates, &mut terminal).unwrap().is_empty());
    }

    #[test]
    fn test_key_mapping() {
        let key = |code| Key::from(KeyEvent::new(code, KeyModifiers::NONE));

        assert_eq!(key(KeyCode::Up), Key::Up);
        assert_eq!(key(KeyCode::Char(' ')), Key::Toggle);
        assert_eq!(key(KeyCode::Enter), Key::Confirm);
        assert_eq!(key(KeyCode::Esc), Key::Cancel);
        assert_eq!(key(KeyCode::Char('q')), Key::Cancel);
        assert_eq!(key(KeyCode::Char('A')), Key::SelectAll);
        assert_eq!(key(KeyCode::Char('n')), Key::SelectNone);
        assert_eq!(key(KeyCode::Char('x')), Key::Other);
        assert_eq!(
            Key::from(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Key::Cancel
        );
    }
}
