use std::io;

use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

type StudioTerminal = Terminal<CrosstermBackend<io::Stdout>>;

/// Owns raw mode and the alternate screen while the studio runs
///
/// The shell gets its screen back exactly once: through [`TerminalManager::restore`] on a
/// normal exit, or from `Drop` when the studio loop bails out or panics.
pub struct TerminalManager {
    terminal: StudioTerminal,
    active: bool,
}

impl TerminalManager {
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode (is stdout a terminal?)")?;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e).context("Failed to enter the alternate screen");
        }

        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(Self { terminal, active: true }),
            Err(e) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                Err(e).context("Failed to set up the studio screen")
            }
        }
    }

    pub fn terminal_mut(&mut self) -> &mut StudioTerminal {
        &mut self.terminal
    }

    /// Hand the screen back to the shell; later calls are no-ops
    pub fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        leave_studio_screen(&mut self.terminal).context("Failed to restore the terminal")
    }
}

fn leave_studio_screen(terminal: &mut StudioTerminal) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

impl Drop for TerminalManager {
    fn drop(&mut self) {
        if self.active {
            let _ = leave_studio_screen(&mut self.terminal);
        }
    }
}
