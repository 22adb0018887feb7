//! Interactive refinement studio
mod app;
mod backend;
mod events;
mod layout;
mod rendering;
mod terminal;

use anyhow::Result;
pub use app::{MessageType, QUICK_ACTIONS, StatusMessage, StudioApp};
pub use backend::{ClientBackend, RefinementBackend, RefinementOutcome};
use terminal::TerminalManager;

use crate::timeline::Timeline;

/// Run the studio for an already-loaded timeline until the user quits
pub fn run_studio(timeline: Timeline, backend: Box<dyn RefinementBackend>) -> Result<()> {
    let mut manager = TerminalManager::new()?;
    let mut app = StudioApp::new(timeline, backend);

    let res = app.run(manager.terminal_mut());

    manager.restore()?;
    res
}
