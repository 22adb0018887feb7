use std::sync::mpsc::Sender;

use tokio::runtime::Handle;

use crate::api::StudioClient;
use crate::models::RefinementEvent;

/// Server outcome of one refinement, with the error already rendered for the chat
pub type RefinementOutcome = Result<RefinementEvent, String>;

/// Source of refinement results for the studio (allows faking the backend in tests)
pub trait RefinementBackend {
    /// Start refining `question_id` in the background.
    ///
    /// Exactly one outcome must be sent on `reply`. The UI loop polls the receiving end, so
    /// this must not block.
    fn submit(&self, question_id: &str, instruction: &str, reply: Sender<RefinementOutcome>);
}

/// Runs refinements against the real backend on a tokio runtime
pub struct ClientBackend {
    client: StudioClient,
    runtime: Handle,
}

impl ClientBackend {
    pub fn new(client: StudioClient, runtime: Handle) -> Self {
        Self { client, runtime }
    }
}

impl RefinementBackend for ClientBackend {
    fn submit(&self, question_id: &str, instruction: &str, reply: Sender<RefinementOutcome>) {
        let client = self.client.clone();
        let question_id = question_id.to_string();
        let instruction = instruction.to_string();

        self.runtime.spawn(async move {
            let outcome = client.refine(&question_id, &instruction).await.map_err(|e| e.to_string());
            // The receiver is gone if the user quit while waiting
            let _ = reply.send(outcome);
        });
    }
}
