use std::sync::Arc;

use super::Tool;
use crate::error::ToolError;
use crate::notes::NoteStore;

/// Returns every note, or a sentinel when the log is empty.
pub struct ReadNotes {
    notes: Arc<NoteStore>,
}

impl ReadNotes {
    pub fn new(notes: Arc<NoteStore>) -> Self {
        Self { notes }
    }
}

#[async_trait::async_trait]
impl Tool for ReadNotes {
    type Input = ();
    type Output = String;

    fn name(&self) -> &str {
        "read_notes"
    }

    fn description(&self) -> &str {
        "Read and return all notes from the sticky note file."
    }

    async fn run(&self, _input: ()) -> Result<String, ToolError> {
        let content = self.notes.read_all()?;
        log::info!("Read all notes");
        Ok(content.unwrap_or_else(|| "No notes yet.".to_string()))
    }
}
