use std::sync::Arc;

use super::Tool;
use crate::error::ToolError;
use crate::notes::NoteStore;

/// Appends a line to the sticky note file.
pub struct AddNote {
    notes: Arc<NoteStore>,
}

impl AddNote {
    pub fn new(notes: Arc<NoteStore>) -> Self {
        Self { notes }
    }
}

#[async_trait::async_trait]
impl Tool for AddNote {
    type Input = String;
    type Output = String;

    fn name(&self) -> &str {
        "add_note"
    }

    fn description(&self) -> &str {
        "Append a new note to the sticky note file."
    }

    async fn run(&self, message: String) -> Result<String, ToolError> {
        self.notes.add(&message)?;
        log::info!("Added note: {}", message);
        Ok("Note saved!".to_string())
    }
}
