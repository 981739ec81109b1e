use crate::error::SlotbookError;
use slotbook_domain::EventRef;

pub struct Guard {}

impl Guard {
    /// Event ids in paths may address a stored event or a generated occurrence.
    /// Neither form parsing means there is nothing to find.
    pub fn against_malformed_event_ref(val: &str) -> Result<EventRef, SlotbookError> {
        val.parse().map_err(|_| {
            SlotbookError::NotFound(format!(
                "The calendar event with id: {}, was not found.",
                val
            ))
        })
    }
}
