use crate::engine::audio::SoundCue;

pub const EMPTY_SELECTION_MESSAGE: &str = "Please select at least one item first.";

pub fn swap_message(count: usize) -> String {
    format!("Swap request sent for {count} item(s)!")
}

/// Result of one swap submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    /// Indices whose selection was cleared, ascending.
    pub swapped: Vec<usize>,
    pub message: String,
}

impl SwapOutcome {
    pub fn from_selection(swapped: Vec<usize>) -> Self {
        let message = if swapped.is_empty() {
            EMPTY_SELECTION_MESSAGE.to_string()
        } else {
            swap_message(swapped.len())
        };
        Self { swapped, message }
    }

    pub fn is_empty(&self) -> bool {
        self.swapped.is_empty()
    }

    pub fn cue(&self) -> SoundCue {
        if self.is_empty() {
            SoundCue::Error
        } else {
            SoundCue::Confirm
        }
    }
}
