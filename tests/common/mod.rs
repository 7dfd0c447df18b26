#![allow(dead_code)]

use std::path::PathBuf;

use swapgrid::engine::audio::{SoundCue, SoundPlayer};
use swapgrid::grid::GridLayout;
use swapgrid::grid::animation::PulseConfig;
use swapgrid::SwapGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCall {
    Resume,
    Play(SoundCue),
}

/// Stands in for the audio engine; remembers every call in order.
#[derive(Debug, Default)]
pub struct RecordingPlayer {
    pub calls: Vec<AudioCall>,
}

impl RecordingPlayer {
    pub fn played(&self) -> Vec<SoundCue> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                AudioCall::Play(cue) => Some(*cue),
                AudioCall::Resume => None,
            })
            .collect()
    }
}

impl SoundPlayer for RecordingPlayer {
    fn resume(&mut self) {
        self.calls.push(AudioCall::Resume);
    }

    fn play(&mut self, cue: SoundCue) {
        self.calls.push(AudioCall::Play(cue));
    }
}

pub fn image_list(count: usize) -> Vec<PathBuf> {
    (1..=count)
        .map(|n| PathBuf::from(format!("assets/images/item{n}.png")))
        .collect()
}

pub fn default_grid() -> SwapGrid {
    let layout = GridLayout::default();
    SwapGrid::new(&layout, &image_list(layout.len()), PulseConfig::default())
}
