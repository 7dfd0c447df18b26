use std::io::Cursor;

use anyhow::{Context, Result};
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Source};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Click,
    Confirm,
    Error,
}

/// Anything that can react to sound cues. The grid only talks to this.
pub trait SoundPlayer {
    /// Make sure output is live. Called from user gestures.
    fn resume(&mut self);
    fn play(&mut self, cue: SoundCue);
}

/// Fully decoded PCM, replayed without touching the decoder again.
#[derive(Debug, Clone)]
pub struct DecodedSound {
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl DecodedSound {
    pub fn decode(bytes: Vec<u8>) -> Result<Self> {
        let decoder = Decoder::new(Cursor::new(bytes)).context("failed to decode sound")?;
        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        let samples: Vec<f32> = decoder.collect();
        Ok(Self {
            channels,
            sample_rate,
            samples,
        })
    }

    pub fn duration_secs(&self) -> f32 {
        if self.channels == 0 || self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / (self.channels as f32 * self.sample_rate as f32)
    }

    fn source(&self) -> SamplesBuffer {
        SamplesBuffer::new(self.channels, self.sample_rate, self.samples.clone())
    }
}

#[derive(Debug, Clone)]
pub struct SoundBank {
    pub click: DecodedSound,
    pub confirm: DecodedSound,
    pub error: DecodedSound,
}

impl SoundBank {
    pub fn get(&self, cue: SoundCue) -> &DecodedSound {
        match cue {
            SoundCue::Click => &self.click,
            SoundCue::Confirm => &self.confirm,
            SoundCue::Error => &self.error,
        }
    }
}

enum OutputState {
    /// No stream yet; opened on the first user gesture.
    Suspended,
    Running(OutputStream),
    /// Opening the device failed once; stays silent for the session.
    Unavailable,
}

pub struct AudioEngine {
    output: OutputState,
    bank: Option<SoundBank>,
}

impl AudioEngine {
    pub fn new() -> Self {
        Self {
            output: OutputState::Suspended,
            bank: None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.output, OutputState::Running(_))
    }

    pub fn is_loaded(&self) -> bool {
        self.bank.is_some()
    }

    pub fn install_bank(&mut self, bank: SoundBank) {
        tracing::info!(
            target: "audio",
            click_secs = bank.click.duration_secs(),
            confirm_secs = bank.confirm.duration_secs(),
            error_secs = bank.error.duration_secs(),
            "sound bank ready"
        );
        self.bank = Some(bank);
    }
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundPlayer for AudioEngine {
    fn resume(&mut self) {
        if !matches!(self.output, OutputState::Suspended) {
            return;
        }

        match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                stream.log_on_drop(false);
                tracing::info!(target: "audio", "audio output running");
                self.output = OutputState::Running(stream);
            }
            Err(err) => {
                tracing::warn!(target: "audio", %err, "audio output unavailable, sounds disabled");
                self.output = OutputState::Unavailable;
            }
        }
    }

    fn play(&mut self, cue: SoundCue) {
        let OutputState::Running(stream) = &self.output else {
            tracing::trace!(target: "audio", ?cue, "audio not running, cue dropped");
            return;
        };
        let Some(bank) = self.bank.as_ref() else {
            tracing::trace!(target: "audio", ?cue, "sounds not loaded, cue dropped");
            return;
        };

        stream.mixer().add(bank.get(cue).source());
        tracing::debug!(target: "audio", ?cue, "cue played");
    }
}
