use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{Context, Result, anyhow};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::audio::{DecodedSound, SoundBank};

/// Paths of every asset loaded at startup, relative to the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetManifest {
    pub images: Vec<PathBuf>,
    pub click_sound: PathBuf,
    pub confirm_sound: PathBuf,
    pub error_sound: PathBuf,
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            images: (1..=6)
                .map(|n| PathBuf::from(format!("assets/images/item{n}.png")))
                .collect(),
            click_sound: PathBuf::from("assets/sounds/click.wav"),
            confirm_sound: PathBuf::from("assets/sounds/confirm.wav"),
            error_sound: PathBuf::from("assets/sounds/error.wav"),
        }
    }
}

/// Completion messages from background loads, applied on the event-loop thread.
#[derive(Debug)]
pub enum AssetEvent {
    TextureDecoded { index: usize, image: RgbaImage },
    TextureFailed { index: usize, source: PathBuf, error: String },
    SoundsReady(SoundBank),
    SoundsFailed { error: String },
}

pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage> {
    let image = image::load_from_memory(bytes).context("failed to decode image")?;
    Ok(image.to_rgba8())
}

pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    decode_image(&bytes).with_context(|| format!("decoding {}", path.display()))
}

pub fn load_sound(path: &Path) -> Result<DecodedSound> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    DecodedSound::decode(bytes).with_context(|| format!("decoding {}", path.display()))
}

/// Loads the three cues concurrently. All must succeed.
pub fn load_sound_bank(manifest: &AssetManifest) -> Result<SoundBank> {
    thread::scope(|scope| {
        let click = scope.spawn(|| load_sound(&manifest.click_sound));
        let confirm = scope.spawn(|| load_sound(&manifest.confirm_sound));
        let error = scope.spawn(|| load_sound(&manifest.error_sound));

        let join = |handle: thread::ScopedJoinHandle<'_, Result<DecodedSound>>| {
            handle
                .join()
                .map_err(|_| anyhow!("sound loader thread panicked"))?
        };

        Ok(SoundBank {
            click: join(click)?,
            confirm: join(confirm)?,
            error: join(error)?,
        })
    })
}

#[derive(Debug, Default)]
pub struct ResourceManager {
    manifest: AssetManifest,
}

impl ResourceManager {
    pub fn new(manifest: AssetManifest) -> Self {
        Self { manifest }
    }

    /// One fire-and-forget thread per image. Completion order is unspecified.
    pub fn spawn_texture_loads<F>(&self, dispatch: F)
    where
        F: Fn(AssetEvent) + Send + Clone + 'static,
    {
        for (index, path) in self.manifest.images.iter().cloned().enumerate() {
            let dispatch = dispatch.clone();
            let spawned = thread::Builder::new()
                .name(format!("texture-load-{index}"))
                .spawn(move || {
                    let event = match load_image(&path) {
                        Ok(image) => AssetEvent::TextureDecoded { index, image },
                        Err(err) => AssetEvent::TextureFailed {
                            index,
                            source: path,
                            error: format!("{err:#}"),
                        },
                    };
                    dispatch(event);
                });

            if let Err(err) = spawned {
                tracing::error!(target: "resources", index, %err, "failed to spawn texture loader");
            }
        }
        tracing::debug!(
            target: "resources",
            count = self.manifest.images.len(),
            "texture loads started"
        );
    }

    pub fn spawn_sound_loads<F>(&self, dispatch: F)
    where
        F: Fn(AssetEvent) + Send + 'static,
    {
        let manifest = self.manifest.clone();
        let spawned = thread::Builder::new()
            .name("sound-load".to_string())
            .spawn(move || {
                let event = match load_sound_bank(&manifest) {
                    Ok(bank) => AssetEvent::SoundsReady(bank),
                    Err(err) => AssetEvent::SoundsFailed {
                        error: format!("{err:#}"),
                    },
                };
                dispatch(event);
            });

        if let Err(err) = spawned {
            tracing::error!(target: "resources", %err, "failed to spawn sound loader");
        }
    }
}
