pub mod animation;
pub mod input;
pub mod item;
pub mod layout;
pub mod swap;

use std::path::PathBuf;
use std::time::Duration;

use glam::Vec2;
use image::RgbaImage;

use crate::engine::audio::{SoundCue, SoundPlayer};
use crate::engine::renderer::TextureSink;
use animation::PulseConfig;
pub use item::{Item, TextureStatus};
pub use layout::GridLayout;
use swap::SwapOutcome;

/// Owns every item and the status line; all input and animation goes through here.
#[derive(Debug)]
pub struct SwapGrid {
    items: Vec<Item>,
    half_extent: f32,
    pulse: PulseConfig,
    status: String,
}

impl SwapGrid {
    pub fn new(layout: &GridLayout, images: &[PathBuf], pulse: PulseConfig) -> Self {
        if images.len() != layout.len() {
            tracing::warn!(
                target: "grid",
                slots = layout.len(),
                images = images.len(),
                "image list does not match grid size, extra entries are ignored"
            );
        }

        let items: Vec<Item> = layout
            .positions()
            .zip(images)
            .map(|(position, source)| Item::new(position, source.clone()))
            .collect();
        tracing::debug!(target: "grid", count = items.len(), "grid items created");

        Self {
            items,
            half_extent: layout.item_half_extent,
            pulse,
            status: String::new(),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn selected_count(&self) -> usize {
        self.items.iter().filter(|item| item.selected).count()
    }

    pub fn hit_items(&self, point: Vec2) -> impl Iterator<Item = usize> + '_ {
        self.items
            .iter()
            .enumerate()
            .filter(move |(_, item)| item.contains(point, self.half_extent))
            .map(|(idx, _)| idx)
    }

    /// Refreshes every hover flag. Returns how many items are hovered.
    pub fn pointer_moved(&mut self, point: Vec2) -> usize {
        let half_extent = self.half_extent;
        let mut hovered = 0;
        for item in &mut self.items {
            item.hovered = item.contains(point, half_extent);
            hovered += usize::from(item.hovered);
        }
        hovered
    }

    pub fn pointer_left(&mut self) {
        for item in &mut self.items {
            item.hovered = false;
        }
    }

    /// Toggles every item under `point`. Returns the number toggled.
    pub fn click(&mut self, point: Vec2, audio: &mut impl SoundPlayer) -> usize {
        audio.resume();

        let half_extent = self.half_extent;
        let mut toggled = 0;
        for (idx, item) in self.items.iter_mut().enumerate() {
            if item.contains(point, half_extent) {
                item.selected = !item.selected;
                toggled += 1;
                tracing::debug!(target: "grid", idx, selected = item.selected, "item toggled");
            }
        }

        if toggled > 0 {
            audio.play(SoundCue::Click);
        }
        toggled
    }

    pub fn swap(&mut self, audio: &mut impl SoundPlayer) -> SwapOutcome {
        audio.resume();

        let selected: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.selected)
            .map(|(idx, _)| idx)
            .collect();
        let outcome = SwapOutcome::from_selection(selected);

        for &idx in &outcome.swapped {
            self.items[idx].selected = false;
        }
        audio.play(outcome.cue());

        tracing::info!(
            target: "grid",
            swapped = ?outcome.swapped,
            message = %outcome.message,
            "swap submitted"
        );
        self.status = outcome.message.clone();
        outcome
    }

    /// Advances every item's scale to wall-clock `elapsed`.
    pub fn animate(&mut self, elapsed: Duration) {
        for item in &mut self.items {
            item.current_scale = self.pulse.scale_for(item, elapsed);
        }
    }

    /// Hands a decoded image to `sink`. The item is only `Ready` once the
    /// upload succeeded; without a sink or on a rejected upload it is `Failed`
    /// and keeps the placeholder. Returns `None` for an unknown index.
    pub fn texture_decoded<S: TextureSink>(
        &mut self,
        index: usize,
        image: &RgbaImage,
        sink: Option<&mut S>,
    ) -> Option<TextureStatus> {
        if index >= self.items.len() {
            tracing::warn!(target: "grid", index, "decoded image for unknown item");
            return None;
        }

        let status = match sink {
            Some(sink) => match sink.upload_item_texture(index, image) {
                Ok(()) => TextureStatus::Ready {
                    width: image.width(),
                    height: image.height(),
                },
                Err(err) => {
                    tracing::warn!(target: "grid", index, "{err:#}, keeping placeholder");
                    TextureStatus::Failed
                }
            },
            None => {
                tracing::debug!(target: "grid", index, "no renderer, image discarded");
                TextureStatus::Failed
            }
        };
        self.items[index].texture = status;
        Some(status)
    }

    /// Marks an item whose image could not be read or decoded.
    pub fn texture_failed(&mut self, index: usize) -> Option<TextureStatus> {
        let Some(item) = self.items.get_mut(index) else {
            tracing::warn!(target: "grid", index, "load failure for unknown item");
            return None;
        };
        item.texture = TextureStatus::Failed;
        Some(item.texture)
    }
}
