use std::io::Cursor;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use swapgrid::engine::audio::{AudioEngine, DecodedSound, SoundCue, SoundPlayer};
use swapgrid::engine::renderer::{ItemUniform, placeholder_pixels, quad_vertices};
use swapgrid::engine::resources::{
    AssetEvent, AssetManifest, ResourceManager, decode_image, load_sound_bank,
};
use swapgrid::grid::{GridLayout, Item};

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// 16-bit PCM WAV with a constant ramp, enough for the decoder to chew on.
fn wav_bytes(channels: u16, sample_rate: u32, frames: u32) -> Vec<u8> {
    let bits_per_sample = 16u16;
    let block_align = channels * bits_per_sample / 8;
    let data_len = frames * block_align as u32;

    let mut out = Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for frame in 0..frames {
        for _ in 0..channels {
            let sample = ((frame % 64) as i16 - 32) * 256;
            out.extend_from_slice(&sample.to_le_bytes());
        }
    }
    out
}

#[test]
fn test_png_decodes_to_rgba() {
    let image = decode_image(&png_bytes(3, 2)).unwrap();

    assert_eq!(image.dimensions(), (3, 2));
    assert_eq!(image.get_pixel(2, 1), &Rgba([200, 40, 40, 255]));
}

#[test]
fn test_garbage_image_bytes_fail() {
    assert!(decode_image(b"definitely not an image").is_err());
}

#[test]
fn test_wav_decodes_with_channel_layout() {
    let sound = DecodedSound::decode(wav_bytes(2, 8_000, 400)).unwrap();

    assert_eq!(sound.channels, 2);
    assert_eq!(sound.sample_rate, 8_000);
    assert_eq!(sound.samples.len(), 800);
    assert!((sound.duration_secs() - 0.05).abs() < 1e-4);
}

#[test]
fn test_sound_bank_needs_all_three_files() {
    let dir = tempfile::tempdir().unwrap();
    let click = dir.path().join("click.wav");
    let confirm = dir.path().join("confirm.wav");
    std::fs::write(&click, wav_bytes(1, 8_000, 80)).unwrap();
    std::fs::write(&confirm, wav_bytes(1, 8_000, 160)).unwrap();

    let mut manifest = AssetManifest {
        images: Vec::new(),
        click_sound: click,
        confirm_sound: confirm,
        error_sound: dir.path().join("missing.wav"),
    };
    let err = load_sound_bank(&manifest).unwrap_err();
    assert!(format!("{err:#}").contains("missing.wav"));

    let error = dir.path().join("error.wav");
    std::fs::write(&error, wav_bytes(1, 8_000, 240)).unwrap();
    manifest.error_sound = error;
    let bank = load_sound_bank(&manifest).unwrap();

    assert_eq!(bank.get(SoundCue::Click).samples.len(), 80);
    assert_eq!(bank.get(SoundCue::Confirm).samples.len(), 160);
    assert_eq!(bank.get(SoundCue::Error).samples.len(), 240);
}

#[test]
fn test_texture_loads_report_every_item() {
    let dir = tempfile::tempdir().unwrap();
    let present = dir.path().join("item1.png");
    std::fs::write(&present, png_bytes(4, 4)).unwrap();
    let manifest = AssetManifest {
        images: vec![present, dir.path().join("item2.png")],
        ..AssetManifest::default()
    };
    let resources = ResourceManager::new(manifest);

    let (tx, rx) = mpsc::channel();
    resources.spawn_texture_loads(move |event| {
        let _ = tx.send(event);
    });

    let mut decoded = Vec::new();
    let mut failed: Vec<(usize, PathBuf)> = Vec::new();
    for _ in 0..2 {
        match rx.recv_timeout(Duration::from_secs(10)).unwrap() {
            AssetEvent::TextureDecoded { index, image } => decoded.push((index, image.dimensions())),
            AssetEvent::TextureFailed { index, source, .. } => failed.push((index, source)),
            other => panic!("unexpected event {other:?}"),
        }
    }

    assert_eq!(decoded, vec![(0, (4, 4))]);
    assert_eq!(failed, vec![(1, dir.path().join("item2.png"))]);
}

#[test]
fn test_sound_loads_report_failure_once() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = AssetManifest {
        images: Vec::new(),
        click_sound: dir.path().join("click.wav"),
        confirm_sound: dir.path().join("confirm.wav"),
        error_sound: dir.path().join("error.wav"),
    };
    let resources = ResourceManager::new(manifest);

    let (tx, rx) = mpsc::channel();
    resources.spawn_sound_loads(move |event| {
        let _ = tx.send(event);
    });

    let event = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert!(matches!(event, AssetEvent::SoundsFailed { .. }));
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn test_quad_geometry_matches_hit_extent() {
    let layout = GridLayout::default();
    let vertices = quad_vertices(layout.item_half_extent);

    let max_x = vertices.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
    let min_y = vertices.iter().map(|v| v.position[1]).fold(f32::MAX, f32::min);
    assert_eq!(max_x, layout.item_half_extent);
    assert_eq!(min_y, -layout.item_half_extent);

    // Strip order: bottom-left, bottom-right, top-left, top-right.
    assert_eq!(vertices[0].tex_coords, [0.0, 1.0]);
    assert_eq!(vertices[3].tex_coords, [1.0, 0.0]);
}

#[test]
fn test_item_uniform_carries_position_and_scale() {
    let mut item = Item::new(glam::Vec2::new(0.5, -0.25), "a.png");
    item.current_scale = 1.03;

    let uniform = ItemUniform::from_item(&item);

    assert_eq!(uniform.translation, [0.5, -0.25]);
    assert_eq!(uniform.scale, 1.03);
    assert_eq!(std::mem::size_of::<ItemUniform>(), 16);
}

#[test]
fn test_placeholder_is_a_checker() {
    let pixels = placeholder_pixels();

    assert_eq!(pixels.dimensions(), (2, 2));
    assert_eq!(pixels.get_pixel(0, 0), pixels.get_pixel(1, 1));
    assert_ne!(pixels.get_pixel(0, 0), pixels.get_pixel(1, 0));
}

#[test]
fn test_audio_engine_is_silent_until_resumed_and_loaded() {
    let mut engine = AudioEngine::new();

    assert!(!engine.is_running());
    assert!(!engine.is_loaded());
    // Suspended output drops cues without touching a device.
    engine.play(SoundCue::Click);
    assert!(!engine.is_running());
}
