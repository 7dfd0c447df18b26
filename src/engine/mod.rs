pub mod audio;
pub mod core;
pub mod platform;
pub mod renderer;
pub mod resources;

use std::sync::Arc;

use anyhow::{Context, Result};
use audio::AudioEngine;
use self::core::FrameLoop;
use platform::PlatformLayer;
use renderer::{GuiFrame, Renderer};
use resources::{AssetEvent, ResourceManager};
use wgpu::SurfaceError;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition},
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::config::DemoConfig;
use crate::grid::input::grid_pointer;
use crate::grid::{SwapGrid, TextureStatus};
use crate::ui::Gui;

pub struct EngineApp {
    config: DemoConfig,
    proxy: EventLoopProxy<AssetEvent>,
    resources: ResourceManager,
    audio: AudioEngine,
    grid: SwapGrid,
    frame_loop: FrameLoop<PlatformLayer>,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    gui: Option<Gui>,
    cursor: Option<PhysicalPosition<f64>>,
    loads_started: bool,
}

impl EngineApp {
    pub fn new(config: DemoConfig, proxy: EventLoopProxy<AssetEvent>) -> Self {
        let grid = SwapGrid::new(&config.layout, &config.assets.images, config.pulse.clone());
        Self {
            proxy,
            resources: ResourceManager::new(config.assets.clone()),
            audio: AudioEngine::new(),
            grid,
            frame_loop: FrameLoop::new(PlatformLayer::new()),
            window: None,
            renderer: None,
            gui: None,
            cursor: None,
            loads_started: false,
            config,
        }
    }

    fn start_loads(&mut self) {
        if self.loads_started {
            return;
        }
        self.loads_started = true;

        let proxy = self.proxy.clone();
        self.resources.spawn_texture_loads(move |event| {
            if proxy.send_event(event).is_err() {
                tracing::debug!(target: "engine", "event loop closed before texture load finished");
            }
        });

        let proxy = self.proxy.clone();
        self.resources.spawn_sound_loads(move |event| {
            if proxy.send_event(event).is_err() {
                tracing::debug!(target: "engine", "event loop closed before sound load finished");
            }
        });
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<Arc<Window>> {
        let engine = &self.config.engine;
        let attributes = Window::default_attributes()
            .with_title(engine.app_name.clone())
            .with_resizable(engine.resizable)
            .with_inner_size(LogicalSize::new(
                engine.window_width as f64,
                engine.window_height as f64,
            ));
        let window = event_loop
            .create_window(attributes)
            .context("failed to create window")?;
        Ok(Arc::new(window))
    }

    fn pointer_moved(&mut self, position: PhysicalPosition<f64>, over_overlay: bool) {
        self.cursor = Some(position);
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let viewport = PlatformLayer::viewport(window.inner_size());
        match grid_pointer(&viewport, position.x as f32, position.y as f32, over_overlay) {
            Some(ndc) => {
                self.grid.pointer_moved(ndc);
            }
            None => self.grid.pointer_left(),
        }
    }

    fn pointer_pressed(&mut self) {
        let (Some(window), Some(position)) = (self.window.as_ref(), self.cursor) else {
            return;
        };
        let viewport = PlatformLayer::viewport(window.inner_size());
        if let Some(ndc) = viewport.to_ndc(position.x as f32, position.y as f32) {
            let toggled = self.grid.click(ndc, &mut self.audio);
            tracing::debug!(
                target: "engine",
                toggled,
                selected = self.grid.selected_count(),
                "pointer click"
            );
        }
    }

    fn submit_swap(&mut self) {
        self.grid.swap(&mut self.audio);
    }

    fn apply_asset(&mut self, event: AssetEvent) {
        match event {
            AssetEvent::TextureDecoded { index, image } => {
                let status = self
                    .grid
                    .texture_decoded(index, &image, self.renderer.as_mut());
                if let (Some(TextureStatus::Ready { .. }), Some(renderer)) =
                    (status, self.renderer.as_ref())
                {
                    tracing::trace!(
                        target: "engine",
                        index,
                        bound = ?renderer.slot_texture_size(index),
                        "slot rebound"
                    );
                }
            }
            AssetEvent::TextureFailed {
                index,
                source,
                error,
            } => {
                tracing::warn!(
                    target: "engine",
                    index,
                    source = %source.display(),
                    %error,
                    "texture load failed, keeping placeholder"
                );
                self.grid.texture_failed(index);
            }
            AssetEvent::SoundsReady(bank) => self.audio.install_bank(bank),
            AssetEvent::SoundsFailed { error } => {
                tracing::warn!(target: "engine", %error, "sound load failed, audio stays silent");
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.clone() else {
            return;
        };
        self.frame_loop.tick(&mut self.grid);

        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        let mut swap_clicked = false;
        let result = match self.gui.as_mut() {
            Some(gui) => {
                let output = gui.run(&window, self.grid.status(), self.grid.selected_count());
                swap_clicked = output.panel.swap_clicked;
                let size = renderer.size();
                let (egui_renderer, textures_delta) = gui.frame_parts();
                let frame = GuiFrame {
                    renderer: egui_renderer,
                    primitives: &output.primitives,
                    textures_delta,
                    screen: egui_wgpu::ScreenDescriptor {
                        size_in_pixels: [size.width, size.height],
                        pixels_per_point: output.pixels_per_point,
                    },
                };
                let result = renderer.render(self.grid.items(), Some(frame));
                if result.is_ok() {
                    gui.textures_uploaded();
                }
                result
            }
            None => renderer.render(self.grid.items(), None),
        };

        match result {
            Ok(()) => {}
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                renderer.resize(window.inner_size());
            }
            Err(SurfaceError::OutOfMemory) => {
                tracing::error!(target: "engine", "GPU out of memory, shutting down");
                event_loop.exit();
                return;
            }
            Err(err) => {
                tracing::warn!(target: "engine", %err, "surface error, skipping frame");
            }
        }

        if swap_clicked {
            self.submit_swap();
        }
        self.frame_loop.schedule_next(window.as_ref());
    }
}

impl ApplicationHandler<AssetEvent> for EngineApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match self.create_window(event_loop) {
            Ok(window) => window,
            Err(err) => {
                tracing::error!(target: "engine", "{err:#}");
                event_loop.exit();
                return;
            }
        };

        let layout = &self.config.layout;
        match pollster::block_on(Renderer::new(
            window.clone(),
            self.grid.items().len(),
            layout.item_half_extent,
            self.config.texture_filter,
        )) {
            Ok(renderer) => {
                self.gui = Some(Gui::new(&window, renderer.device(), renderer.surface_format()));
                self.renderer = Some(renderer);
            }
            Err(err) => {
                tracing::error!(
                    target: "engine",
                    "renderer unavailable, continuing without drawing: {err:#}"
                );
            }
        }

        self.window = Some(window.clone());
        self.start_loads();
        window.request_redraw();
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AssetEvent) {
        self.apply_asset(event);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        let consumed = match self.gui.as_mut() {
            Some(gui) => gui.on_window_event(&window, &event) || gui.pointer_captured(),
            None => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!(target: "engine", "window close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size);
                }
            }
            WindowEvent::CursorMoved { position, .. } => self.pointer_moved(position, consumed),
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.grid.pointer_left();
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } if !consumed => self.pointer_pressed(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        logical_key,
                        repeat: false,
                        ..
                    },
                ..
            } if !consumed => match logical_key {
                Key::Named(NamedKey::Enter) => self.submit_swap(),
                Key::Named(NamedKey::Escape) => event_loop.exit(),
                _ => {}
            },
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }

        // Without a renderer nothing requests frames, keep the clock moving anyway.
        if self.renderer.is_none() {
            self.frame_loop.tick(&mut self.grid);
        }
    }
}

pub fn run(config: DemoConfig) -> Result<()> {
    tracing::info!(
        target: "engine",
        app = %config.engine.app_name,
        items = config.layout.len(),
        "Engine starting"
    );

    let event_loop = EventLoop::<AssetEvent>::with_user_event()
        .build()
        .context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = EngineApp::new(config, event_loop.create_proxy());
    event_loop
        .run_app(&mut app)
        .context("event loop terminated with an error")?;

    tracing::info!(target: "engine", "Engine shutdown complete");
    Ok(())
}
