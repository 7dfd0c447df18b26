use std::sync::Arc;

use egui_wgpu::Renderer as EguiRenderer;
use egui_winit::State as EguiState;
use winit::event::WindowEvent;
use winit::window::Window;

pub const SWAP_BUTTON_LABEL: &str = "Swap selected";

/// What the overlay asked for this frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PanelResponse {
    pub swap_clicked: bool,
}

/// Swap button plus the status line.
pub fn status_panel(ctx: &egui::Context, status: &str, selected: usize) -> PanelResponse {
    let mut response = PanelResponse::default();
    egui::Window::new("Swap")
        .default_pos([12.0, 12.0])
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            ui.label(format!("Selected: {selected}"));
            if ui.button(SWAP_BUTTON_LABEL).clicked() {
                response.swap_clicked = true;
            }
            if !status.is_empty() {
                ui.separator();
                ui.label(status);
            }
        });
    response
}

/// egui texture updates not yet uploaded. They stay queued until a frame is
/// actually rendered, since later partial updates patch textures allocated by
/// earlier ones.
#[derive(Default)]
pub struct TextureQueue {
    pending: egui::TexturesDelta,
}

impl TextureQueue {
    pub fn defer(&mut self, delta: egui::TexturesDelta) {
        self.pending.append(delta);
    }

    pub fn pending(&self) -> &egui::TexturesDelta {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Call once the pending updates reached the GPU.
    pub fn uploaded(&mut self) {
        self.pending.clear();
    }
}

pub struct Gui {
    ctx: egui::Context,
    state: EguiState,
    renderer: EguiRenderer,
    textures: TextureQueue,
}

/// Tessellated overlay ready to hand to the renderer.
pub struct GuiOutput {
    pub panel: PanelResponse,
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub pixels_per_point: f32,
}

impl Gui {
    pub fn new(window: &Arc<Window>, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let ctx = egui::Context::default();
        let state = EguiState::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            &**window,
            Some(window.scale_factor() as f32),
            None,
            Some(2048),
        );
        let renderer = EguiRenderer::new(device, format, egui_wgpu::RendererOptions::default());
        Self {
            ctx,
            state,
            renderer,
            textures: TextureQueue::default(),
        }
    }

    /// Returns true when egui consumed the event.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    pub fn pointer_captured(&self) -> bool {
        self.ctx.is_pointer_over_area() || self.ctx.wants_pointer_input()
    }

    pub fn run(&mut self, window: &Window, status: &str, selected: usize) -> GuiOutput {
        let raw_input = self.state.take_egui_input(window);
        let mut panel = PanelResponse::default();
        let full_output = self.ctx.run(raw_input, |ctx| {
            panel = status_panel(ctx, status, selected);
        });
        self.state
            .handle_platform_output(window, full_output.platform_output);
        self.textures.defer(full_output.textures_delta);

        let primitives = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        GuiOutput {
            panel,
            primitives,
            pixels_per_point: full_output.pixels_per_point,
        }
    }

    /// egui renderer plus every texture update still waiting for a frame.
    pub fn frame_parts(&mut self) -> (&mut EguiRenderer, &egui::TexturesDelta) {
        (&mut self.renderer, self.textures.pending())
    }

    pub fn textures_uploaded(&mut self) {
        self.textures.uploaded();
    }
}
