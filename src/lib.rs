pub mod config;
pub mod engine;
pub mod grid;
pub mod ui;

pub use config::DemoConfig;
pub use grid::SwapGrid;
