use std::path::Path;

use anyhow::Result;
use swapgrid::DemoConfig;
use swapgrid::config::DEFAULT_CONFIG_PATH;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();

    let config = DemoConfig::load_or_default(Path::new(DEFAULT_CONFIG_PATH));
    swapgrid::engine::run(config)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wgpu_core=warn,wgpu_hal=warn,naga=warn"));
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already set");
    }
}
