use lesson_gen::{BackendOptions, EndpointLayout};
use std::env;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

pub fn backend_options() -> BackendOptions {
    let layout = match env::var("LESSON_API_LAYOUT").as_deref() {
        Ok("legacy") => EndpointLayout::Legacy,
        _ => EndpointLayout::Uniform,
    };

    BackendOptions {
        base_url: env::var("LESSON_API_BASE_URL").ok(),
        layout,
        ..Default::default()
    }
}
