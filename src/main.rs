#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use dioxus::desktop::tao::dpi::LogicalSize;
use dioxus::desktop::{Config, WindowBuilder};
use dioxus::prelude::*;
use newsbot::app::{App, Services};
use newsbot::storage::settings::load_settings;
use tracing_subscriber::EnvFilter;

const STYLE: &str = include_str!("../assets/style.css");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("newsbot=info")),
        )
        .init();

    let settings = load_settings();
    let services = Services::new(settings)?;

    LaunchBuilder::desktop()
        .with_cfg(
            Config::new()
                .with_window(
                    WindowBuilder::new()
                        .with_title("News Bot")
                        .with_resizable(true)
                        .with_inner_size(LogicalSize::new(900.0, 760.0)),
                )
                .with_custom_head(format!("<style>{}</style>", STYLE)),
        )
        .with_context(services)
        .launch(App);

    Ok(())
}
