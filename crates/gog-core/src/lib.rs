#![deny(warnings)]
pub mod belief;
pub mod game;
pub mod model;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "gog-ai"
    }

    pub const fn codename() -> &'static str {
        "Game of the Generals"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
