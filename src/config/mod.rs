// src/config/mod.rs
pub mod settings;
pub mod sources;

pub use settings::{DeployMode, Pacing, Settings, BOT_NAME};
pub use sources::{load_sources_default, load_sources_from, SourceRegistry};
