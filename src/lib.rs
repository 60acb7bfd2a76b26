pub mod algo;
pub mod config;
pub mod error;
pub mod ops;

#[cfg(feature = "mcp")]
pub mod mcp;

#[cfg(feature = "plugin")]
pub mod commands;

pub use error::{Error, Result};

#[cfg(feature = "plugin")]
use nu_plugin::{Plugin, PluginCommand};

#[cfg(feature = "plugin")]
pub struct KeyphrasePlugin;

#[cfg(feature = "plugin")]
impl Plugin for KeyphrasePlugin {
    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").into()
    }

    fn commands(&self) -> Vec<Box<dyn PluginCommand<Plugin = Self>>> {
        vec![
            Box::new(commands::Tag),
            Box::new(commands::Extract),
            Box::new(commands::Stem),
            Box::new(commands::Collocations),
        ]
    }
}
