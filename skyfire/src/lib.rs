pub mod attribution;
pub mod config;
pub mod constants;
pub mod host;
pub mod plugin;
pub mod salvo;
pub mod server;
pub mod settings;

pub use plugin::SkyfireFlag;
pub use server::PluginServer;
