pub mod constants;
pub mod events;
pub mod host;
pub mod plugin;
pub mod protocol;
