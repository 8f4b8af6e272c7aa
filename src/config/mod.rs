// Configuration module for marblenet

pub mod loader;
pub mod types;

pub use loader::load_config;
pub use types::{Config, DisplayConfig, NetworkConfig, PhysicsConfig, ProtocolConfig};
