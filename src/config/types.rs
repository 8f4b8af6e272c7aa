// Marblenet configuration types
// All settings with sensible defaults matching the firmware constants

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub protocol: ProtocolConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            protocol: ProtocolConfig::default(),
            display: DisplayConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PhysicsConfig {
    // How strongly a tilt sample accelerates the ball, per tick
    pub acc_factor: f32,

    // Velocity multiplier on wall contact (negative: reverse and dampen)
    pub bounce_factor: f32,

    // Field dimensions in board units (wire coordinates are u8, so keep
    // these at 255 or below)
    pub field_width: f32,
    pub field_height: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            acc_factor: 0.5,
            bounce_factor: -0.5,
            field_width: 128.0,
            field_height: 64.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProtocolConfig {
    // How long a fresh node waits for an existing session to answer its
    // HELLO before leading a solo round
    pub join_grace_ms: u64,

    // Silence after which a peer is considered gone
    pub member_timeout_ms: u64,

    // Staleness sweep cadence, in ticks
    pub sweep_interval_ticks: u32,

    // Round countdown, in ticks (200 ticks at 50 ms = 10 s)
    pub round_time_ticks: u32,

    // End-of-round presentation time before the leader resets
    pub restart_delay_ms: u64,

    // How often eliminated players / spectators re-announce with HELLO
    pub hello_retry_ticks: u32,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            join_grace_ms: 1000,
            member_timeout_ms: 5000,
            sweep_interval_ticks: 20,
            round_time_ticks: 200,
            restart_delay_ms: 3000,
            hello_retry_ticks: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    // Simulation tick period in milliseconds
    pub tick_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { tick_ms: 50 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    // UDP port shared by all nodes in a session
    pub port: u16,

    // Broadcast destination; 255.255.255.255 reaches the local segment
    pub broadcast_addr: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            port: 47817,
            broadcast_addr: "255.255.255.255".to_string(),
        }
    }
}
