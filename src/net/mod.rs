// Broadcast networking for marblenet sessions.
// Handles the UDP socket thread, wire codec, and message passing.

pub mod client;
pub mod runtime;
pub mod wire;

pub use client::{NetworkClient, NetworkEvent};
pub use wire::{Message, StateSnapshot};

use std::io;
use std::sync::mpsc;

use crate::config::NetworkConfig;
use crate::game::state::PeerId;

/// Initialize and start the network layer.
/// Returns a NetworkClient handle for the game loop to communicate with.
pub fn start_network(my_id: PeerId, config: &NetworkConfig) -> io::Result<NetworkClient> {
    let (event_tx, event_rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();

    let broadcast_addr = config.broadcast_addr.parse().map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("bad broadcast_addr {:?}: {e}", config.broadcast_addr),
        )
    })?;

    runtime::spawn_network_thread(my_id, config.port, broadcast_addr, event_tx, cmd_rx)?;

    Ok(NetworkClient::new(cmd_tx, event_rx))
}
