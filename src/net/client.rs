// Network client interface for the game loop.
// Provides channels to communicate with the broadcast socket thread.

use std::io;
use std::sync::mpsc;

use super::wire::Message;
use crate::game::state::PeerId;

/// Handle for the game loop to talk to the network thread. All calls are
/// non-blocking; incoming messages queue up until the tick loop drains
/// them, so a message is never applied mid-tick.
pub struct NetworkClient {
    tx: mpsc::Sender<NetworkCommand>,
    rx: mpsc::Receiver<NetworkEvent>,
}

/// Commands the game loop sends to the network thread.
#[derive(Debug)]
pub enum NetworkCommand {
    /// Broadcast a session message to every node in range.
    Broadcast(Message),

    /// Stop the network thread.
    Shutdown,
}

/// Events the network thread sends to the game loop.
#[derive(Debug)]
pub enum NetworkEvent {
    /// A decoded message from a peer (own broadcasts are filtered out).
    Received { from: PeerId, msg: Message },

    /// Socket-level failure; the session keeps running and relies on the
    /// next periodic broadcast.
    Error(String),
}

impl NetworkClient {
    pub fn new(tx: mpsc::Sender<NetworkCommand>, rx: mpsc::Receiver<NetworkEvent>) -> Self {
        Self { tx, rx }
    }

    pub fn broadcast(&self, msg: Message) -> io::Result<()> {
        self.tx
            .send(NetworkCommand::Broadcast(msg))
            .map_err(|e| io::Error::new(io::ErrorKind::BrokenPipe, e))
    }

    /// Try to receive network events (non-blocking).
    pub fn try_recv_event(&self) -> Option<NetworkEvent> {
        self.rx.try_recv().ok()
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(NetworkCommand::Shutdown);
    }
}
