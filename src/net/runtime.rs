// Network runtime - owns the UDP broadcast socket in a background thread.
// Bridges the async socket with the sync game loop via channels.
//
// Datagram framing: [6-byte sender identity][message bytes]. UDP gives us
// no link-layer sender identity, so the adapter carries it; the message
// body itself is the fixed wire layout from `wire.rs`.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::runtime::Builder;

use super::client::{NetworkCommand, NetworkEvent};
use super::wire::{Message, WireError};
use crate::debug;
use crate::game::state::PeerId;

/// Largest datagram we ever produce: identity prefix + full STATE.
const MAX_DATAGRAM: usize = 128;

pub fn spawn_network_thread(
    my_id: PeerId,
    port: u16,
    broadcast_addr: Ipv4Addr,
    event_tx: mpsc::Sender<NetworkEvent>,
    cmd_rx: mpsc::Receiver<NetworkCommand>,
) -> std::io::Result<()> {
    thread::spawn(move || {
        let rt = match Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(e) => {
                let _ = event_tx.send(NetworkEvent::Error(format!("tokio runtime: {e}")));
                return;
            }
        };

        rt.block_on(async move {
            if let Err(e) = run_network(my_id, port, broadcast_addr, &event_tx, cmd_rx).await {
                let _ = event_tx.send(NetworkEvent::Error(e.to_string()));
            }
        });
    });

    Ok(())
}

async fn run_network(
    my_id: PeerId,
    port: u16,
    broadcast_addr: Ipv4Addr,
    event_tx: &mpsc::Sender<NetworkEvent>,
    cmd_rx: mpsc::Receiver<NetworkCommand>,
) -> std::io::Result<()> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port)).await?;
    socket.set_broadcast(true)?;
    let target = SocketAddr::from((broadcast_addr, port));

    debug::log(
        "NET_START",
        &format!("listening on :{port}, broadcasting to {target}, id {my_id}"),
    );

    let mut buf = [0u8; MAX_DATAGRAM];
    loop {
        tokio::select! {
            result = socket.recv_from(&mut buf) => {
                match result {
                    Ok((len, _addr)) => {
                        handle_datagram(my_id, &buf[..len], event_tx);
                    }
                    Err(e) => {
                        let _ = event_tx.send(NetworkEvent::Error(e.to_string()));
                    }
                }
            }

            // Poll commands from the game loop (non-blocking std channel).
            _ = tokio::time::sleep(Duration::from_millis(5)) => {
                while let Ok(cmd) = cmd_rx.try_recv() {
                    match cmd {
                        NetworkCommand::Broadcast(msg) => {
                            let mut datagram = Vec::with_capacity(MAX_DATAGRAM);
                            datagram.extend_from_slice(my_id.as_bytes());
                            datagram.extend_from_slice(&msg.encode());
                            if let Err(e) = socket.send_to(&datagram, target).await {
                                debug::log("NET_SEND_ERROR", &e.to_string());
                            }
                        }
                        NetworkCommand::Shutdown => {
                            debug::log("NET_STOP", "network thread shutting down");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

fn handle_datagram(my_id: PeerId, datagram: &[u8], event_tx: &mpsc::Sender<NetworkEvent>) {
    if datagram.len() < 6 {
        return;
    }
    let mut sender = [0u8; 6];
    sender.copy_from_slice(&datagram[..6]);
    let from = PeerId(sender);
    if from == my_id {
        // Our own broadcast looped back.
        return;
    }

    match Message::decode(&datagram[6..]) {
        Ok(msg) => {
            let _ = event_tx.send(NetworkEvent::Received { from, msg });
        }
        Err(WireError::UnknownTag(tag)) => {
            debug::log("NET_RECV", &format!("ignoring unknown tag {tag:#04x} from {from}"));
        }
        Err(e) => {
            // Malformed datagram: drop silently, the periodic broadcasts
            // will recover whatever this one carried.
            debug::log("NET_RECV", &format!("dropping datagram from {from}: {e}"));
        }
    }
}
