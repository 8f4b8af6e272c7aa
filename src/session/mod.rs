//! Session orchestration: the tick loop tying input, network, protocol
//! engine, audio and rendering together.

pub mod engine;
pub mod membership;
pub mod roster;

use std::time::{Duration, Instant};

use ratatui::Terminal;

use crate::audio::Jukebox;
use crate::config::Config;
use crate::debug;
use crate::game::{poll_input, InputAction, TiltSensor};
use crate::net::client::NetworkEvent;
use crate::net::NetworkClient;
use crate::session::engine::{Effect, Engine};
use crate::ui;

/// Run one session until the player quits.
///
/// Every iteration is one simulation tick: drain keyboard input, drain the
/// network queue through the engine, advance the engine, carry out the
/// effects it returned, then render. Incoming messages are only ever
/// applied here, between ticks, so handlers observe a consistent state.
pub fn run_session<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    client: &NetworkClient,
    engine: &mut Engine,
    config: &Config,
) -> Result<(), std::io::Error> {
    debug::log("SESSION", "tick loop started");

    let tick_duration = Duration::from_millis(config.display.tick_ms);
    let mut sensor = TiltSensor::new();
    let mut jukebox = Jukebox::new();

    let startup = engine.startup();
    perform_effects(startup, client, &mut jukebox);

    loop {
        let tick_start = Instant::now();

        for action in poll_input()? {
            if action == InputAction::Quit {
                debug::log("SESSION", "quit requested");
                client.shutdown();
                return Ok(());
            }
            sensor.apply(action);
        }

        // Apply everything the socket thread queued since the last tick
        while let Some(event) = client.try_recv_event() {
            match event {
                NetworkEvent::Received { from, msg } => {
                    let effects = engine.handle_message(from, msg, tick_start);
                    perform_effects(effects, client, &mut jukebox);
                }
                NetworkEvent::Error(msg) => {
                    debug::log("NET_ERROR", &msg);
                }
            }
        }

        let effects = engine.tick(tick_start, sensor.read_orientation());
        perform_effects(effects, client, &mut jukebox);

        let tone = jukebox.tick();

        let hud = ui::HudInfo {
            is_leader: engine.is_leader(),
            peer_count: engine.state.roster.len(),
            seconds_left: ticks_to_seconds(engine.state.timer, config.display.tick_ms),
            tone,
        };
        terminal.draw(|f| ui::render(f, &engine.state, &hud))?;

        // Tick rate limiting
        let elapsed = tick_start.elapsed();
        if elapsed < tick_duration {
            std::thread::sleep(tick_duration - elapsed);
        }
    }
}

fn perform_effects(effects: Vec<Effect>, client: &NetworkClient, jukebox: &mut Jukebox) {
    for effect in effects {
        match effect {
            Effect::Send(msg) => {
                if let Err(e) = client.broadcast(msg) {
                    debug::log("NET_SEND", &format!("broadcast failed: {e}"));
                }
            }
            Effect::Play(cue) => jukebox.fire(cue),
        }
    }
}

fn ticks_to_seconds(ticks: u32, tick_ms: u64) -> u32 {
    ((ticks as u64 * tick_ms) / 1000) as u32
}
