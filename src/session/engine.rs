//! Session protocol engine: the state machine driving join, replication,
//! collision resolution, level progression, elimination and leader
//! failover.
//!
//! The engine never touches the socket. Message handlers and the tick
//! return [`Effect`]s (broadcasts to make, jingles to fire) that the run
//! loop carries out, so a STATE broadcast triggered by an incoming HELLO
//! is naturally deferred to the next tick instead of being sent from the
//! receive path.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;

use crate::audio::Cue;
use crate::config::{Config, PhysicsConfig, ProtocolConfig};
use crate::debug;
use crate::game::physics;
use crate::game::placement::random_place;
use crate::game::state::{
    Board, FPoint, GridPoint, PeerId, Player, Popup, SessionState, BADDIE_RATE, MAX_BADDIES,
    MAX_PLAYERS,
};
use crate::net::wire::{Message, StateSnapshot};
use crate::session::membership::MembershipTable;
use crate::session::roster;

/// Side effects for the run loop to carry out after a handler returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Send(Message),
    Play(Cue),
}

/// Node lifecycle: a fresh node announces itself and waits out a grace
/// interval for an existing session to answer with STATE. Leadership
/// within `Playing` is derived from the roster, never stored here.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Joining { deadline: Instant },
    Playing,
}

pub struct Engine {
    pub state: SessionState,
    membership: MembershipTable,
    phase: Phase,
    /// Roster changed; broadcast a STATE snapshot on the next tick.
    pending_state: bool,
    /// End-of-round presentation is showing; the leader resets the round
    /// once this deadline passes.
    restart_at: Option<Instant>,
    tick_count: u64,
    rng: StdRng,
    physics: PhysicsConfig,
    protocol: ProtocolConfig,
}

impl Engine {
    pub fn new(my_id: PeerId, config: &Config, rng: StdRng, now: Instant) -> Self {
        Self {
            state: SessionState::new(my_id, &config.physics, config.protocol.round_time_ticks),
            membership: MembershipTable::new(),
            phase: Phase::Joining {
                deadline: now + Duration::from_millis(config.protocol.join_grace_ms),
            },
            pending_state: false,
            restart_at: None,
            tick_count: 0,
            rng,
            physics: config.physics.clone(),
            protocol: config.protocol.clone(),
        }
    }

    /// Announce ourselves; an existing leader will answer with STATE.
    pub fn startup(&mut self) -> Vec<Effect> {
        vec![Effect::Send(Message::Hello)]
    }

    pub fn is_leader(&self) -> bool {
        roster::is_leader(self.state.my_id, &self.state.roster)
    }

    pub fn is_joining(&self) -> bool {
        matches!(self.phase, Phase::Joining { .. })
    }

    /// Apply one incoming message. Called between ticks only, so every
    /// message is atomic with respect to the simulation.
    pub fn handle_message(&mut self, from: PeerId, msg: Message, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.membership.touch(from, now);

        match msg {
            Message::Hello => self.on_hello(from),
            Message::State(snapshot) => self.apply_state(from, snapshot, now),
            Message::Position { pos } => {
                // Unknown sender: a spectator or a cross-round straggler.
                if let Some(index) = self.state.player_index(from) {
                    self.state.roster[index].ball = pos;
                }
            }
            Message::LevelUp {
                level,
                flag,
                baddie,
                scorer,
            } => self.apply_level_up(level, flag, baddie, scorer, now, &mut effects),
            Message::PlayerLost { id } => self.apply_player_lost(id, now, &mut effects),
        }
        effects
    }

    /// One simulation step. `orientation` is this tick's tilt sample.
    pub fn tick(&mut self, now: Instant, orientation: [f32; 3]) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.tick_count += 1;

        if let Phase::Joining { deadline } = self.phase {
            if now < deadline {
                return effects;
            }
            // Nobody answered our HELLO: we lead a fresh solo round.
            self.begin_solo_round();
        }

        if let Some(at) = self.restart_at {
            if now >= at {
                if self.is_leader() {
                    self.start_new_round();
                } else {
                    // Followers wait for the leader's STATE.
                    self.restart_at = None;
                }
            }
        }

        // Deferred STATE broadcast (set by the HELLO handler or a roster
        // change) goes out here, never from the receive path.
        if self.pending_state {
            self.pending_state = false;
            self.broadcast(&mut effects, Message::State(self.snapshot()));
        }

        physics::bounce(&mut self.state, &self.physics);

        if self.is_leader() && self.restart_at.is_none() {
            self.check_collisions(now, &mut effects);
        }

        self.drive_local_ball(orientation, &mut effects);
        self.run_countdown(now, &mut effects);

        if self.tick_count % self.protocol.sweep_interval_ticks as u64 == 0 {
            self.sweep_membership(now);
        }

        effects
    }

    fn on_hello(&mut self, from: PeerId) {
        // Only the leader admits players; everyone still refreshed the
        // sender's membership timestamp above.
        if self.phase != Phase::Playing || !self.is_leader() {
            return;
        }
        if self.state.player_index(from).is_some() {
            // Already enrolled; the HELLO was a liveness signal.
            return;
        }
        if self.state.roster.len() >= MAX_PLAYERS {
            debug::log("SESSION", &format!("roster full, ignoring HELLO from {from}"));
            return;
        }
        debug::log("SESSION", &format!("admitting {from}"));
        self.state.roster.push(Player::new(
            from,
            self.state.field_width,
            self.state.field_height,
        ));
        self.pending_state = true;
    }

    /// Last-writer-wins: the most recent STATE always overwrites the local
    /// board and roster, no version comparison. Accepted limitation: after
    /// a brief split, two leaders may both broadcast and the later arrival
    /// wins.
    fn apply_state(&mut self, from: PeerId, snapshot: StateSnapshot, now: Instant) {
        debug::log(
            "SESSION",
            &format!("state from {from}: level {}, {} players", snapshot.level, snapshot.players.len()),
        );
        self.state.board.flag = snapshot.flag;
        self.state.board.level = snapshot.level;
        self.state.board.baddies = snapshot.baddies;
        self.state.roster = snapshot.players;
        self.state.timer = self.protocol.round_time_ticks;
        self.state.popup = None;
        self.phase = Phase::Playing;
        self.restart_at = None;

        // Seed liveness for roster members we have not heard directly yet;
        // the leader vouched for them just now.
        for player in &self.state.roster {
            if player.id != self.state.my_id {
                self.membership.touch(player.id, now);
            }
        }
    }

    fn apply_level_up(
        &mut self,
        level: u8,
        flag: GridPoint,
        baddie: GridPoint,
        scorer: PeerId,
        now: Instant,
        effects: &mut Vec<Effect>,
    ) {
        self.state.board.level = level;
        self.state.timer = self.protocol.round_time_ticks;

        if let Some(index) = self.state.player_index(scorer) {
            self.state.roster[index].score = self.state.roster[index].score.saturating_add(1);
        }

        let spawned = level % BADDIE_RATE == 0 && level > 0;
        if scorer == self.state.my_id {
            effects.push(Effect::Play(if spawned {
                Cue::LevelUp
            } else {
                Cue::FlagCollected
            }));
        }

        let slot = if spawned {
            let slot = (level / BADDIE_RATE) as usize - 1;
            if slot >= MAX_BADDIES {
                // Obstacle slots exhausted: the round is cleared instead.
                self.round_clear(now, effects);
                return;
            }
            Some(slot)
        } else {
            None
        };

        // The obstacle list must track the carried level in both
        // directions: a cross-round LEVEL_UP can lower the level (we
        // missed the round-reset STATE), and the STATE framing is sized
        // by the level.
        self.state
            .board
            .baddies
            .resize(Board::baddie_count_for(level), GridPoint::default());
        if let Some(slot) = slot {
            self.state.board.baddies[slot] = baddie;
        }

        self.state.board.flag = flag;
    }

    fn apply_player_lost(&mut self, id: PeerId, now: Instant, effects: &mut Vec<Effect>) {
        let Some(index) = self.state.player_index(id) else {
            // Stale or cross-round message.
            return;
        };
        self.state.roster[index].active = false;

        if id == self.state.my_id {
            let score = self.state.roster[index].score;
            self.state.popup = Some(Popup {
                title: "GAME OVER".to_string(),
                lines: vec![format!("score: {score}")],
            });
            effects.push(Effect::Play(Cue::PlayerEliminated));
        }

        match self.state.active_count() {
            0 => {
                if self.state.popup.is_none() {
                    self.state.popup = Some(Popup {
                        title: "ROUND OVER".to_string(),
                        lines: vec!["waiting for restart".to_string()],
                    });
                }
                if self.is_leader() {
                    self.restart_at =
                        Some(now + Duration::from_millis(self.protocol.restart_delay_ms));
                }
            }
            1 => {
                // Sudden death: the sole survivor gets a fresh countdown
                // but must still finish in time.
                self.state.timer = self.protocol.round_time_ticks;
            }
            _ => {}
        }
    }

    /// Leader-only: test every active ball against the obstacles, then the
    /// flag. Elimination takes precedence over scoring, and a player
    /// triggers at most one event per tick.
    fn check_collisions(&mut self, now: Instant, effects: &mut Vec<Effect>) {
        for index in 0..self.state.roster.len() {
            let player = &self.state.roster[index];
            if !player.active {
                continue;
            }
            let (id, ball) = (player.id, player.ball);

            let live = self.state.board.baddie_count().min(self.state.board.baddies.len());
            if self.state.board.baddies[..live]
                .iter()
                .any(|baddie| physics::is_collided(ball, *baddie))
            {
                self.broadcast(effects, Message::PlayerLost { id });
                self.apply_player_lost(id, now, effects);
                continue;
            }

            if physics::is_collided(ball, self.state.board.flag) {
                self.level_up(id, now, effects);
            }
        }
    }

    /// Leader-only: compute the next level and placements, broadcast
    /// LEVEL_UP, then apply it locally through the same handler followers
    /// use.
    fn level_up(&mut self, scorer: PeerId, now: Instant, effects: &mut Vec<Effect>) {
        let level = self.state.board.level + 1;
        let flag = self.place();
        let baddie = if level % BADDIE_RATE == 0 {
            self.place()
        } else {
            GridPoint::default()
        };

        self.broadcast(
            effects,
            Message::LevelUp {
                level,
                flag,
                baddie,
                scorer,
            },
        );
        self.apply_level_up(level, flag, baddie, scorer, now, effects);
    }

    fn round_clear(&mut self, now: Instant, effects: &mut Vec<Effect>) {
        for player in &mut self.state.roster {
            player.active = false;
        }
        self.state.popup = Some(Popup {
            title: "ROUND CLEAR".to_string(),
            lines: self
                .state
                .roster
                .iter()
                .map(|p| format!("{}  {}", p.id, p.score))
                .collect(),
        });
        effects.push(Effect::Play(Cue::RoundCleared));
        if self.is_leader() {
            self.restart_at = Some(now + Duration::from_millis(self.protocol.restart_delay_ms));
        }
    }

    fn drive_local_ball(&mut self, orientation: [f32; 3], effects: &mut Vec<Effect>) {
        let active = self.state.my_player().map(|p| p.active);
        match active {
            Some(true) if self.restart_at.is_none() => {
                physics::update_movement(&mut self.state, orientation, &self.physics);
                if let Some(me) = self.state.my_player() {
                    let pos = me.ball;
                    self.broadcast(effects, Message::Position { pos });
                }
            }
            _ => {
                // Eliminated players and spectators stop sending POSITION;
                // HELLO is their liveness signal (and the spectator's way
                // back in once a slot frees).
                if self.tick_count % self.protocol.hello_retry_ticks as u64 == 0 {
                    effects.push(Effect::Send(Message::Hello));
                }
            }
        }
    }

    fn run_countdown(&mut self, now: Instant, effects: &mut Vec<Effect>) {
        if self.restart_at.is_some() || self.state.active_count() == 0 {
            return;
        }
        if self.state.timer > 0 {
            self.state.timer -= 1;
            return;
        }
        if !self.is_leader() {
            return;
        }
        // Countdown expired: whoever is still rolling is out.
        let expired: Vec<PeerId> = self
            .state
            .roster
            .iter()
            .filter(|p| p.active)
            .map(|p| p.id)
            .collect();
        for id in expired {
            self.broadcast(effects, Message::PlayerLost { id });
            self.apply_player_lost(id, now, effects);
        }
    }

    /// Staleness sweep. Every node prunes its own roster so a dead leader
    /// is eventually dropped everywhere; whichever node becomes the new
    /// minimum announces the compacted roster with STATE.
    fn sweep_membership(&mut self, now: Instant) {
        let timeout = Duration::from_millis(self.protocol.member_timeout_ms);
        let stale = self.membership.evict_stale(now, timeout);
        if stale.is_empty() {
            return;
        }
        let my_id = self.state.my_id;
        let before = self.state.roster.len();
        self.state
            .roster
            .retain(|p| p.id == my_id || !stale.contains(&p.id));
        if self.state.roster.len() < before {
            for id in &stale {
                debug::log("SESSION", &format!("evicted {id} after silence"));
            }
            if self.is_leader() {
                self.pending_state = true;
            }
        }
    }

    fn begin_solo_round(&mut self) {
        debug::log("SESSION", "no session answered, starting a solo round");
        self.phase = Phase::Playing;
        self.start_new_round();
        // Solo: no peers to notify yet.
        self.pending_state = false;
    }

    /// Reset everything for a new round and schedule the announce.
    fn start_new_round(&mut self) {
        let center = self.state.center();
        for player in &mut self.state.roster {
            player.active = true;
            player.score = 0;
            player.ball = center;
        }
        self.state.board.level = 0;
        self.state.board.baddies.clear();
        self.state.board.flag = self.place();
        self.state.speed = FPoint::default();
        self.state.timer = self.protocol.round_time_ticks;
        self.state.popup = None;
        self.restart_at = None;
        self.pending_state = true;
    }

    fn place(&mut self) -> GridPoint {
        let balls: Vec<FPoint> = self
            .state
            .roster
            .iter()
            .filter(|p| p.active)
            .map(|p| p.ball)
            .collect();
        random_place(
            &mut self.rng,
            self.state.field_width,
            self.state.field_height,
            &balls,
        )
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            flag: self.state.board.flag,
            level: self.state.board.level,
            baddies: self.state.board.baddies.clone(),
            players: self.state.roster.clone(),
        }
    }

    /// Session broadcasts are pointless without peers; HELLO is the one
    /// message sent unconditionally.
    fn broadcast(&self, effects: &mut Vec<Effect>, msg: Message) {
        if self.state.roster.len() > 1 {
            effects.push(Effect::Send(msg));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    use crate::session::roster::compute_leader;

    fn id(n: u8) -> PeerId {
        PeerId([n, 0, 0, 0, 0, 0])
    }

    fn engine(n: u8, t0: Instant) -> Engine {
        Engine::new(id(n), &Config::default(), StdRng::seed_from_u64(n as u64), t0)
    }

    /// Tick past the join grace so the node leads a fresh solo round.
    fn solo_leader(n: u8, t0: Instant) -> Engine {
        let mut e = engine(n, t0);
        assert_eq!(e.startup(), vec![Effect::Send(Message::Hello)]);
        e.tick(t0 + Duration::from_secs(2), [0.0; 3]);
        assert!(e.is_leader());
        assert!(!e.is_joining());
        e
    }

    fn sent(effects: &[Effect]) -> Vec<&Message> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Send(msg) => Some(msg),
                Effect::Play(_) => None,
            })
            .collect()
    }

    fn ticks() -> u32 {
        Config::default().protocol.round_time_ticks
    }

    #[test]
    fn lone_node_becomes_leader_after_grace() {
        let t0 = Instant::now();
        let mut e = engine(1, t0);
        e.startup();

        // Still inside the grace interval: nothing happens.
        assert!(e.tick(t0 + Duration::from_millis(10), [0.0; 3]).is_empty());
        assert!(e.is_joining());

        e.tick(t0 + Duration::from_secs(2), [0.0; 3]);
        assert!(!e.is_joining());
        assert!(e.is_leader());
        assert_eq!(e.state.roster.len(), 1);
        assert_eq!(e.state.board.level, 0);
    }

    #[test]
    fn hello_admits_player_and_defers_state_broadcast() {
        let t0 = Instant::now();
        let mut leader = solo_leader(1, t0);
        let now = t0 + Duration::from_secs(3);

        // The receive handler itself must not emit the STATE broadcast.
        let effects = leader.handle_message(id(2), Message::Hello, now);
        assert!(sent(&effects).is_empty());
        assert_eq!(leader.state.roster.len(), 2);

        let effects = leader.tick(now, [0.0; 3]);
        let msgs = sent(&effects);
        let state = msgs
            .iter()
            .find_map(|m| match m {
                Message::State(s) => Some(s),
                _ => None,
            })
            .expect("leader broadcasts STATE after admitting a player");
        assert_eq!(state.players.len(), 2);
    }

    #[test]
    fn both_nodes_converge_on_the_same_leader() {
        // Scenario A: after m1 admits m2 and m2 applies the snapshot,
        // both compute m1 as leader.
        let t0 = Instant::now();
        let mut m1 = solo_leader(1, t0);
        let now = t0 + Duration::from_secs(3);
        m1.handle_message(id(2), Message::Hello, now);
        let effects = m1.tick(now, [0.0; 3]);
        let snapshot = sent(&effects)
            .into_iter()
            .find_map(|m| match m {
                Message::State(s) => Some(s.clone()),
                _ => None,
            })
            .unwrap();

        let mut m2 = engine(2, t0);
        m2.startup();
        m2.handle_message(id(1), Message::State(snapshot), now);

        assert!(!m2.is_joining());
        assert!(m1.is_leader());
        assert!(!m2.is_leader());
        assert_eq!(compute_leader(&m1.state.roster), compute_leader(&m2.state.roster));
    }

    #[test]
    fn full_roster_rejects_further_hellos() {
        let t0 = Instant::now();
        let mut leader = solo_leader(1, t0);
        let now = t0 + Duration::from_secs(3);
        for n in 2..=MAX_PLAYERS as u8 {
            leader.handle_message(id(n), Message::Hello, now);
        }
        assert_eq!(leader.state.roster.len(), MAX_PLAYERS);

        leader.handle_message(id(9), Message::Hello, now);
        assert_eq!(leader.state.roster.len(), MAX_PLAYERS);
        assert_eq!(leader.state.player_index(id(9)), None);
    }

    #[test]
    fn state_apply_is_idempotent() {
        let t0 = Instant::now();
        let now = t0 + Duration::from_secs(1);
        let snapshot = StateSnapshot {
            flag: GridPoint { x: 20, y: 30 },
            level: 7,
            baddies: vec![GridPoint { x: 50, y: 10 }],
            players: vec![
                Player::new(id(1), 128.0, 64.0),
                Player::new(id(2), 128.0, 64.0),
            ],
        };

        let mut follower = engine(2, t0);
        follower.handle_message(id(1), Message::State(snapshot.clone()), now);
        let roster_once = follower.state.roster.clone();
        let board_once = follower.state.board.clone();

        follower.handle_message(id(1), Message::State(snapshot), now);
        assert_eq!(follower.state.roster, roster_once);
        assert_eq!(follower.state.board, board_once);
    }

    #[test]
    fn flag_collision_levels_up_and_spawns_obstacle() {
        // Scenario B: level 4, rate 5; m2 takes the flag -> level 5,
        // score +1, obstacle in slot 0, LEVEL_UP carries level 5.
        let t0 = Instant::now();
        let mut leader = solo_leader(1, t0);
        let now = t0 + Duration::from_secs(3);
        leader.handle_message(id(2), Message::Hello, now);
        leader.tick(now, [0.0; 3]); // drain the roster-change STATE

        leader.state.board.level = 4;
        leader.state.board.flag = GridPoint { x: 100, y: 40 };
        let m2 = leader.state.player_index(id(2)).unwrap();
        leader.state.roster[m2].ball = FPoint { x: 100.0, y: 40.0 };

        let effects = leader.tick(now, [0.0; 3]);
        let level_up = sent(&effects)
            .into_iter()
            .find(|m| matches!(m, Message::LevelUp { .. }))
            .expect("LEVEL_UP broadcast");
        match level_up {
            Message::LevelUp { level, scorer, .. } => {
                assert_eq!(*level, 5);
                assert_eq!(*scorer, id(2));
            }
            _ => unreachable!(),
        }
        assert_eq!(leader.state.board.level, 5);
        assert_eq!(leader.state.roster[m2].score, 1);
        assert_eq!(leader.state.board.baddies.len(), 1);
        // Countdown restarted (minus this tick's decrement).
        assert!(leader.state.timer >= ticks() - 1);
    }

    #[test]
    fn obstacle_hit_beats_flag_in_the_same_tick() {
        let t0 = Instant::now();
        let mut leader = solo_leader(1, t0);
        let now = t0 + Duration::from_secs(3);
        leader.handle_message(id(2), Message::Hello, now);
        leader.tick(now, [0.0; 3]);

        let spot = GridPoint { x: 60, y: 20 };
        leader.state.board.level = 5;
        leader.state.board.baddies = vec![spot];
        leader.state.board.flag = spot;
        let m2 = leader.state.player_index(id(2)).unwrap();
        leader.state.roster[m2].ball = FPoint { x: 60.0, y: 20.0 };

        let effects = leader.tick(now, [0.0; 3]);
        let msgs = sent(&effects);
        assert!(msgs
            .iter()
            .any(|m| matches!(m, Message::PlayerLost { id: lost } if *lost == id(2))));
        assert!(!msgs.iter().any(|m| matches!(m, Message::LevelUp { .. })));
        assert!(!leader.state.roster[m2].active);
        assert_eq!(leader.state.board.level, 5);
    }

    #[test]
    fn countdown_expiry_eliminates_the_survivor() {
        // Scenario C: one active player left, timer hits zero, leader
        // broadcasts PLAYER_LOST and applies it locally.
        let t0 = Instant::now();
        let mut leader = solo_leader(1, t0);
        let now = t0 + Duration::from_secs(3);
        leader.handle_message(id(2), Message::Hello, now);
        leader.tick(now, [0.0; 3]);
        leader.handle_message(id(2), Message::PlayerLost { id: id(2) }, now);
        assert_eq!(leader.state.active_count(), 1);

        leader.state.timer = 0;
        let effects = leader.tick(now, [0.0; 3]);
        assert!(sent(&effects)
            .iter()
            .any(|m| matches!(m, Message::PlayerLost { id: lost } if *lost == id(1))));
        assert_eq!(leader.state.active_count(), 0);
        let popup = leader.state.popup.as_ref().expect("game over popup");
        assert_eq!(popup.title, "GAME OVER");
        assert!(effects.contains(&Effect::Play(Cue::PlayerEliminated)));

        // After the presentation delay the leader resets and announces.
        let later = now + Duration::from_secs(10);
        let effects = leader.tick(later, [0.0; 3]);
        assert!(sent(&effects)
            .iter()
            .any(|m| matches!(m, Message::State(_))));
        assert_eq!(leader.state.active_count(), 2);
        assert_eq!(leader.state.board.level, 0);
        assert!(leader.state.roster.iter().all(|p| p.score == 0));
        assert!(leader.state.popup.is_none());
    }

    #[test]
    fn stale_leader_is_evicted_and_leadership_moves() {
        // Scenario D: follower (id 2) holds roster [1, 2, 3]; the leader
        // (id 1) goes silent while id 3 keeps talking. The sweep drops
        // id 1 and this node becomes the new minimum.
        let t0 = Instant::now();
        let mut follower = engine(2, t0);
        follower.startup();
        follower.handle_message(
            id(1),
            Message::State(StateSnapshot {
                flag: GridPoint { x: 10, y: 10 },
                level: 0,
                baddies: vec![],
                players: vec![
                    Player::new(id(1), 128.0, 64.0),
                    Player::new(id(2), 128.0, 64.0),
                    Player::new(id(3), 128.0, 64.0),
                ],
            }),
            t0,
        );
        assert!(!follower.is_leader());

        // id 3 stays live; id 1 is never heard again.
        let refresh = t0 + Duration::from_secs(4);
        follower.handle_message(
            id(3),
            Message::Position {
                pos: FPoint { x: 5.0, y: 5.0 },
            },
            refresh,
        );

        let late = t0 + Duration::from_millis(5100);
        let sweep_ticks = Config::default().protocol.sweep_interval_ticks;
        let mut announced = false;
        for _ in 0..=sweep_ticks {
            let effects = follower.tick(late, [0.0; 3]);
            announced |= sent(&effects).iter().any(|m| matches!(m, Message::State(_)));
        }

        assert_eq!(follower.state.player_index(id(1)), None);
        assert!(follower.state.player_index(id(3)).is_some());
        assert_eq!(compute_leader(&follower.state.roster), Some(id(2)));
        assert!(follower.is_leader());
        assert!(announced, "new leader announces the compacted roster");
    }

    #[test]
    fn exhausted_obstacle_slots_clear_the_round() {
        let t0 = Instant::now();
        let mut leader = solo_leader(1, t0);
        let now = t0 + Duration::from_secs(3);
        leader.handle_message(id(2), Message::Hello, now);
        leader.tick(now, [0.0; 3]);

        leader.state.board.level = 29;
        leader.state.board.baddies = vec![GridPoint { x: 120, y: 60 }; MAX_BADDIES];
        leader.state.board.flag = GridPoint { x: 30, y: 30 };
        let m2 = leader.state.player_index(id(2)).unwrap();
        leader.state.roster[m2].ball = FPoint { x: 30.0, y: 30.0 };

        let effects = leader.tick(now, [0.0; 3]);
        assert!(effects.contains(&Effect::Play(Cue::RoundCleared)));
        assert_eq!(leader.state.board.level, 30);
        // No sixth obstacle was written.
        assert_eq!(leader.state.board.baddies.len(), MAX_BADDIES);
        assert_eq!(leader.state.active_count(), 0);
        assert_eq!(
            leader.state.popup.as_ref().map(|p| p.title.as_str()),
            Some("ROUND CLEAR")
        );
    }

    #[test]
    fn cross_round_level_up_keeps_obstacles_tracking_the_level() {
        // A node holding a high-level board misses the round-reset STATE
        // and then sees the new round's first LEVEL_UP. The obstacle list
        // must shrink to match the carried level, or every STATE this
        // node later broadcasts as leader is mis-framed for its peers.
        let t0 = Instant::now();
        let now = t0 + Duration::from_secs(1);
        let mut follower = engine(2, t0);
        follower.startup();
        follower.handle_message(
            id(1),
            Message::State(StateSnapshot {
                flag: GridPoint { x: 10, y: 10 },
                level: 25,
                baddies: vec![GridPoint { x: 40, y: 20 }; MAX_BADDIES],
                players: vec![
                    Player::new(id(1), 128.0, 64.0),
                    Player::new(id(2), 128.0, 64.0),
                ],
            }),
            now,
        );
        assert_eq!(follower.state.board.baddies.len(), MAX_BADDIES);

        follower.handle_message(
            id(1),
            Message::LevelUp {
                level: 1,
                flag: GridPoint { x: 60, y: 30 },
                baddie: GridPoint::default(),
                scorer: id(1),
            },
            now,
        );
        assert_eq!(follower.state.board.level, 1);
        assert!(follower.state.board.baddies.is_empty());

        // A spawn-level LEVEL_UP then grows the list back to one slot.
        follower.handle_message(
            id(1),
            Message::LevelUp {
                level: 5,
                flag: GridPoint { x: 80, y: 50 },
                baddie: GridPoint { x: 20, y: 20 },
                scorer: id(1),
            },
            now,
        );
        assert_eq!(
            follower.state.board.baddies.len(),
            Board::baddie_count_for(5)
        );
        assert_eq!(follower.state.board.baddies[0], GridPoint { x: 20, y: 20 });
    }

    #[test]
    fn position_from_unknown_peer_is_ignored() {
        let t0 = Instant::now();
        let mut leader = solo_leader(1, t0);
        let before = leader.state.roster.clone();
        leader.handle_message(
            id(7),
            Message::Position {
                pos: FPoint { x: 1.0, y: 1.0 },
            },
            t0 + Duration::from_secs(3),
        );
        assert_eq!(leader.state.roster, before);
    }

    #[test]
    fn sudden_death_restarts_the_countdown() {
        let t0 = Instant::now();
        let mut leader = solo_leader(1, t0);
        let now = t0 + Duration::from_secs(3);
        leader.handle_message(id(2), Message::Hello, now);
        leader.handle_message(id(3), Message::Hello, now);
        leader.tick(now, [0.0; 3]);

        leader.state.timer = 57;
        leader.handle_message(id(3), Message::PlayerLost { id: id(3) }, now);
        assert_eq!(leader.state.timer, 57, "two players left: no reset");

        leader.handle_message(id(2), Message::PlayerLost { id: id(2) }, now);
        assert_eq!(leader.state.timer, ticks(), "sole survivor gets a fresh countdown");
    }

    #[test]
    fn eliminated_player_falls_back_to_hello_liveness() {
        let t0 = Instant::now();
        let mut leader = solo_leader(1, t0);
        let now = t0 + Duration::from_secs(3);
        leader.handle_message(id(2), Message::Hello, now);
        leader.tick(now, [0.0; 3]);
        leader.handle_message(id(1), Message::PlayerLost { id: id(1) }, now);

        let retry = Config::default().protocol.hello_retry_ticks;
        let mut saw_hello = false;
        let mut saw_position = false;
        for _ in 0..=retry {
            for msg in sent(&leader.tick(now, [0.0; 3])) {
                match msg {
                    Message::Hello => saw_hello = true,
                    Message::Position { .. } => saw_position = true,
                    _ => {}
                }
            }
        }
        assert!(saw_hello);
        assert!(!saw_position, "eliminated players stop sending POSITION");
    }
}
