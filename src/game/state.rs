use std::fmt;

use crate::config::PhysicsConfig;

// Wire-format caps. These size the STATE payload, so they are compile-time
// constants rather than config values.
pub const MAX_PLAYERS: usize = 5;
pub const MAX_BADDIES: usize = 5;

/// A new obstacle is spawned on every nth gathered flag.
pub const BADDIE_RATE: u8 = 5;

/// Spawn margin: flags and obstacles keep this far from the field edge.
pub const BALL_SIZE: f32 = 4.0;

/// 6-byte node identity, unique per running instance. Used as the sole
/// identity key everywhere; the lexicographically smallest identity in the
/// roster is the session leader.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerId(pub [u8; 6]);

impl PeerId {
    pub fn random() -> Self {
        let mut bytes = [0u8; 6];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes[..]);
        PeerId(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({})", self)
    }
}

/// Continuous ball coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FPoint {
    pub x: f32,
    pub y: f32,
}

/// Discrete board coordinate (flag and obstacle positions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridPoint {
    pub x: u8,
    pub y: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PeerId,
    pub score: u8,
    pub active: bool,
    pub ball: FPoint,
}

impl Player {
    pub fn new(id: PeerId, field_width: f32, field_height: f32) -> Self {
        Self {
            id,
            score: 0,
            active: true,
            ball: FPoint {
                x: field_width / 2.0,
                y: field_height / 2.0,
            },
        }
    }
}

/// Shared board: the flag, the live obstacles and the current level.
/// Invariant: `baddies.len() == baddie_count_for(level)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Board {
    pub flag: GridPoint,
    pub baddies: Vec<GridPoint>,
    pub level: u8,
}

impl Board {
    /// How many obstacles are live at `level`.
    pub fn baddie_count_for(level: u8) -> usize {
        ((level / BADDIE_RATE) as usize).min(MAX_BADDIES)
    }

    pub fn baddie_count(&self) -> usize {
        Self::baddie_count_for(self.level)
    }
}

/// Popup requested by the protocol engine, rendered by the UI until the
/// next round clears it.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<String>,
}

/// The single shared mutable record of one session: roster, board, the
/// local ball's velocity and the round countdown. Owned by the protocol
/// engine; nothing else mutates it.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub my_id: PeerId,
    pub roster: Vec<Player>,
    pub board: Board,
    /// Velocity of the locally simulated ball (zeroed on round reset).
    pub speed: FPoint,
    /// Round countdown in ticks; at zero the leader eliminates the
    /// remaining players.
    pub timer: u32,
    pub popup: Option<Popup>,
    pub field_width: f32,
    pub field_height: f32,
}

impl SessionState {
    pub fn new(my_id: PeerId, physics: &PhysicsConfig, timer_ticks: u32) -> Self {
        let me = Player::new(my_id, physics.field_width, physics.field_height);
        Self {
            my_id,
            roster: vec![me],
            board: Board::default(),
            speed: FPoint::default(),
            timer: timer_ticks,
            popup: None,
            field_width: physics.field_width,
            field_height: physics.field_height,
        }
    }

    pub fn player_index(&self, id: PeerId) -> Option<usize> {
        self.roster.iter().position(|p| p.id == id)
    }

    pub fn my_index(&self) -> Option<usize> {
        self.player_index(self.my_id)
    }

    pub fn my_player(&self) -> Option<&Player> {
        self.my_index().map(|i| &self.roster[i])
    }

    pub fn active_count(&self) -> usize {
        self.roster.iter().filter(|p| p.active).count()
    }

    pub fn center(&self) -> FPoint {
        FPoint {
            x: self.field_width / 2.0,
            y: self.field_height / 2.0,
        }
    }
}
