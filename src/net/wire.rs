//! Wire codec for the five session messages.
//!
//! Layouts are fixed-width and little-endian, tagged by a one-byte ASCII
//! header so independently built nodes stay byte-compatible. STATE is the
//! only variable-length message: trailing unused obstacle and player slots
//! are omitted, sized by the carried level and roster length.
//!
//! Decode failures are never fatal; the caller drops the datagram and
//! waits for the next periodic broadcast.

use thiserror::Error;

use crate::game::state::{Board, FPoint, GridPoint, PeerId, Player, MAX_PLAYERS};

pub const TAG_HELLO: u8 = b'E';
pub const TAG_STATE: u8 = b'L';
pub const TAG_POSITION: u8 = b'P';
pub const TAG_LEVEL_UP: u8 = b'U';
pub const TAG_PLAYER_LOST: u8 = b'F';

/// One player slot on the wire: id + score + active + ball x/y.
const PLAYER_LEN: usize = 6 + 1 + 1 + 4 + 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("empty datagram")]
    Empty,
    #[error("unknown message tag {0:#04x}")]
    UnknownTag(u8),
    #[error("malformed '{tag}' message: need {need} bytes, got {got}")]
    Truncated { tag: char, need: usize, got: usize },
    #[error("state message carries {0} players (max {MAX_PLAYERS})")]
    RosterOverflow(u8),
}

/// The leader's full authoritative snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub flag: GridPoint,
    pub level: u8,
    pub baddies: Vec<GridPoint>,
    pub players: Vec<Player>,
}

/// The five session messages. The sender identity is not part of the
/// message body; the transport adapter carries it alongside the payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Announce presence / request the current state.
    Hello,
    /// Leader's full snapshot; receivers overwrite unconditionally.
    State(StateSnapshot),
    /// The sender's current ball coordinate. Doubles as a liveness signal.
    Position { pos: FPoint },
    /// A flag was collected: new level, new flag, possibly a new obstacle
    /// (zero-valued when none spawned), and who scored.
    LevelUp {
        level: u8,
        flag: GridPoint,
        baddie: GridPoint,
        scorer: PeerId,
    },
    /// `id` hit an obstacle (or timed out) and is out for this round.
    PlayerLost { id: PeerId },
}

impl Message {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Message::Hello => vec![TAG_HELLO],
            Message::State(snapshot) => {
                let mut buf = Vec::with_capacity(
                    5 + snapshot.baddies.len() * 2 + snapshot.players.len() * PLAYER_LEN,
                );
                buf.push(TAG_STATE);
                push_grid(&mut buf, snapshot.flag);
                buf.push(snapshot.level);
                debug_assert_eq!(
                    snapshot.baddies.len(),
                    Board::baddie_count_for(snapshot.level)
                );
                for baddie in &snapshot.baddies {
                    push_grid(&mut buf, *baddie);
                }
                buf.push(snapshot.players.len() as u8);
                for player in &snapshot.players {
                    buf.extend_from_slice(player.id.as_bytes());
                    buf.push(player.score);
                    buf.push(player.active as u8);
                    buf.extend_from_slice(&player.ball.x.to_le_bytes());
                    buf.extend_from_slice(&player.ball.y.to_le_bytes());
                }
                buf
            }
            Message::Position { pos } => {
                let mut buf = Vec::with_capacity(9);
                buf.push(TAG_POSITION);
                buf.extend_from_slice(&pos.x.to_le_bytes());
                buf.extend_from_slice(&pos.y.to_le_bytes());
                buf
            }
            Message::LevelUp {
                level,
                flag,
                baddie,
                scorer,
            } => {
                let mut buf = Vec::with_capacity(12);
                buf.push(TAG_LEVEL_UP);
                buf.push(*level);
                push_grid(&mut buf, *flag);
                push_grid(&mut buf, *baddie);
                buf.extend_from_slice(scorer.as_bytes());
                buf
            }
            Message::PlayerLost { id } => {
                let mut buf = Vec::with_capacity(7);
                buf.push(TAG_PLAYER_LOST);
                buf.extend_from_slice(id.as_bytes());
                buf
            }
        }
    }

    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        let (&tag, body) = buf.split_first().ok_or(WireError::Empty)?;
        let mut reader = Reader::new(tag, body);
        match tag {
            TAG_HELLO => Ok(Message::Hello),
            TAG_STATE => {
                let flag = reader.grid()?;
                let level = reader.u8()?;
                let baddie_count = Board::baddie_count_for(level);
                let mut baddies = Vec::with_capacity(baddie_count);
                for _ in 0..baddie_count {
                    baddies.push(reader.grid()?);
                }
                let player_count = reader.u8()?;
                if player_count as usize > MAX_PLAYERS {
                    return Err(WireError::RosterOverflow(player_count));
                }
                let mut players = Vec::with_capacity(player_count as usize);
                for _ in 0..player_count {
                    let id = reader.peer_id()?;
                    let score = reader.u8()?;
                    let active = reader.u8()? != 0;
                    let ball = FPoint {
                        x: reader.f32()?,
                        y: reader.f32()?,
                    };
                    players.push(Player {
                        id,
                        score,
                        active,
                        ball,
                    });
                }
                Ok(Message::State(StateSnapshot {
                    flag,
                    level,
                    baddies,
                    players,
                }))
            }
            TAG_POSITION => Ok(Message::Position {
                pos: FPoint {
                    x: reader.f32()?,
                    y: reader.f32()?,
                },
            }),
            TAG_LEVEL_UP => Ok(Message::LevelUp {
                level: reader.u8()?,
                flag: reader.grid()?,
                baddie: reader.grid()?,
                scorer: reader.peer_id()?,
            }),
            TAG_PLAYER_LOST => Ok(Message::PlayerLost {
                id: reader.peer_id()?,
            }),
            other => Err(WireError::UnknownTag(other)),
        }
    }
}

fn push_grid(buf: &mut Vec<u8>, point: GridPoint) {
    buf.push(point.x);
    buf.push(point.y);
}

/// Cursor over a message body; every read is bounds-checked so truncated
/// datagrams fail cleanly instead of partially applying.
struct Reader<'a> {
    tag: u8,
    body: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(tag: u8, body: &'a [u8]) -> Self {
        Self { tag, body, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        let end = self.pos + len;
        if end > self.body.len() {
            return Err(WireError::Truncated {
                tag: self.tag as char,
                need: end + 1,
                got: self.body.len() + 1,
            });
        }
        let slice = &self.body[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    fn f32(&mut self) -> Result<f32, WireError> {
        let bytes = self.take(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn grid(&mut self) -> Result<GridPoint, WireError> {
        let bytes = self.take(2)?;
        Ok(GridPoint {
            x: bytes[0],
            y: bytes[1],
        })
    }

    fn peer_id(&mut self) -> Result<PeerId, WireError> {
        let bytes = self.take(6)?;
        let mut id = [0u8; 6];
        id.copy_from_slice(bytes);
        Ok(PeerId(id))
    }
}
