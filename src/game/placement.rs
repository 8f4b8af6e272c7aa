//! Random flag/obstacle placement.
//!
//! Rejection sampling: draw a uniform point inside the field margins and
//! accept it only if it keeps a minimum Manhattan distance to every active
//! player's ball. The retry loop is bounded; if no draw qualifies, the
//! best candidate seen (largest minimum separation) is used so placement
//! always terminates, even on a crowded field.

use rand::Rng;

use crate::game::state::{FPoint, GridPoint, BALL_SIZE};

/// Manhattan distance below which a spawn is too close to a ball.
pub const MIN_DISTANCE: f32 = 30.0;

const MAX_TRIES: u32 = 32;

pub fn random_place<R: Rng>(
    rng: &mut R,
    field_width: f32,
    field_height: f32,
    active_balls: &[FPoint],
) -> GridPoint {
    let mut best: Option<(GridPoint, f32)> = None;

    for _ in 0..MAX_TRIES {
        let point = GridPoint {
            x: rng.gen_range(BALL_SIZE as u8..(field_width - BALL_SIZE) as u8),
            y: rng.gen_range(BALL_SIZE as u8..(field_height - BALL_SIZE) as u8),
        };
        let separation = active_balls
            .iter()
            .map(|ball| manhattan(point, *ball))
            .fold(f32::INFINITY, f32::min);
        if separation >= MIN_DISTANCE {
            return point;
        }
        if best.map_or(true, |(_, s)| separation > s) {
            best = Some((point, separation));
        }
    }

    // Crowded field: no draw qualified, take the least-bad one.
    best.map(|(p, _)| p).unwrap_or_default()
}

fn manhattan(point: GridPoint, ball: FPoint) -> f32 {
    (point.x as f32 - ball.x).abs() + (point.y as f32 - ball.y).abs()
}
