//! Local simulation tick: the physics for the ball this node owns.
//!
//! Only the local ball is simulated; remote balls are whatever the last
//! POSITION broadcast said. Collision against flags and obstacles is the
//! leader's job (see the session engine) and uses the shared predicate
//! below.

use crate::config::PhysicsConfig;
use crate::game::state::{FPoint, GridPoint, SessionState, BALL_SIZE};

/// Per-axis collision threshold in field units (strict on both axes).
pub const COLLISION_THRESHOLD: f32 = 3.0;

/// A ball touches a board point when both coordinate deltas are inside
/// the threshold. Independent per-axis test, not Euclidean distance.
pub fn is_collided(ball: FPoint, point: GridPoint) -> bool {
    (ball.x - point.x as f32).abs() < COLLISION_THRESHOLD
        && (ball.y - point.y as f32).abs() < COLLISION_THRESHOLD
}

/// Advance the local ball by the current velocity, then fold the tilt
/// sample into the velocity for the next tick.
pub fn update_movement(state: &mut SessionState, orientation: [f32; 3], physics: &PhysicsConfig) {
    let Some(index) = state.my_index() else {
        return;
    };
    state.roster[index].ball.x += state.speed.x;
    state.roster[index].ball.y += state.speed.y;

    state.speed.x += physics.acc_factor * -orientation[0];
    state.speed.y += physics.acc_factor * orientation[1];
}

/// Bounce off the field walls with a diminishing factor.
pub fn bounce(state: &mut SessionState, physics: &PhysicsConfig) {
    let Some(index) = state.my_index() else {
        return;
    };
    let ball = state.roster[index].ball;
    if (state.speed.x > 0.0 && ball.x >= state.field_width - BALL_SIZE)
        || (state.speed.x < 0.0 && ball.x <= BALL_SIZE)
    {
        state.speed.x *= physics.bounce_factor;
    }
    if (state.speed.y > 0.0 && ball.y >= state.field_height - BALL_SIZE)
        || (state.speed.y < 0.0 && ball.y <= BALL_SIZE)
    {
        state.speed.y *= physics.bounce_factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::PeerId;

    fn test_state() -> SessionState {
        SessionState::new(
            PeerId([1, 2, 3, 4, 5, 6]),
            &PhysicsConfig::default(),
            200,
        )
    }

    #[test]
    fn collision_is_strict_per_axis() {
        let point = GridPoint { x: 50, y: 30 };

        // Equal points always collide.
        assert!(is_collided(FPoint { x: 50.0, y: 30.0 }, point));

        // Inside the threshold on both axes.
        assert!(is_collided(FPoint { x: 52.9, y: 27.1 }, point));

        // Exactly 3 away on one axis never collides.
        assert!(!is_collided(FPoint { x: 53.0, y: 30.0 }, point));
        assert!(!is_collided(FPoint { x: 50.0, y: 27.0 }, point));

        // Close on one axis is not enough.
        assert!(!is_collided(FPoint { x: 50.0, y: 40.0 }, point));
    }

    #[test]
    fn tilt_accelerates_the_ball() {
        let mut state = test_state();
        let physics = PhysicsConfig::default();
        let start = state.roster[0].ball;

        update_movement(&mut state, [-1.0, 1.0, 0.0], &physics);
        assert_eq!(state.speed.x, physics.acc_factor);
        assert_eq!(state.speed.y, physics.acc_factor);
        // Position moves by the velocity from before the sample.
        assert_eq!(state.roster[0].ball, start);

        update_movement(&mut state, [0.0, 0.0, 0.0], &physics);
        assert!(state.roster[0].ball.x > start.x);
        assert!(state.roster[0].ball.y > start.y);
    }

    #[test]
    fn wall_bounce_reverses_and_dampens() {
        let mut state = test_state();
        let physics = PhysicsConfig::default();
        state.roster[0].ball.x = state.field_width - BALL_SIZE;
        state.speed.x = 2.0;

        bounce(&mut state, &physics);
        assert_eq!(state.speed.x, 2.0 * physics.bounce_factor);
        assert!(state.speed.x < 0.0);
    }

    #[test]
    fn bounce_ignores_balls_heading_inward() {
        let mut state = test_state();
        let physics = PhysicsConfig::default();
        state.roster[0].ball.x = state.field_width - BALL_SIZE;
        state.speed.x = -2.0;

        bounce(&mut state, &physics);
        assert_eq!(state.speed.x, -2.0);
    }
}
