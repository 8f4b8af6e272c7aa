//! Keyboard tilt emulation of the motion sensor.
//!
//! The arrow keys nudge a persistent tilt vector which is read once per
//! tick as the `(x, y, z)` orientation sample, standing in for the
//! accelerometer a handheld build would poll. Space levels the device.

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    TiltUp,
    TiltDown,
    TiltLeft,
    TiltRight,
    Level,
}

/// Poll for input events and return actions.
/// Each Press event generates an immediate action - no state tracking needed.
pub fn poll_input() -> Result<Vec<InputAction>, std::io::Error> {
    let mut actions = Vec::new();

    // Process all pending Press events
    while event::poll(Duration::from_millis(0))? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        actions.push(InputAction::Quit);
                    }
                    KeyCode::Up => actions.push(InputAction::TiltUp),
                    KeyCode::Down => actions.push(InputAction::TiltDown),
                    KeyCode::Left => actions.push(InputAction::TiltLeft),
                    KeyCode::Right => actions.push(InputAction::TiltRight),
                    KeyCode::Char(' ') => actions.push(InputAction::Level),
                    _ => {}
                }
            }
        }
    }

    Ok(actions)
}

/// Tilt per key press, in g. A few presses reach full tilt.
const TILT_STEP: f32 = 0.25;
const MAX_TILT: f32 = 1.0;

#[derive(Debug, Default)]
pub struct TiltSensor {
    tilt: [f32; 3],
}

impl TiltSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, action: InputAction) {
        match action {
            // Axis signs follow the sensor frame the physics expects:
            // speed.x grows with -x tilt, speed.y grows with +y tilt.
            InputAction::TiltRight => self.tilt[0] -= TILT_STEP,
            InputAction::TiltLeft => self.tilt[0] += TILT_STEP,
            InputAction::TiltDown => self.tilt[1] += TILT_STEP,
            InputAction::TiltUp => self.tilt[1] -= TILT_STEP,
            InputAction::Level => self.tilt = [0.0; 3],
            InputAction::Quit => {}
        }
        self.tilt[0] = self.tilt[0].clamp(-MAX_TILT, MAX_TILT);
        self.tilt[1] = self.tilt[1].clamp(-MAX_TILT, MAX_TILT);
    }

    /// The current orientation sample, polled once per tick.
    pub fn read_orientation(&self) -> [f32; 3] {
        self.tilt
    }
}
