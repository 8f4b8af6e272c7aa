pub mod input;
pub mod physics;
pub mod placement;
pub mod state;

pub use input::{poll_input, InputAction, TiltSensor};
pub use state::{PeerId, SessionState};
