pub mod braille;
pub mod overlay;
pub mod render;

pub use render::{render, HudInfo};
