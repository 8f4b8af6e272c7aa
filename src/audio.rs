//! Asynchronous jingle player.
//!
//! Cues are fire-and-forget: firing a new cue supersedes whatever is
//! playing. The jukebox is stepped once per tick like the rest of the
//! simulation, so a melody plays out over several frames while the game
//! keeps running. The terminal has no tone generator; the current note is
//! exposed so the UI can flash it and the debug log records every cue.

use crate::debug;

/// Named jingles the session can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    FlagCollected,
    LevelUp,
    PlayerEliminated,
    RoundCleared,
}

/// (frequency Hz, duration in ticks); zero duration terminates.
type Note = (u16, u16);

const TONES_FLAG: &[Note] = &[(698, 1), (880, 1), (1047, 1)];
const TONES_LEVEL: &[Note] = &[(1047, 1), (988, 1), (1047, 1), (988, 1), (1047, 1)];
const TONES_SAD: &[Note] = &[(262, 10), (247, 10), (233, 10), (220, 30)];
const TONES_END: &[Note] = &[(392, 4), (523, 4), (659, 4), (784, 8), (659, 4), (784, 16)];

#[derive(Debug, Default)]
pub struct Jukebox {
    melody: Option<&'static [Note]>,
    /// Ticks elapsed since the melody started.
    elapsed: u16,
}

impl Jukebox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a jingle, superseding any melody in progress.
    pub fn fire(&mut self, cue: Cue) {
        debug::log("AUDIO", &format!("cue {cue:?}"));
        self.melody = Some(match cue {
            Cue::FlagCollected => TONES_FLAG,
            Cue::LevelUp => TONES_LEVEL,
            Cue::PlayerEliminated => TONES_SAD,
            Cue::RoundCleared => TONES_END,
        });
        self.elapsed = 0;
    }

    /// Advance one tick; returns the frequency currently sounding.
    pub fn tick(&mut self) -> Option<u16> {
        let melody = self.melody?;
        let mut total = 0;
        for &(freq, duration) in melody {
            total += duration;
            if self.elapsed < total {
                self.elapsed += 1;
                return Some(freq);
            }
        }
        self.melody = None;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn melody_plays_out_and_stops() {
        let mut jukebox = Jukebox::new();
        jukebox.fire(Cue::FlagCollected);

        // Three one-tick notes.
        assert_eq!(jukebox.tick(), Some(698));
        assert_eq!(jukebox.tick(), Some(880));
        assert_eq!(jukebox.tick(), Some(1047));
        assert_eq!(jukebox.tick(), None);
    }

    #[test]
    fn new_cue_supersedes_current_melody() {
        let mut jukebox = Jukebox::new();
        jukebox.fire(Cue::PlayerEliminated);
        jukebox.tick();
        jukebox.fire(Cue::RoundCleared);
        // The superseding melody sounds from its first note.
        assert_eq!(jukebox.tick(), Some(392));
        assert_eq!(jukebox.tick(), Some(392));
    }

    #[test]
    fn idle_jukebox_is_silent() {
        let mut jukebox = Jukebox::new();
        assert_eq!(jukebox.tick(), None);
    }
}
