//! Role resolver: leadership is derived from the roster, never stored.
//!
//! The leader is the roster member with the lexicographically smallest
//! identity. Inactive members still count — elimination is per-round, not
//! per-session — so a dead-but-present player can hold leadership until
//! the membership sweep removes it.

use crate::game::state::{PeerId, Player};

/// Deterministically compute the current leader from a roster snapshot.
/// Returns `None` only for an empty roster, which a running node never
/// has (it always contains itself).
pub fn compute_leader(roster: &[Player]) -> Option<PeerId> {
    roster.iter().map(|p| p.id).min()
}

/// Whether `self_id` is the authoritative node for this roster snapshot.
/// Call fresh after every roster mutation; leadership must not be cached.
pub fn is_leader(self_id: PeerId, roster: &[Player]) -> bool {
    compute_leader(roster) == Some(self_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: [u8; 6]) -> Player {
        Player::new(PeerId(id), 128.0, 64.0)
    }

    #[test]
    fn leader_is_lexicographic_minimum() {
        let roster = vec![
            player([0x20, 0, 0, 0, 0, 1]),
            player([0x10, 0, 0, 0, 0, 9]),
            player([0x10, 0, 0, 0, 0, 2]),
        ];
        assert_eq!(
            compute_leader(&roster),
            Some(PeerId([0x10, 0, 0, 0, 0, 2]))
        );
    }

    #[test]
    fn leader_is_deterministic() {
        let roster = vec![player([3, 3, 3, 3, 3, 3]), player([1, 1, 1, 1, 1, 1])];
        let first = compute_leader(&roster);
        for _ in 0..10 {
            assert_eq!(compute_leader(&roster), first);
        }
    }

    #[test]
    fn inactive_members_still_count() {
        let mut roster = vec![player([1, 0, 0, 0, 0, 0]), player([2, 0, 0, 0, 0, 0])];
        roster[0].active = false;
        assert_eq!(compute_leader(&roster), Some(PeerId([1, 0, 0, 0, 0, 0])));
    }

    #[test]
    fn both_nodes_agree_on_leader() {
        // Scenario A: roster [m1, m2] with m1 < m2 yields m1 everywhere,
        // regardless of insertion order.
        let m1 = [0x0a, 0, 0, 0, 0, 0];
        let m2 = [0x0b, 0, 0, 0, 0, 0];
        let on_m1 = vec![player(m1), player(m2)];
        let on_m2 = vec![player(m2), player(m1)];
        assert_eq!(compute_leader(&on_m1), compute_leader(&on_m2));
        assert!(is_leader(PeerId(m1), &on_m1));
        assert!(!is_leader(PeerId(m2), &on_m2));
    }

    #[test]
    fn single_member_roster_leads_itself() {
        let me = PeerId([9, 9, 9, 9, 9, 9]);
        assert!(is_leader(me, &[Player::new(me, 128.0, 64.0)]));
    }
}
