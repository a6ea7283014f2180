use super::assigner::{reroll_slot, SlotError};
use crate::models::{Playlist, TrackRecord, TrackSlot};
use rand::Rng;

/// The one mutable piece of a session: the playlist currently on screen.
///
/// Each user action (build, re-roll, manual pick, clear) is a synchronous
/// whole operation against this state; a failed re-roll leaves it untouched.
/// Owned by a single session, not thread-safe by design.
#[derive(Debug, Clone)]
pub struct PlaylistState {
    playlist: Playlist,
}

impl PlaylistState {
    pub fn new() -> Self {
        Self {
            playlist: Playlist::empty(),
        }
    }

    /// Replace the whole playlist, as a fresh build does.
    pub fn set(&mut self, playlist: Playlist) {
        self.playlist = playlist;
    }

    /// Read-only snapshot of the current playlist.
    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Manually overwrite one slot with a chosen track.
    pub fn replace_slot(&mut self, index: usize, track: TrackRecord) -> Result<(), SlotError> {
        let entry = self
            .playlist
            .entry_mut(index)
            .ok_or(SlotError::OutOfRange(index))?;
        entry.slot = TrackSlot::Picked(track);
        Ok(())
    }

    /// Empty one slot back to its unfilled marker.
    pub fn clear_slot(&mut self, index: usize) -> Result<(), SlotError> {
        let entry = self
            .playlist
            .entry_mut(index)
            .ok_or(SlotError::OutOfRange(index))?;
        entry.slot = TrackSlot::NoMatch;
        Ok(())
    }

    /// Re-roll one slot from `pool`, committing only on success.
    pub fn reroll<R: Rng>(
        &mut self,
        index: usize,
        pool: &[&TrackRecord],
        rng: &mut R,
    ) -> Result<(), SlotError> {
        self.playlist = reroll_slot(&self.playlist, index, pool, rng)?;
        Ok(())
    }
}

impl Default for PlaylistState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReleaseKey, SlotCategory};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn track(category: SlotCategory, title: &str) -> TrackRecord {
        TrackRecord {
            category,
            title: title.to_string(),
            artist: "Test Artist".to_string(),
            release: "100".to_string(),
            release_key: ReleaseKey::new(100.0),
            duration_secs: 240,
            genre: "Pop".to_string(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_starts_with_ten_unfilled_slots() {
        let state = PlaylistState::new();
        assert_eq!(state.playlist().entries().len(), Playlist::LEN);
        assert!(state.playlist().iter().all(|e| e.slot.is_no_match()));
    }

    #[test]
    fn test_replace_slot_is_a_total_overwrite() {
        let mut state = PlaylistState::new();
        state
            .replace_slot(2, track(SlotCategory::Chest, "Manual Pick"))
            .unwrap();

        let entry = state.playlist().entry(2).unwrap();
        assert_eq!(entry.slot.track().unwrap().title, "Manual Pick");
        assert!(!entry.slot.is_fallback());
        assert!(state
            .playlist()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 2)
            .all(|(_, e)| e.slot.is_no_match()));
    }

    #[test]
    fn test_clear_slot_restores_the_unfilled_marker() {
        let mut state = PlaylistState::new();
        state
            .replace_slot(5, track(SlotCategory::Biceps, "Temp"))
            .unwrap();
        state.clear_slot(5).unwrap();
        assert!(state.playlist().entry(5).unwrap().slot.is_no_match());
    }

    #[test]
    fn test_out_of_range_indices_are_rejected() {
        let mut state = PlaylistState::new();
        assert_eq!(
            state.replace_slot(10, track(SlotCategory::Core, "X")),
            Err(SlotError::OutOfRange(10))
        );
        assert_eq!(state.clear_slot(99), Err(SlotError::OutOfRange(99)));
    }

    #[test]
    fn test_failed_reroll_leaves_state_untouched() {
        let mut state = PlaylistState::new();
        state
            .replace_slot(0, track(SlotCategory::Warmup, "Current"))
            .unwrap();
        let before = state.playlist().clone();

        let current = track(SlotCategory::Warmup, "Current");
        let pool = [&current];
        let err = state
            .reroll(0, &pool, &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert_eq!(err, SlotError::NoAlternatives);
        assert_eq!(state.playlist(), &before);
    }

    #[test]
    fn test_successful_reroll_commits() {
        let mut state = PlaylistState::new();
        state
            .replace_slot(0, track(SlotCategory::Warmup, "Current"))
            .unwrap();

        let other = track(SlotCategory::Warmup, "Other");
        let pool = [&other];
        state.reroll(0, &pool, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(
            state.playlist().entry(0).unwrap().slot.track().unwrap().title,
            "Other"
        );
    }
}
