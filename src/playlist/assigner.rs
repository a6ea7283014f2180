use super::constraints::Constraints;
use super::filters::TrackFilters;
use crate::catalog::Catalog;
use crate::models::{Playlist, SlotCategory, SlotEntry, TrackRecord, TrackSlot};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("slot index {0} is out of range (playlists have exactly {len} slots)", len = Playlist::LEN)]
    OutOfRange(usize),
    #[error("no alternative tracks available for this slot")]
    NoAlternatives,
}

/// Assigns one track to each of the ten fixed slots.
///
/// Selection is uniformly random over the per-slot candidate pool; callers
/// inject the RNG so tests can seed it. Fallback precedence for a slot whose
/// themed pool is empty: release-pool pick flagged as `Fallback`, then
/// `NoMatch`. The assigner never fails for an unfillable slot.
pub struct SlotAssigner<'a> {
    catalog: &'a Catalog,
    constraints: Constraints,
}

impl<'a> SlotAssigner<'a> {
    pub fn new(catalog: &'a Catalog, constraints: Constraints) -> Self {
        Self { catalog, constraints }
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// The release-filtered pool fallback picks and fallback re-rolls use.
    pub fn release_pool(&self) -> Vec<&'a TrackRecord> {
        TrackFilters::release_pool(self.catalog, &self.constraints)
    }

    /// The fully filtered pool themed picks and themed re-rolls use.
    pub fn themed_pool(&self) -> Vec<&'a TrackRecord> {
        TrackFilters::themed_pool(self.catalog, &self.constraints)
    }

    /// Build a complete playlist: one entry per category in class order.
    pub fn assign<R: Rng>(&self, rng: &mut R) -> Playlist {
        let release_pool = self.release_pool();
        let themed_pool = TrackFilters::apply_theme(&release_pool, &self.constraints);

        let mut used: HashSet<(String, String)> = HashSet::new();
        let mut entries = Vec::with_capacity(Playlist::LEN);

        for category in SlotCategory::ALL {
            let themed: Vec<&TrackRecord> = themed_pool
                .iter()
                .copied()
                .filter(|t| t.category == category)
                .collect();

            let slot = match pick_unused(&themed, &used, rng) {
                Some(track) => TrackSlot::Picked(track.clone()),
                None => {
                    let fallback: Vec<&TrackRecord> = release_pool
                        .iter()
                        .copied()
                        .filter(|t| t.category == category)
                        .collect();
                    match pick_unused(&fallback, &used, rng) {
                        Some(track) => TrackSlot::Fallback(track.clone()),
                        None => TrackSlot::NoMatch,
                    }
                }
            };

            if let Some(track) = slot.track() {
                used.insert((track.title.clone(), track.artist.clone()));
            }
            entries.push(SlotEntry { category, slot });
        }

        Playlist::from_entries(entries)
    }
}

/// Choose uniformly among candidates not yet used in this build pass. When
/// every candidate is already used, the no-duplicate rule is waived rather
/// than leaving the slot empty.
fn pick_unused<'a, R: Rng>(
    candidates: &[&'a TrackRecord],
    used: &HashSet<(String, String)>,
    rng: &mut R,
) -> Option<&'a TrackRecord> {
    let fresh: Vec<&TrackRecord> = candidates
        .iter()
        .copied()
        .filter(|t| !used.contains(&(t.title.clone(), t.artist.clone())))
        .collect();
    if fresh.is_empty() {
        candidates.choose(rng).copied()
    } else {
        fresh.choose(rng).copied()
    }
}

/// The residual candidates a re-roll of `index` would draw from: pool entries
/// of the slot's category, minus the current occupant (by title + artist +
/// release identity).
pub fn swap_options<'a>(
    playlist: &Playlist,
    index: usize,
    pool: &[&'a TrackRecord],
) -> Result<Vec<&'a TrackRecord>, SlotError> {
    let entry = playlist.entry(index).ok_or(SlotError::OutOfRange(index))?;
    let current = entry.slot.track();
    Ok(pool
        .iter()
        .copied()
        .filter(|t| t.category == entry.category)
        .filter(|t| current.is_none_or(|c| t.identity() != c.identity()))
        .collect())
}

/// Re-roll a single slot from `pool`, leaving the other nine untouched.
///
/// The input playlist is never mutated; on success a new playlist is
/// returned whose only difference is the re-rolled slot. The slot keeps its
/// fill kind: a fallback slot re-rolled from the release pool stays flagged
/// as a fallback.
pub fn reroll_slot<R: Rng>(
    playlist: &Playlist,
    index: usize,
    pool: &[&TrackRecord],
    rng: &mut R,
) -> Result<Playlist, SlotError> {
    let options = swap_options(playlist, index, pool)?;
    let replacement = options.choose(rng).copied().ok_or(SlotError::NoAlternatives)?;

    let mut rerolled = playlist.clone();
    if let Some(entry) = rerolled.entry_mut(index) {
        entry.slot = if entry.slot.is_fallback() {
            TrackSlot::Fallback(replacement.clone())
        } else {
            TrackSlot::Picked(replacement.clone())
        };
    }
    Ok(rerolled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawTrack, ReleaseKey};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn raw_row(track_no: &str, title: &str, release: &str, tags: Option<&str>) -> RawTrack {
        RawTrack {
            track_no: track_no.to_string(),
            title: title.to_string(),
            artist: "Test Artist".to_string(),
            release: release.to_string(),
            duration: "4:00".to_string(),
            genre: Some("Pop".to_string()),
            tags: tags.map(|t| t.to_string()),
        }
    }

    /// Two tracks per category, none tagged.
    fn full_catalog() -> Catalog {
        let mut rows = Vec::new();
        for category in SlotCategory::ALL {
            rows.push(raw_row(category.label(), &format!("{} A", category.body_part()), "100", None));
            rows.push(raw_row(category.label(), &format!("{} B", category.body_part()), "110", None));
        }
        Catalog::from_rows(rows)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_assign_fills_ten_slots_in_class_order() {
        let catalog = full_catalog();
        let assigner = SlotAssigner::new(&catalog, Constraints::default());
        let playlist = assigner.assign(&mut rng());

        assert_eq!(playlist.entries().len(), Playlist::LEN);
        for (entry, category) in playlist.iter().zip(SlotCategory::ALL) {
            assert_eq!(entry.category, category);
            let track = entry.slot.track().expect("slot should be filled");
            assert_eq!(track.category, category);
            assert!(!entry.slot.is_fallback());
        }
    }

    #[test]
    fn test_assign_respects_min_release() {
        let catalog = full_catalog();
        let constraints = Constraints {
            min_release_key: ReleaseKey::new(110.0),
            ..Constraints::default()
        };
        let assigner = SlotAssigner::new(&catalog, constraints);
        let playlist = assigner.assign(&mut rng());

        for entry in playlist.iter() {
            let track = entry.slot.track().expect("slot should be filled");
            assert!(track.release_key >= ReleaseKey::new(110.0));
        }
    }

    #[test]
    fn test_assign_avoids_duplicate_songs() {
        // Same song title/artist listed under two categories: the second
        // slot must pick its other candidate.
        let catalog = Catalog::from_rows(vec![
            raw_row("1 - Warmup", "Shared Song", "100", None),
            raw_row("2 - Squats", "Shared Song", "100", None),
            raw_row("2 - Squats", "Unique Song", "100", None),
        ]);
        let assigner = SlotAssigner::new(&catalog, Constraints::default());

        for seed in 0..20 {
            let playlist = assigner.assign(&mut StdRng::seed_from_u64(seed));
            let warmup = playlist.entry(0).unwrap().slot.track().unwrap();
            let squats = playlist.entry(1).unwrap().slot.track().unwrap();
            assert_eq!(warmup.title, "Shared Song");
            assert_eq!(squats.title, "Unique Song");
        }
    }

    #[test]
    fn test_duplicate_rule_waived_when_pool_exhausted() {
        let catalog = Catalog::from_rows(vec![
            raw_row("1 - Warmup", "Only Song", "100", None),
            raw_row("2 - Squats", "Only Song", "100", None),
        ]);
        let assigner = SlotAssigner::new(&catalog, Constraints::default());
        let playlist = assigner.assign(&mut rng());

        // Duplication beats an empty slot.
        assert_eq!(playlist.entry(0).unwrap().slot.track().unwrap().title, "Only Song");
        assert_eq!(playlist.entry(1).unwrap().slot.track().unwrap().title, "Only Song");
    }

    #[test]
    fn test_themed_miss_falls_back_with_flag() {
        let catalog = Catalog::from_rows(vec![
            raw_row("1 - Warmup", "Tagged Warmup", "100", Some("Halloween")),
            raw_row("2 - Squats", "Plain Squats", "100", None),
        ]);
        let constraints = Constraints {
            theme_tags: vec!["Halloween".to_string()],
            ..Constraints::default()
        };
        let assigner = SlotAssigner::new(&catalog, constraints);
        let playlist = assigner.assign(&mut rng());

        let warmup = playlist.entry(0).unwrap();
        assert_eq!(warmup.slot, TrackSlot::Picked(catalog.tracks()[0].clone()));

        let squats = playlist.entry(1).unwrap();
        assert!(squats.slot.is_fallback());
        assert_eq!(squats.slot.track().unwrap().title, "Plain Squats");

        assert_eq!(playlist.fallback_categories(), vec![SlotCategory::Squats]);
    }

    #[test]
    fn test_empty_pool_yields_no_match_not_a_panic() {
        let catalog = Catalog::from_rows(vec![raw_row("1 - Warmup", "Lone Warmup", "100", None)]);
        let assigner = SlotAssigner::new(&catalog, Constraints::default());
        let playlist = assigner.assign(&mut rng());

        assert!(playlist.entry(0).unwrap().slot.track().is_some());
        for entry in playlist.entries().iter().skip(1) {
            assert!(entry.slot.is_no_match());
        }
    }

    #[test]
    fn test_reroll_replaces_only_the_requested_slot() {
        let catalog = full_catalog();
        let assigner = SlotAssigner::new(&catalog, Constraints::default());
        let playlist = assigner.assign(&mut rng());
        let pool = assigner.themed_pool();

        let rerolled = reroll_slot(&playlist, 3, &pool, &mut rng()).unwrap();

        let before = playlist.entry(3).unwrap().slot.track().unwrap();
        let after = rerolled.entry(3).unwrap().slot.track().unwrap();
        assert_ne!(before.identity(), after.identity());
        assert_eq!(after.category, SlotCategory::Back);

        for index in (0..Playlist::LEN).filter(|&i| i != 3) {
            assert_eq!(playlist.entry(index), rerolled.entry(index));
        }
    }

    #[test]
    fn test_reroll_with_no_alternatives_is_an_explicit_noop() {
        let catalog = Catalog::from_rows(vec![raw_row("1 - Warmup", "Lone Warmup", "100", None)]);
        let assigner = SlotAssigner::new(&catalog, Constraints::default());
        let playlist = assigner.assign(&mut rng());
        let pool = assigner.themed_pool();

        let err = reroll_slot(&playlist, 0, &pool, &mut rng()).unwrap_err();
        assert_eq!(err, SlotError::NoAlternatives);
    }

    #[test]
    fn test_reroll_out_of_range() {
        let catalog = full_catalog();
        let assigner = SlotAssigner::new(&catalog, Constraints::default());
        let playlist = assigner.assign(&mut rng());
        let pool = assigner.themed_pool();

        let err = reroll_slot(&playlist, Playlist::LEN, &pool, &mut rng()).unwrap_err();
        assert_eq!(err, SlotError::OutOfRange(Playlist::LEN));
    }

    #[test]
    fn test_reroll_of_no_match_slot_picks_anything_in_category() {
        let playlist = Playlist::empty();
        let catalog = full_catalog();
        let pool: Vec<&TrackRecord> = catalog.tracks().iter().collect();

        let rerolled = reroll_slot(&playlist, 2, &pool, &mut rng()).unwrap();
        let chest = rerolled.entry(2).unwrap();
        assert_eq!(chest.slot.track().unwrap().category, SlotCategory::Chest);
        assert!(!chest.slot.is_no_match());
    }

    #[test]
    fn test_rerolls_on_different_slots_commute() {
        let catalog = full_catalog();
        let assigner = SlotAssigner::new(&catalog, Constraints::default());
        let playlist = assigner.assign(&mut rng());
        let pool = assigner.themed_pool();

        // Same per-call random outcomes: each call gets a fresh seeded RNG.
        let ab = {
            let first = reroll_slot(&playlist, 1, &pool, &mut StdRng::seed_from_u64(7)).unwrap();
            reroll_slot(&first, 8, &pool, &mut StdRng::seed_from_u64(9)).unwrap()
        };
        let ba = {
            let first = reroll_slot(&playlist, 8, &pool, &mut StdRng::seed_from_u64(9)).unwrap();
            reroll_slot(&first, 1, &pool, &mut StdRng::seed_from_u64(7)).unwrap()
        };
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_fallback_slot_stays_fallback_after_reroll() {
        let catalog = Catalog::from_rows(vec![
            raw_row("1 - Warmup", "Plain A", "100", None),
            raw_row("1 - Warmup", "Plain B", "100", None),
        ]);
        let constraints = Constraints {
            theme_tags: vec!["Halloween".to_string()],
            ..Constraints::default()
        };
        let assigner = SlotAssigner::new(&catalog, constraints);
        let playlist = assigner.assign(&mut rng());
        assert!(playlist.entry(0).unwrap().slot.is_fallback());

        let release_pool = assigner.release_pool();
        let rerolled = reroll_slot(&playlist, 0, &release_pool, &mut rng()).unwrap();
        assert!(rerolled.entry(0).unwrap().slot.is_fallback());
    }

    #[test]
    fn test_swap_options_exclude_current_occupant() {
        let catalog = full_catalog();
        let assigner = SlotAssigner::new(&catalog, Constraints::default());
        let playlist = assigner.assign(&mut rng());
        let pool = assigner.themed_pool();

        let options = swap_options(&playlist, 0, &pool).unwrap();
        let current = playlist.entry(0).unwrap().slot.track().unwrap();
        assert_eq!(options.len(), 1);
        assert_ne!(options[0].identity(), current.identity());
        assert_eq!(options[0].category, SlotCategory::Warmup);
    }
}
