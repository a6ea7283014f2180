use super::constraints::{Constraints, RECENT_RELEASE_COUNT};
use crate::catalog::Catalog;
use crate::models::{ReleaseKey, TrackRecord};

/// Eligibility filtering as pure helper functions.
///
/// Every function here is deterministic and order-preserving: the same
/// catalog and constraints always yield the same rows in catalog order.
pub struct TrackFilters;

impl TrackFilters {
    /// Check the earliest-release boundary.
    pub fn matches_min_release(track: &TrackRecord, constraints: &Constraints) -> bool {
        track.release_key >= constraints.min_release_key
    }

    /// Check the recent-only window. `recent_keys` must be computed from the
    /// full catalog, not an already filtered subset.
    pub fn matches_recent_window(track: &TrackRecord, recent_keys: &[ReleaseKey]) -> bool {
        recent_keys.contains(&track.release_key)
    }

    /// Check the two tag groups: at least one selected theme tag and at least
    /// one selected instructor tag, an empty group imposing nothing.
    pub fn matches_tag_groups(track: &TrackRecord, constraints: &Constraints) -> bool {
        let theme_ok = constraints.theme_tags.is_empty()
            || constraints.theme_tags.iter().any(|tag| track.has_tag(tag));
        let instructor_ok = constraints.instructor_tags.is_empty()
            || constraints.instructor_tags.iter().any(|tag| track.has_tag(tag));
        theme_ok && instructor_ok
    }

    /// Check genre membership when any genres are selected.
    pub fn matches_genres(track: &TrackRecord, constraints: &Constraints) -> bool {
        constraints.genres.is_empty() || constraints.genres.contains(&track.genre)
    }

    /// The release-filtered pool: earliest-release boundary, recent-only
    /// window and exclude-newest applied, theme/genre filters not yet.
    /// This is the pool fallback selections draw from.
    pub fn release_pool<'a>(catalog: &'a Catalog, constraints: &Constraints) -> Vec<&'a TrackRecord> {
        let recent_keys = if constraints.recent_only {
            catalog.recent_release_keys(RECENT_RELEASE_COUNT)
        } else {
            Vec::new()
        };
        let newest = if constraints.exclude_newest {
            catalog.max_release_key()
        } else {
            None
        };

        catalog
            .tracks()
            .iter()
            .filter(|track| Self::matches_min_release(track, constraints))
            .filter(|track| {
                !constraints.recent_only || Self::matches_recent_window(track, &recent_keys)
            })
            .filter(|track| newest.is_none_or(|max| track.release_key != max))
            .collect()
    }

    /// Apply the theme/genre filters on top of an already release-filtered
    /// pool, preserving its order.
    pub fn apply_theme<'a>(pool: &[&'a TrackRecord], constraints: &Constraints) -> Vec<&'a TrackRecord> {
        pool.iter()
            .copied()
            .filter(|track| Self::matches_tag_groups(track, constraints))
            .filter(|track| Self::matches_genres(track, constraints))
            .collect()
    }

    /// The fully filtered pool slot assignment draws from first.
    pub fn themed_pool<'a>(catalog: &'a Catalog, constraints: &Constraints) -> Vec<&'a TrackRecord> {
        Self::apply_theme(&Self::release_pool(catalog, constraints), constraints)
    }
}
