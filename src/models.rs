use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// The ten fixed class positions, in the order they are taught.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotCategory {
    Warmup,
    Squats,
    Chest,
    Back,
    Triceps,
    Biceps,
    Lunges,
    Shoulders,
    Core,
    Cooldown,
}

impl SlotCategory {
    /// All categories in class order. Every playlist fills these exactly once.
    pub const ALL: [SlotCategory; 10] = [
        SlotCategory::Warmup,
        SlotCategory::Squats,
        SlotCategory::Chest,
        SlotCategory::Back,
        SlotCategory::Triceps,
        SlotCategory::Biceps,
        SlotCategory::Lunges,
        SlotCategory::Shoulders,
        SlotCategory::Core,
        SlotCategory::Cooldown,
    ];

    /// The label used in the catalog's track-number column, e.g. "3 - Chest".
    pub fn label(&self) -> &'static str {
        match self {
            SlotCategory::Warmup => "1 - Warmup",
            SlotCategory::Squats => "2 - Squats",
            SlotCategory::Chest => "3 - Chest",
            SlotCategory::Back => "4 - Back",
            SlotCategory::Triceps => "5 - Triceps",
            SlotCategory::Biceps => "6 - Biceps",
            SlotCategory::Lunges => "7 - Lunges",
            SlotCategory::Shoulders => "8 - Shoulders",
            SlotCategory::Core => "9 - Core",
            SlotCategory::Cooldown => "10 - Cooldown",
        }
    }

    /// The body part / segment name without the position prefix.
    pub fn body_part(&self) -> &'static str {
        match self.label().split_once(" - ") {
            Some((_, part)) => part,
            None => self.label(),
        }
    }

    /// 1-based class position (1 = Warmup .. 10 = Cooldown).
    pub fn position(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).map_or(0, |i| i + 1)
    }

    /// Parse a catalog label like "5 - Triceps" back into a category.
    pub fn from_label(label: &str) -> Option<SlotCategory> {
        let label = label.trim();
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for SlotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Numeric ordering key for a release identifier.
///
/// Releases are almost always plain numbers ("89", "113", "135"), but the
/// special "United" release slots between 113 and 114 and therefore keys as
/// 113.5. Anything unparsable keys as 0 so it sorts earliest rather than
/// failing the load.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReleaseKey(f64);

impl ReleaseKey {
    pub fn new(value: f64) -> Self {
        ReleaseKey(value)
    }

    pub fn parse(release: &str) -> Self {
        let release = release.trim();
        if release == "United" {
            return ReleaseKey::new(113.5);
        }
        ReleaseKey::new(release.parse::<f64>().unwrap_or(0.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl PartialEq for ReleaseKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for ReleaseKey {}

impl PartialOrd for ReleaseKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReleaseKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A raw catalog row as it appears in the tabular source, before parsing.
/// Field names match the original column headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTrack {
    #[serde(rename = "Track No#")]
    pub track_no: String,
    #[serde(rename = "Song Title")]
    pub title: String,
    #[serde(rename = "Artist")]
    pub artist: String,
    #[serde(rename = "Release")]
    pub release: String,
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(rename = "Genre")]
    pub genre: Option<String>,
    #[serde(rename = "Tags")]
    pub tags: Option<String>,
}

/// A fully parsed, immutable catalog track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRecord {
    pub category: SlotCategory,
    pub title: String,
    pub artist: String,
    /// Display form of the release identifier ("113", "United", ...).
    pub release: String,
    pub release_key: ReleaseKey,
    pub duration_secs: u32,
    pub genre: String,
    /// Normalized tags: trimmed, canonicalized, sorted, deduplicated.
    pub tags: Vec<String>,
}

impl TrackRecord {
    /// Identity used to exclude the current occupant when re-rolling a slot.
    pub fn identity(&self) -> (&str, &str, &str) {
        (&self.title, &self.artist, &self.release)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// What a playlist slot holds. A slot is never empty: when nothing matches,
/// it carries an explicit `NoMatch` marker instead of a placeholder string.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackSlot {
    /// Track drawn from the fully filtered (themed) pool.
    Picked(TrackRecord),
    /// Track drawn from the release-filtered pool after the theme/genre
    /// filters produced nothing for this slot's category.
    Fallback(TrackRecord),
    /// No eligible track at all, even with theme filters relaxed.
    NoMatch,
}

impl TrackSlot {
    pub fn track(&self) -> Option<&TrackRecord> {
        match self {
            TrackSlot::Picked(t) | TrackSlot::Fallback(t) => Some(t),
            TrackSlot::NoMatch => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, TrackSlot::Fallback(_))
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, TrackSlot::NoMatch)
    }

    pub fn duration_secs(&self) -> u32 {
        self.track().map_or(0, |t| t.duration_secs)
    }
}

/// One entry of a playlist: a fixed category plus whatever fills it.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotEntry {
    pub category: SlotCategory,
    pub slot: TrackSlot,
}

/// An ordered sequence of exactly ten slot entries, one per category in
/// class order.
#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    entries: Vec<SlotEntry>,
}

impl Playlist {
    pub const LEN: usize = SlotCategory::ALL.len();

    /// Build from a complete set of entries. Callers are expected to supply
    /// one entry per category in class order; the assigner always does.
    pub(crate) fn from_entries(entries: Vec<SlotEntry>) -> Self {
        debug_assert_eq!(entries.len(), Self::LEN);
        Playlist { entries }
    }

    /// A playlist with every slot unfilled, used as the initial session state.
    pub fn empty() -> Self {
        Playlist {
            entries: SlotCategory::ALL
                .into_iter()
                .map(|category| SlotEntry {
                    category,
                    slot: TrackSlot::NoMatch,
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[SlotEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&SlotEntry> {
        self.entries.get(index)
    }

    pub(crate) fn entry_mut(&mut self, index: usize) -> Option<&mut SlotEntry> {
        self.entries.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SlotEntry> {
        self.entries.iter()
    }

    /// Categories whose slot was filled from the relaxed release pool.
    pub fn fallback_categories(&self) -> Vec<SlotCategory> {
        self.entries
            .iter()
            .filter(|e| e.slot.is_fallback())
            .map(|e| e.category)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_category_labels_round_trip() {
        for category in SlotCategory::ALL {
            assert_eq!(SlotCategory::from_label(category.label()), Some(category));
        }
        assert_eq!(SlotCategory::from_label("  3 - Chest "), Some(SlotCategory::Chest));
        assert_eq!(SlotCategory::from_label("11 - Encore"), None);
    }

    #[test]
    fn test_category_order_and_positions() {
        assert_eq!(SlotCategory::ALL.len(), 10);
        assert_eq!(SlotCategory::Warmup.position(), 1);
        assert_eq!(SlotCategory::Cooldown.position(), 10);
        assert_eq!(SlotCategory::Shoulders.body_part(), "Shoulders");
    }

    #[test]
    fn test_release_key_united_sorts_between_113_and_114() {
        let united = ReleaseKey::parse("United");
        assert_relative_eq!(united.value(), 113.5);
        assert!(united > ReleaseKey::parse("113"));
        assert!(united < ReleaseKey::parse("114"));
    }

    #[test]
    fn test_release_key_degrades_to_zero() {
        assert_eq!(ReleaseKey::parse("not a number"), ReleaseKey::new(0.0));
        assert_eq!(ReleaseKey::parse(""), ReleaseKey::new(0.0));
        assert_eq!(ReleaseKey::parse(" 97 "), ReleaseKey::new(97.0));
    }

    #[test]
    fn test_empty_playlist_has_ten_unfilled_slots() {
        let playlist = Playlist::empty();
        assert_eq!(playlist.entries().len(), Playlist::LEN);
        for (entry, category) in playlist.iter().zip(SlotCategory::ALL) {
            assert_eq!(entry.category, category);
            assert!(entry.slot.is_no_match());
        }
    }

    #[test]
    fn test_track_slot_duration_defaults_to_zero() {
        assert_eq!(TrackSlot::NoMatch.duration_secs(), 0);
    }
}
