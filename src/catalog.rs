use crate::models::{RawTrack, ReleaseKey, SlotCategory, TrackRecord};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

/// Tag spellings that drifted over the catalog's history, merged to one
/// canonical form.
const TAG_REPLACEMENTS: &[(&str, &str)] = &[("Break-up Songs", "Break-Up Songs"), ("🌈", "✨")];

/// Values that mean "no tag" in the raw data.
const TAG_SENTINELS: &[&str] = &["nan", "None", "-"];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog file '{path}'")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The track catalog: loaded once, immutable for the session.
///
/// Rows are parsed, normalized and sorted by release key at load time; rows
/// with an unrecognizable track-number column are skipped (and counted)
/// rather than failing the load.
#[derive(Debug, Clone)]
pub struct Catalog {
    tracks: Vec<TrackRecord>,
    skipped_rows: usize,
}

impl Catalog {
    /// Parse raw tabular rows into a catalog.
    pub fn from_rows(rows: Vec<RawTrack>) -> Self {
        let total = rows.len();
        let mut tracks: Vec<TrackRecord> = rows
            .into_iter()
            .filter_map(|row| {
                let category = SlotCategory::from_label(&row.track_no)?;
                Some(TrackRecord {
                    category,
                    title: row.title.trim().to_string(),
                    artist: row.artist.trim().to_string(),
                    release: row.release.trim().to_string(),
                    release_key: ReleaseKey::parse(&row.release),
                    duration_secs: parse_duration(&row.duration),
                    genre: row.genre.as_deref().unwrap_or("").trim().to_string(),
                    tags: clean_tags(row.tags.as_deref()),
                })
            })
            .collect();

        let skipped_rows = total - tracks.len();
        tracks.sort_by(|a, b| a.release_key.cmp(&b.release_key));

        Catalog { tracks, skipped_rows }
    }

    /// Load a catalog from a JSON array of raw rows.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Catalog, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let rows: Vec<RawTrack> =
            serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Catalog::from_rows(rows))
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Rows that were dropped at load time because their track-number column
    /// did not name one of the ten categories.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn tracks(&self) -> &[TrackRecord] {
        &self.tracks
    }

    /// All distinct tags across the catalog, sorted.
    pub fn all_tags(&self) -> Vec<String> {
        let set: BTreeSet<&String> = self.tracks.iter().flat_map(|t| t.tags.iter()).collect();
        set.into_iter().cloned().collect()
    }

    /// All distinct non-empty genres, sorted.
    pub fn all_genres(&self) -> Vec<String> {
        let set: BTreeSet<&String> = self
            .tracks
            .iter()
            .map(|t| &t.genre)
            .filter(|g| !g.is_empty() && g.as_str() != "nan")
            .collect();
        set.into_iter().cloned().collect()
    }

    /// Distinct release identifiers in ascending key order.
    pub fn releases(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut releases = Vec::new();
        for track in &self.tracks {
            if seen.insert(track.release_key) {
                releases.push(track.release.clone());
            }
        }
        releases
    }

    /// Key of a release identifier as it appears in this catalog, if present.
    pub fn release_key_of(&self, release: &str) -> Option<ReleaseKey> {
        self.tracks
            .iter()
            .find(|t| t.release == release.trim())
            .map(|t| t.release_key)
    }

    pub fn max_release_key(&self) -> Option<ReleaseKey> {
        self.tracks.iter().map(|t| t.release_key).max()
    }

    /// The `n` largest distinct release keys present in the catalog.
    pub fn recent_release_keys(&self, n: usize) -> Vec<ReleaseKey> {
        let distinct: BTreeSet<ReleaseKey> = self.tracks.iter().map(|t| t.release_key).collect();
        distinct.into_iter().rev().take(n).collect()
    }

    /// Search tracks by title or artist substring, case-insensitive.
    /// Multi-word searches require every word to match the same field.
    pub fn search(&self, term: &str) -> Vec<&TrackRecord> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.tracks.iter().collect();
        }
        let words: Vec<&str> = term.split_whitespace().collect();

        self.tracks
            .iter()
            .filter(|track| {
                let title = normalize_for_search(&track.title);
                let artist = normalize_for_search(&track.artist);
                words.iter().all(|w| title.contains(w)) || words.iter().all(|w| artist.contains(w))
            })
            .collect()
    }
}

/// Lowercase and fold the "P!nk" spelling so both spellings match either way.
fn normalize_for_search(text: &str) -> String {
    let lowered = text.to_lowercase();
    let folded = lowered.replace("p!nk", "pink");
    format!("{lowered} {folded}")
}

/// Parse an "M:SS" duration string into seconds, degrading to 0 on bad input.
pub fn parse_duration(duration: &str) -> u32 {
    let Some((minutes, seconds)) = duration.trim().split_once(':') else {
        return 0;
    };
    match (minutes.parse::<u32>(), seconds.parse::<u32>()) {
        (Ok(m), Ok(s)) => m * 60 + s,
        _ => 0,
    }
}

/// Normalize a raw comma-separated tag string: trim, drop empty and sentinel
/// entries, merge known synonym spellings, sort and deduplicate.
fn clean_tags(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let mut tags: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty() && !TAG_SENTINELS.contains(t))
        .map(|tag| {
            match TAG_REPLACEMENTS.iter().find(|(from, _)| *from == tag) {
                Some((_, to)) => (*to).to_string(),
                None => tag.to_string(),
            }
        })
        .collect();
    tags.sort();
    tags.dedup();
    tags
}
