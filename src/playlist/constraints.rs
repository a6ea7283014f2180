use crate::models::ReleaseKey;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// How many distinct releases count as "recent" for the recent-only filter.
pub const RECENT_RELEASE_COUNT: usize = 10;

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("failed to read preset file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse preset file '{path}'")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// User-chosen eligibility constraints for one build.
///
/// Tag matching policy: a track must match at least one selected theme tag
/// and at least one selected instructor tag, with an empty group imposing
/// nothing (AND across the two groups, OR within each). Genres are a further
/// AND: when any are selected the track's genre must be among them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Constraints {
    /// Earliest release owned: tracks below this key are ineligible.
    #[serde(default)]
    pub min_release_key: ReleaseKey,
    /// Limit to the ten most recent distinct releases in the catalog.
    #[serde(default)]
    pub recent_only: bool,
    /// Drop every track on the single newest release.
    #[serde(default)]
    pub exclude_newest: bool,
    /// Theme tags ("Halloween", "Beast Mode", ...), OR within the group.
    #[serde(default)]
    pub theme_tags: Vec<String>,
    /// Difficulty/length tags ("Hard", "Easy to Learn", ...), OR within.
    #[serde(default)]
    pub instructor_tags: Vec<String>,
    /// Exact genre matches, OR within the group.
    #[serde(default)]
    pub genres: Vec<String>,
}

impl Constraints {
    /// Whether any theme/genre selection is active. When none is, the themed
    /// pool equals the release pool and every slot fills as a plain pick.
    pub fn has_theme_filters(&self) -> bool {
        !self.theme_tags.is_empty() || !self.instructor_tags.is_empty() || !self.genres.is_empty()
    }

    /// Load a saved constraints preset from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Constraints, PresetError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| PresetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| PresetError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}
