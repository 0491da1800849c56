//! Collaborators that live outside the simulation: the theme catalog consulted at round
//! setup and the leaderboard that receives final scores.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors from loading or saving collaborator state.
#[derive(Debug, Error)]
pub enum CollabError {
    /// The file could not be read or written.
    #[error("failed to access {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// The file is not valid JSON for the expected table.
    #[error("invalid leaderboard: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A display theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Catalog key.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// One-line description.
    pub description: String,
}

impl Theme {
    /// Create a theme.
    #[must_use]
    pub fn new(id: u32, name: &str, description: &str) -> Self {
        Self {
            id,
            name: name.to_owned(),
            description: description.to_owned(),
        }
    }
}

const BUILTIN_THEMES: [(u32, &str, &str); 7] = [
    (1, "Classic Blue", "Default blue color scheme"),
    (2, "Retro Green", "Old-school green look"),
    (3, "Neon Nights", "Bright neon highlights"),
    (4, "Monochrome", "Black & white minimal"),
    (5, "Solar Flare", "Orange & yellow sunset"),
    (6, "Cyberpunk", "Futuristic purple neon"),
    (7, "Forest Whisper", "Earthy green and brown"),
];

/// Themes ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeCatalog {
    themes: BTreeMap<u32, Theme>,
}

impl ThemeCatalog {
    /// A catalog holding the seven built-in themes.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        for (id, name, description) in BUILTIN_THEMES {
            catalog.insert(Theme::new(id, name, description));
        }
        catalog
    }

    /// Add a theme. Returns `false` and leaves the catalog unchanged if the id is taken.
    pub fn insert(&mut self, theme: Theme) -> bool {
        if self.themes.contains_key(&theme.id) {
            return false;
        }
        self.themes.insert(theme.id, theme);
        true
    }

    /// Remove a theme by id.
    pub fn remove(&mut self, id: u32) -> Option<Theme> {
        self.themes.remove(&id)
    }

    /// Look a theme up by id.
    #[must_use]
    pub fn lookup(&self, id: u32) -> Option<&Theme> {
        self.themes.get(&id)
    }

    /// Look a theme up by exact name.
    #[must_use]
    pub fn lookup_name(&self, name: &str) -> Option<&Theme> {
        self.themes.values().find(|t| t.name == name)
    }

    /// Replace the name and description of an existing theme. Returns `false` if no
    /// theme has that id.
    pub fn update(&mut self, id: u32, name: &str, description: &str) -> bool {
        let Some(theme) = self.themes.get_mut(&id) else {
            return false;
        };
        name.clone_into(&mut theme.name);
        description.clone_into(&mut theme.description);
        true
    }

    /// Themes in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Theme> {
        self.themes.values()
    }

    /// Number of themes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.themes.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

/// A leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Player name.
    pub name: String,
    /// Best reported score.
    pub score: u32,
}

/// Default leaderboard size.
pub const LEADERBOARD_CAPACITY: usize = 10;

/// Bounded table of the best scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    capacity: usize,
    entries: Vec<Entry>,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new(LEADERBOARD_CAPACITY)
    }
}

impl Leaderboard {
    /// An empty table holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Vec::new(),
        }
    }

    /// Report a final score.
    ///
    /// A name already on the table has its score replaced. Otherwise the entry is added
    /// while there is room, or replaces the lowest entry if it scores strictly higher.
    /// Returns `true` if the table changed.
    pub fn record(&mut self, name: &str, score: u32) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.score = score;
            return true;
        }
        let entry = Entry {
            name: name.to_owned(),
            score,
        };
        if self.entries.len() < self.capacity {
            self.entries.push(entry);
            return true;
        }
        let Some((lowest, min)) = self
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| e.score)
            .map(|(i, e)| (i, e.score))
        else {
            return false;
        };
        if score > min {
            debug!(
                name,
                score,
                replaced = %self.entries[lowest].name,
                "leaderboard entry replaced"
            );
            self.entries[lowest] = entry;
            true
        } else {
            false
        }
    }

    /// Entries by descending score. Equal scores keep insertion order.
    #[must_use]
    pub fn ranked(&self) -> Vec<&Entry> {
        let mut ranked: Vec<&Entry> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a table from JSON. A missing file is an empty table.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CollabError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(CollabError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Write the table as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), CollabError> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).map_err(|source| CollabError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
