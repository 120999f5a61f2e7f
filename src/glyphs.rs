//! Character-to-glyph lookup.
//!
//! The table is loaded once at start-up from a JSON object whose keys are
//! single characters and whose values are image file names, then shared
//! read-only through the application state.

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlyphTableError {
    #[error("Failed to read glyph table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glyph table JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Glyph table key must be a single character, got {0:?}")]
    InvalidKey(String),
}

/// One rendered character and the image that depicts it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Glyph<'a> {
    pub character: char,
    pub image: &'a str,
}

/// Immutable mapping from a character to its image reference
#[derive(Debug, Clone, Default)]
pub struct GlyphTable {
    entries: HashMap<char, String>,
}

impl GlyphTable {
    /// Load the table from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GlyphTableError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| GlyphTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let table = Self::from_json(&raw)?;
        tracing::info!("Loaded {} glyphs from {:?}", table.len(), path);
        Ok(table)
    }

    /// Parse the table from a JSON object string
    pub fn from_json(raw: &str) -> Result<Self, GlyphTableError> {
        let map: HashMap<String, String> = serde_json::from_str(raw)?;

        let mut entries = HashMap::with_capacity(map.len());
        for (key, image) in map {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => {
                    entries.insert(c, image);
                }
                _ => return Err(GlyphTableError::InvalidKey(key)),
            }
        }

        Ok(Self { entries })
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (char, S)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(c, s)| (c, s.into())).collect(),
        }
    }

    pub fn get(&self, c: char) -> Option<&str> {
        self.entries.get(&c).map(String::as_str)
    }

    /// Glyphs for every mapped character of `text`, left to right.
    /// Unmapped characters are dropped; repeats are kept.
    pub fn map<'a>(&'a self, text: &str) -> Vec<Glyph<'a>> {
        text.chars()
            .filter_map(|character| {
                self.get(character)
                    .map(|image| Glyph { character, image })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// True if any alphabetic character in `text` is lowercase
pub fn has_lowercase_letter(text: &str) -> bool {
    text.chars().any(|c| c.is_alphabetic() && c.is_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> GlyphTable {
        GlyphTable::from_entries([('A', "a.png"), ('B', "b.png")])
    }

    #[test]
    fn test_map_drops_unmapped_characters() {
        let table = table();
        assert_eq!(
            table.map("AB3"),
            vec![
                Glyph { character: 'A', image: "a.png" },
                Glyph { character: 'B', image: "b.png" },
            ]
        );
    }

    #[test]
    fn test_map_preserves_order_and_duplicates() {
        let table = table();
        let chars: Vec<char> = table.map("BA BA").iter().map(|g| g.character).collect();
        assert_eq!(chars, vec!['B', 'A', 'B', 'A']);
    }

    #[test]
    fn test_map_is_case_sensitive() {
        assert!(table().map("ab").is_empty());
    }

    #[test]
    fn test_from_json() {
        let table = GlyphTable::from_json(r#"{"A": "A.png", "स": "sa.png"}"#).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get('स'), Some("sa.png"));
    }

    #[test]
    fn test_from_json_rejects_multi_character_keys() {
        let err = GlyphTable::from_json(r#"{"AB": "ab.png"}"#).unwrap_err();
        assert!(matches!(err, GlyphTableError::InvalidKey(k) if k == "AB"));
    }

    #[test]
    fn test_from_json_rejects_empty_key() {
        assert!(GlyphTable::from_json(r#"{"": "x.png"}"#).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = GlyphTable::load("/nonexistent/mapping.json").unwrap_err();
        assert!(matches!(err, GlyphTableError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("mapping.json");
        std::fs::write(&path, r#"{"H": "H.png", "I": "I.png"}"#).unwrap();

        let table = GlyphTable::load(&path).unwrap();
        assert_eq!(table.map("HI!").len(), 2);
    }

    #[test]
    fn test_has_lowercase_letter() {
        assert!(has_lowercase_letter("HELLo"));
        assert!(!has_lowercase_letter("HELLO 123"));
        assert!(!has_lowercase_letter(""));
        // Scripts without case never trigger the warning
        assert!(!has_lowercase_letter("नमस्ते"));
    }
}
