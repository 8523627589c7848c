//! Domain models for the music catalog
//!
//! A [`Music`] record is a song head row (names, release date, reference link)
//! plus its lyric [`Verse`]s. Filters, lookup keys and partial updates each get
//! their own type so that "field absent" is always an explicit `None`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ID Types
// =============================================================================

/// Store-assigned identifier of a music record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MusicId(pub i64);

impl MusicId {
    pub fn from_string(s: &str) -> Result<Self, std::num::ParseIntError> {
        Ok(Self(s.trim().parse()?))
    }
}

impl fmt::Display for MusicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Music & Verse
// =============================================================================

/// One stanza of a song's lyrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    /// Verse body, may span several lines
    pub text: String,
    /// Position within the song
    pub number: i64,
}

impl Verse {
    pub fn new(text: impl Into<String>, number: i64) -> Self {
        Self {
            text: text.into(),
            number,
        }
    }
}

/// A song record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Music {
    /// Assigned by the store on creation; `None` until persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub song_name: String,
    pub group_name: String,
    pub release_date: Option<NaiveDate>,
    /// External reference page for the song
    pub link: Option<String>,
    /// Ordered by `number`
    #[serde(default)]
    pub verses: Vec<Verse>,
}

impl Music {
    pub fn new(song_name: impl Into<String>, group_name: impl Into<String>) -> Self {
        Self {
            song_name: song_name.into(),
            group_name: group_name.into(),
            ..Self::default()
        }
    }

    pub fn with_release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_verses(mut self, verses: Vec<Verse>) -> Self {
        self.verses = verses;
        self
    }

    /// Lower-case both names, the form records are stored and deduplicated in
    pub fn normalize_names(&mut self) {
        self.song_name = self.song_name.to_lowercase();
        self.group_name = self.group_name.to_lowercase();
    }
}

// =============================================================================
// Query types
// =============================================================================

/// Lookup key for idempotent save
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicQuery {
    pub song_name: String,
    pub group_name: String,
}

impl MusicQuery {
    pub fn new(song_name: impl Into<String>, group_name: impl Into<String>) -> Self {
        Self {
            song_name: song_name.into(),
            group_name: group_name.into(),
        }
    }

    /// Lower-cased copy of the key
    pub fn normalized(&self) -> Self {
        Self {
            song_name: self.song_name.to_lowercase(),
            group_name: self.group_name.to_lowercase(),
        }
    }
}

/// Listing filters; every `None` field is unconstrained
///
/// `release_date` and `link` match exactly, `song_name` and `group_name`
/// match as case-insensitive substrings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicFilters {
    pub release_date: Option<NaiveDate>,
    pub link: Option<String>,
    pub song_name: Option<String>,
    pub group_name: Option<String>,
}

impl MusicFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_song_name(mut self, song_name: impl Into<String>) -> Self {
        self.song_name = Some(song_name.into());
        self
    }

    pub fn with_group_name(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = Some(group_name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.release_date.is_none()
            && self.link.is_none()
            && self.song_name.is_none()
            && self.group_name.is_none()
    }
}

/// Partial update of a music record
///
/// Only `Some` head fields are written. Each verse replaces the text of the
/// stored verse with the same number; numbers with no stored verse are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicPatch {
    pub id: String,
    pub release_date: Option<NaiveDate>,
    pub link: Option<String>,
    pub song_name: Option<String>,
    pub group_name: Option<String>,
    #[serde(default)]
    pub verses: Vec<Verse>,
}

impl MusicPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_song_name(mut self, song_name: impl Into<String>) -> Self {
        self.song_name = Some(song_name.into());
        self
    }

    pub fn with_group_name(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = Some(group_name.into());
        self
    }

    pub fn with_verse(mut self, verse: Verse) -> Self {
        self.verses.push(verse);
        self
    }

    /// True when at least one head column would be written
    pub fn has_head_changes(&self) -> bool {
        self.release_date.is_some()
            || self.link.is_some()
            || self.song_name.is_some()
            || self.group_name.is_some()
    }

    /// True when applying the patch would change nothing
    pub fn is_empty(&self) -> bool {
        !self.has_head_changes() && self.verses.is_empty()
    }

    /// Lower-case the supplied names, matching [`Music::normalize_names`]
    pub fn normalize_names(&mut self) {
        if let Some(song_name) = self.song_name.as_mut() {
            *song_name = song_name.to_lowercase();
        }
        if let Some(group_name) = self.group_name.as_mut() {
            *group_name = group_name.to_lowercase();
        }
    }
}

/// Maps a full record onto a patch, treating empty strings as "not supplied"
impl From<Music> for MusicPatch {
    fn from(music: Music) -> Self {
        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };

        Self {
            id: music.id.unwrap_or_default(),
            release_date: music.release_date,
            link: music.link.and_then(non_empty),
            song_name: non_empty(music.song_name),
            group_name: non_empty(music.group_name),
            verses: music.verses,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_music_id_parsing() {
        assert_eq!(MusicId::from_string("42").unwrap(), MusicId(42));
        assert_eq!(MusicId::from_string(" 7 ").unwrap().to_string(), "7");
        assert!(MusicId::from_string("abc").is_err());
        assert!(MusicId::from_string("").is_err());
    }

    #[test]
    fn test_normalize_names() {
        let mut music = Music::new("Sonne", "RAMMSTEIN");
        music.normalize_names();
        assert_eq!(music.song_name, "sonne");
        assert_eq!(music.group_name, "rammstein");
        assert_eq!(
            MusicQuery::new("Du Hast", "Rammstein").normalized(),
            MusicQuery::new("du hast", "rammstein")
        );
    }

    #[test]
    fn test_filters_is_empty() {
        assert!(MusicFilters::new().is_empty());
        assert!(!MusicFilters::new().with_group_name("ram").is_empty());
    }

    #[test]
    fn test_patch_presence() {
        assert!(MusicPatch::new("1").is_empty());

        let verses_only = MusicPatch::new("1").with_verse(Verse::new("new text", 1));
        assert!(!verses_only.is_empty());
        assert!(!verses_only.has_head_changes());

        let title_only = MusicPatch::new("1").with_song_name("Sonne");
        assert!(title_only.has_head_changes());
    }

    #[test]
    fn test_patch_from_music_drops_empty_fields() {
        let music = Music {
            id: Some("3".to_string()),
            song_name: "Sonne".to_string(),
            group_name: String::new(),
            release_date: None,
            link: Some(String::new()),
            verses: vec![],
        };

        let patch = MusicPatch::from(music);
        assert_eq!(patch.id, "3");
        assert_eq!(patch.song_name.as_deref(), Some("Sonne"));
        assert!(patch.group_name.is_none());
        assert!(patch.link.is_none());
        assert!(patch.release_date.is_none());
    }

    #[test]
    fn test_music_serializes_camel_case() {
        let music = Music::new("sonne", "rammstein")
            .with_release_date(NaiveDate::from_ymd_opt(2001, 1, 22).unwrap());
        let json = serde_json::to_value(&music).unwrap();

        assert_eq!(json["songName"], "sonne");
        assert_eq!(json["releaseDate"], "2001-01-22");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_patch_normalize_names_folds_non_ascii() {
        let mut patch = MusicPatch::new("1")
            .with_group_name("DIE ÄRZTE")
            .with_link("https://example.com/Schrei");
        patch.normalize_names();

        assert_eq!(patch.group_name.as_deref(), Some("die ärzte"));
        assert!(patch.song_name.is_none());
        assert_eq!(patch.link.as_deref(), Some("https://example.com/Schrei"));
    }
}
