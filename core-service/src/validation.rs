//! Input checks run before the catalog touches the store or the network.

use crate::error::{CoreError, Result};
use chrono::{NaiveDate, Utc};
use core_library::models::{MusicFilters, MusicPatch, MusicQuery};
use core_library::repositories::{PageRequest, VerseRange};

/// Longest song or group name accepted, in characters
pub const MAX_NAME_LENGTH: usize = 255;

/// Saving only needs a song name; length limits apply to filters and patches.
pub(crate) fn validate_query(query: &MusicQuery) -> Result<()> {
    if query.song_name.is_empty() {
        return Err(CoreError::validation("song_name", "song name is required"));
    }
    Ok(())
}

pub(crate) fn validate_filters(filters: &MusicFilters) -> Result<()> {
    if let Some(date) = filters.release_date {
        validate_release_date(date)?;
    }
    if let Some(link) = filters.link.as_deref() {
        validate_link(link)?;
    }
    if let Some(song_name) = filters.song_name.as_deref() {
        validate_name_length("song_name", "song name", song_name)?;
    }
    if let Some(group_name) = filters.group_name.as_deref() {
        validate_name_length("group_name", "group name", group_name)?;
    }
    Ok(())
}

pub(crate) fn validate_page(page: i64, page_size: i64) -> Result<PageRequest> {
    if page < 1 {
        return Err(CoreError::validation("page", "page must be greater than zero"));
    }
    if page_size < 1 {
        return Err(CoreError::validation(
            "page_size",
            "page size must be greater than zero",
        ));
    }
    Ok(PageRequest::new(
        to_u32("page", page)?,
        to_u32("page_size", page_size)?,
    ))
}

pub(crate) fn validate_verse_range(limit: i64, offset: i64) -> Result<VerseRange> {
    if limit < 1 {
        return Err(CoreError::validation("limit", "limit must be greater than zero"));
    }
    if offset < 0 {
        return Err(CoreError::validation(
            "offset",
            "offset must be greater or equal to zero",
        ));
    }
    Ok(VerseRange::new(
        to_u32("limit", limit)?,
        to_u32("offset", offset)?,
    ))
}

pub(crate) fn validate_id(music_id: &str) -> Result<()> {
    if music_id.trim().is_empty() {
        return Err(CoreError::validation("id", "music id is required"));
    }
    Ok(())
}

/// Only the id is required. A name that is present must not be blank, so a
/// patch can never clear a name.
pub(crate) fn validate_patch(patch: &MusicPatch) -> Result<()> {
    validate_id(&patch.id)?;

    if let Some(song_name) = patch.song_name.as_deref() {
        if song_name.trim().is_empty() {
            return Err(CoreError::validation("song_name", "song name cannot be blank"));
        }
        validate_name_length("song_name", "song name", song_name)?;
    }
    if let Some(group_name) = patch.group_name.as_deref() {
        if group_name.trim().is_empty() {
            return Err(CoreError::validation("group_name", "group name cannot be blank"));
        }
        validate_name_length("group_name", "group name", group_name)?;
    }
    Ok(())
}

fn validate_release_date(date: NaiveDate) -> Result<()> {
    if date > Utc::now().date_naive() {
        return Err(CoreError::validation(
            "release_date",
            "release date cannot be in the future",
        ));
    }
    Ok(())
}

fn validate_link(link: &str) -> Result<()> {
    url::Url::parse(link)
        .map(|_| ())
        .map_err(|_| CoreError::validation("link", "link is invalid"))
}

fn validate_name_length(field: &str, label: &str, value: &str) -> Result<()> {
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::validation(
            field,
            format!("{} must be shorter than {} characters", label, MAX_NAME_LENGTH),
        ));
    }
    Ok(())
}

fn to_u32(field: &str, value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| CoreError::validation(field, format!("{} is too large", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn message(result: Result<()>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn test_query_requires_song_name() {
        assert_eq!(
            message(validate_query(&MusicQuery::new("", "rammstein"))),
            "song name is required"
        );
        assert!(validate_query(&MusicQuery::new("sonne", "")).is_ok());
    }

    #[test]
    fn test_name_length_counts_characters() {
        let at_limit = "ä".repeat(MAX_NAME_LENGTH);
        assert!(validate_filters(&MusicFilters::new().with_song_name(at_limit.clone())).is_ok());

        let too_long = format!("{}x", at_limit);
        assert_eq!(
            message(validate_filters(&MusicFilters::new().with_song_name(too_long))),
            "song name must be shorter than 255 characters"
        );
    }

    #[test]
    fn test_query_has_no_length_limit() {
        let long = "x".repeat(MAX_NAME_LENGTH + 10);
        assert!(validate_query(&MusicQuery::new(long.clone(), long)).is_ok());
    }

    #[test]
    fn test_filters_reject_future_date() {
        let tomorrow = Utc::now().date_naive() + Duration::days(2);
        let filters = MusicFilters::new().with_release_date(tomorrow);
        assert_eq!(
            message(validate_filters(&filters)),
            "release date cannot be in the future"
        );

        let past = NaiveDate::from_ymd_opt(2001, 2, 12).unwrap();
        assert!(validate_filters(&MusicFilters::new().with_release_date(past)).is_ok());
    }

    #[test]
    fn test_filters_reject_relative_link() {
        assert_eq!(
            message(validate_filters(&MusicFilters::new().with_link("not a url"))),
            "link is invalid"
        );
        assert_eq!(
            message(validate_filters(&MusicFilters::new().with_link("/music/sonne"))),
            "link is invalid"
        );
        assert!(
            validate_filters(&MusicFilters::new().with_link("https://www.last.fm/music/x"))
                .is_ok()
        );
    }

    #[test]
    fn test_filters_group_name_length() {
        let filters = MusicFilters::new().with_group_name("g".repeat(256));
        assert_eq!(
            message(validate_filters(&filters)),
            "group name must be shorter than 255 characters"
        );
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(validate_page(2, 10).unwrap(), PageRequest::new(2, 10));
        assert_eq!(
            validate_page(0, 10).unwrap_err().to_string(),
            "page must be greater than zero"
        );
        assert_eq!(
            validate_page(1, 0).unwrap_err().to_string(),
            "page size must be greater than zero"
        );
        assert!(validate_page(i64::MAX, 10).is_err());
    }

    #[test]
    fn test_verse_range_bounds() {
        assert_eq!(validate_verse_range(3, 0).unwrap(), VerseRange::new(3, 0));
        assert_eq!(
            validate_verse_range(0, 0).unwrap_err().to_string(),
            "limit must be greater than zero"
        );
        assert_eq!(
            validate_verse_range(1, -1).unwrap_err().to_string(),
            "offset must be greater or equal to zero"
        );
    }

    #[test]
    fn test_patch_rules() {
        assert_eq!(
            message(validate_patch(&MusicPatch::new(""))),
            "music id is required"
        );
        assert_eq!(
            message(validate_patch(&MusicPatch::new("1").with_song_name("  "))),
            "song name cannot be blank"
        );
        assert!(validate_patch(&MusicPatch::new("1").with_group_name("rammstein")).is_ok());
    }
}
