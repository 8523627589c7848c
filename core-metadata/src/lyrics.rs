//! # Lyrics
//!
//! Turns the raw lyric text returned by the lyrics provider into numbered
//! verses.
//!
//! A verse is a block of text separated from its neighbours by an empty line
//! (`"\n\n"`). Verses are numbered in order of appearance starting at 0; the
//! repository renumbers them from 1 when it stores them.

use core_library::models::Verse;

/// Separator between two verses
pub const VERSE_SEPARATOR: &str = "\n\n";

/// Split lyric text into numbered verses
///
/// The text is not trimmed, so a separator at the very start or end of the
/// text produces an empty verse at that position.
///
/// # Examples
///
/// ```
/// use core_metadata::lyrics::split_verses;
///
/// let verses = split_verses("one\ntwo\n\nthree");
/// assert_eq!(verses.len(), 2);
/// assert_eq!(verses[0].number, 0);
/// assert_eq!(verses[1].text, "three");
/// ```
pub fn split_verses(lyrics: &str) -> Vec<Verse> {
    lyrics
        .split(VERSE_SEPARATOR)
        .enumerate()
        .map(|(number, text)| Verse::new(text, number as i64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_two_stanzas() {
        let verses = split_verses("A\nB\n\nC");
        assert_eq!(
            verses,
            vec![Verse::new("A\nB", 0), Verse::new("C", 1)]
        );
    }

    #[test]
    fn test_single_block_is_one_verse() {
        let verses = split_verses("only line");
        assert_eq!(verses, vec![Verse::new("only line", 0)]);
    }

    #[test]
    fn test_separator_at_edges_keeps_empty_verses() {
        let verses = split_verses("\n\nmiddle\n\n");
        assert_eq!(verses.len(), 3);
        assert_eq!(verses[0].text, "");
        assert_eq!(verses[1].text, "middle");
        assert_eq!(verses[2].text, "");
    }

    #[test]
    fn test_numbers_are_sequential() {
        let verses = split_verses("a\n\nb\n\nc\n\nd");
        let numbers: Vec<i64> = verses.iter().map(|v| v.number).collect();
        assert_eq!(numbers, vec![0, 1, 2, 3]);
    }
}
