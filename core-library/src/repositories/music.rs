//! Music repository trait and implementation

use crate::db::{IsolationLevel, StoreTransaction};
use crate::error::{LibraryError, Result};
use crate::models::{Music, MusicFilters, MusicId, MusicPatch, Verse};
use crate::repositories::{PageRequest, VerseRange};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{query, query_as, FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

/// Rows per multi-row verse INSERT (three bind parameters each)
const VERSE_INSERT_CHUNK: usize = 300;

/// Music repository interface for data access operations
#[async_trait]
pub trait MusicRepository: Send + Sync {
    /// Find a record by exact song and group name, with all of its verses
    ///
    /// # Returns
    /// - `Ok(Some(music))` if found, even when it has no verses
    /// - `Ok(None)` if not found
    async fn find_by_name(&self, song_name: &str, group_name: &str) -> Result<Option<Music>>;

    /// Insert a record and its verses atomically
    ///
    /// Verses are stored numbered from 1 in the order given. The returned
    /// record carries the new id and the stored numbering.
    ///
    /// # Errors
    /// Returns [`LibraryError::Conflict`] if a record with the same song and
    /// group name already exists.
    async fn create(&self, music: &Music) -> Result<Music>;

    /// List record heads (no verses) matching every set filter
    async fn list_by_filters(
        &self,
        filters: &MusicFilters,
        page_request: PageRequest,
    ) -> Result<Vec<Music>>;

    /// Fetch a record head with one window of its verses
    ///
    /// # Returns
    /// `Ok(None)` when the window holds no verses, even if the record exists.
    async fn list_verses(&self, music_id: &str, range: VerseRange) -> Result<Option<Music>>;

    /// Delete a record; its verses go with it
    ///
    /// # Returns
    /// - `Ok(true)` if the record was deleted
    /// - `Ok(false)` if no record had this id
    async fn delete(&self, music_id: &str) -> Result<bool>;

    /// Apply a partial update and return the full record afterwards
    ///
    /// # Errors
    /// - [`LibraryError::InvalidInput`] if the patch changes nothing
    /// - [`LibraryError::NotFound`] if no record has the patch id
    async fn update(&self, patch: &MusicPatch) -> Result<Music>;
}

#[derive(Debug, FromRow)]
struct MusicRow {
    id: i64,
    title: String,
    group_name: String,
    release_date: Option<NaiveDate>,
    link: Option<String>,
}

impl MusicRow {
    fn into_music(self, verses: Vec<Verse>) -> Music {
        Music {
            id: Some(self.id.to_string()),
            song_name: self.title,
            group_name: self.group_name,
            release_date: self.release_date,
            link: self.link,
            verses,
        }
    }
}

/// Head columns joined with at most one verse
#[derive(Debug, FromRow)]
struct MusicVerseRow {
    #[sqlx(flatten)]
    head: MusicRow,
    verse_text: Option<String>,
    verse_number: Option<i64>,
}

/// Collapse joined rows of a single record into one `Music`
fn fold_rows(rows: Vec<MusicVerseRow>) -> Option<Music> {
    let mut rows = rows.into_iter();
    let first = rows.next()?;

    let verses = std::iter::once((first.verse_text, first.verse_number))
        .chain(rows.map(|row| (row.verse_text, row.verse_number)))
        .filter_map(|(text, number)| Some(Verse::new(text?, number?)))
        .collect();

    Some(first.head.into_music(verses))
}

fn parse_id(music_id: &str) -> Result<MusicId> {
    MusicId::from_string(music_id).map_err(|_| LibraryError::invalid_id(music_id))
}

fn map_write_error(error: sqlx::Error, song_name: &str, group_name: &str) -> LibraryError {
    if let sqlx::Error::Database(db) = &error {
        if db.is_unique_violation() {
            return LibraryError::Conflict(format!(
                "music '{}' by '{}' already exists",
                song_name, group_name
            ));
        }
    }
    LibraryError::Database(error)
}

/// SQLite implementation of MusicRepository
pub struct SqliteMusicRepository {
    pool: SqlitePool,
}

impl SqliteMusicRepository {
    /// Create a new SqliteMusicRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn insert_music(conn: &mut SqliteConnection, music: &Music) -> Result<Music> {
        let result = query(
            r#"
            INSERT INTO music (title, group_name, release_date, link)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&music.song_name)
        .bind(&music.group_name)
        .bind(music.release_date)
        .bind(&music.link)
        .execute(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, &music.song_name, &music.group_name))?;

        let id = result.last_insert_rowid();

        let verses: Vec<Verse> = music
            .verses
            .iter()
            .enumerate()
            .map(|(position, verse)| Verse::new(verse.text.clone(), position as i64 + 1))
            .collect();

        for chunk in verses.chunks(VERSE_INSERT_CHUNK) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("INSERT INTO verses (music_id, verse_number, verse_text) ");
            builder.push_values(chunk, |mut row, verse| {
                row.push_bind(id)
                    .push_bind(verse.number)
                    .push_bind(verse.text.clone());
            });
            builder.build().execute(&mut *conn).await?;
        }

        Ok(Music {
            id: Some(id.to_string()),
            song_name: music.song_name.clone(),
            group_name: music.group_name.clone(),
            release_date: music.release_date,
            link: music.link.clone(),
            verses,
        })
    }

    async fn apply_patch(
        conn: &mut SqliteConnection,
        id: MusicId,
        patch: &MusicPatch,
    ) -> Result<Music> {
        if patch.has_head_changes() {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE music SET ");
            {
                let mut assignments = builder.separated(", ");
                if let Some(date) = patch.release_date {
                    assignments.push("release_date = ").push_bind_unseparated(date);
                }
                if let Some(link) = &patch.link {
                    assignments.push("link = ").push_bind_unseparated(link.clone());
                }
                if let Some(song_name) = &patch.song_name {
                    assignments.push("title = ").push_bind_unseparated(song_name.clone());
                }
                if let Some(group_name) = &patch.group_name {
                    assignments
                        .push("group_name = ")
                        .push_bind_unseparated(group_name.clone());
                }
            }
            builder.push(" WHERE id = ").push_bind(id.0);

            let result = builder.build().execute(&mut *conn).await.map_err(|e| {
                map_write_error(
                    e,
                    patch.song_name.as_deref().unwrap_or_default(),
                    patch.group_name.as_deref().unwrap_or_default(),
                )
            })?;

            if result.rows_affected() == 0 {
                return Err(LibraryError::music_not_found(id));
            }
        }

        for verse in &patch.verses {
            let result = query(
                "UPDATE verses SET verse_text = ? WHERE music_id = ? AND verse_number = ?",
            )
            .bind(&verse.text)
            .bind(id.0)
            .bind(verse.number)
            .execute(&mut *conn)
            .await?;

            if result.rows_affected() == 0 {
                debug!(music_id = %id, verse_number = verse.number, "No stored verse to replace");
            }
        }

        let head = query_as::<_, MusicRow>(
            "SELECT id, title, group_name, release_date, link FROM music WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| LibraryError::music_not_found(id))?;

        let verses = Self::fetch_verses(conn, id).await?;

        Ok(head.into_music(verses))
    }

    async fn fetch_verses(conn: &mut SqliteConnection, id: MusicId) -> Result<Vec<Verse>> {
        let rows = query_as::<_, (String, i64)>(
            "SELECT verse_text, verse_number FROM verses WHERE music_id = ? ORDER BY verse_number ASC",
        )
        .bind(id.0)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(text, number)| Verse::new(text, number))
            .collect())
    }
}

#[async_trait]
impl MusicRepository for SqliteMusicRepository {
    async fn find_by_name(&self, song_name: &str, group_name: &str) -> Result<Option<Music>> {
        let rows = query_as::<_, MusicVerseRow>(
            r#"
            SELECT m.id AS id, m.title AS title, m.group_name AS group_name,
                   m.release_date AS release_date, m.link AS link,
                   v.verse_text AS verse_text, v.verse_number AS verse_number
            FROM music m
            LEFT JOIN verses v ON v.music_id = m.id
            WHERE m.title = ? AND m.group_name = ?
            ORDER BY v.verse_number ASC
            "#,
        )
        .bind(song_name)
        .bind(group_name)
        .fetch_all(&self.pool)
        .await?;

        debug!(song = song_name, group = group_name, rows = rows.len(), "Looked up music by name");

        Ok(fold_rows(rows))
    }

    async fn create(&self, music: &Music) -> Result<Music> {
        let mut tx = StoreTransaction::begin(&self.pool, IsolationLevel::Default).await?;

        let result = Self::insert_music(tx.conn(), music).await;
        match result {
            Ok(created) => {
                tx.commit().await?;
                info!(
                    music_id = created.id.as_deref().unwrap_or_default(),
                    verses = created.verses.len(),
                    "Created music record"
                );
                Ok(created)
            }
            Err(e) => {
                tx.rollback_after(&e).await;
                Err(e)
            }
        }
    }

    async fn list_by_filters(
        &self,
        filters: &MusicFilters,
        page_request: PageRequest,
    ) -> Result<Vec<Music>> {
        let song_name = filters.song_name.as_deref().map(str::to_lowercase);
        let group_name = filters.group_name.as_deref().map(str::to_lowercase);

        let rows = query_as::<_, MusicRow>(
            r#"
            SELECT id, title, group_name, release_date, link
            FROM music
            WHERE (? IS NULL OR release_date = ?)
              AND (? IS NULL OR link = ?)
              AND (? IS NULL OR instr(lower(title), ?) > 0)
              AND (? IS NULL OR instr(lower(group_name), ?) > 0)
            ORDER BY id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(filters.release_date)
        .bind(filters.release_date)
        .bind(&filters.link)
        .bind(&filters.link)
        .bind(&song_name)
        .bind(&song_name)
        .bind(&group_name)
        .bind(&group_name)
        .bind(page_request.limit())
        .bind(page_request.offset())
        .fetch_all(&self.pool)
        .await?;

        debug!(
            page = page_request.page,
            page_size = page_request.page_size,
            rows = rows.len(),
            "Listed music by filters"
        );

        Ok(rows.into_iter().map(|row| row.into_music(Vec::new())).collect())
    }

    async fn list_verses(&self, music_id: &str, range: VerseRange) -> Result<Option<Music>> {
        let id = parse_id(music_id)?;

        let rows = query_as::<_, MusicVerseRow>(
            r#"
            SELECT m.id AS id, m.title AS title, m.group_name AS group_name,
                   m.release_date AS release_date, m.link AS link,
                   v.verse_text AS verse_text, v.verse_number AS verse_number
            FROM music m
            JOIN verses v ON v.music_id = m.id
            WHERE m.id = ?
            ORDER BY v.verse_number ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(id.0)
        .bind(i64::from(range.limit))
        .bind(i64::from(range.offset))
        .fetch_all(&self.pool)
        .await?;

        debug!(music_id = %id, limit = range.limit, offset = range.offset, rows = rows.len(), "Listed verses");

        Ok(fold_rows(rows))
    }

    async fn delete(&self, music_id: &str) -> Result<bool> {
        let id = parse_id(music_id)?;
        let mut tx = StoreTransaction::begin(&self.pool, IsolationLevel::Serializable).await?;

        let result = query("DELETE FROM music WHERE id = ?")
            .bind(id.0)
            .execute(tx.conn())
            .await;

        match result {
            Ok(done) => {
                tx.commit().await?;
                let deleted = done.rows_affected() > 0;
                info!(music_id = %id, deleted, "Deleted music record");
                Ok(deleted)
            }
            Err(e) => {
                let error = LibraryError::from(e);
                tx.rollback_after(&error).await;
                Err(error)
            }
        }
    }

    async fn update(&self, patch: &MusicPatch) -> Result<Music> {
        if patch.is_empty() {
            return Err(LibraryError::InvalidInput {
                field: "MusicPatch".to_string(),
                message: "no fields to update".to_string(),
            });
        }

        let id = parse_id(&patch.id)?;
        let mut tx = StoreTransaction::begin(&self.pool, IsolationLevel::Default).await?;

        let result = Self::apply_patch(tx.conn(), id, patch).await;
        match result {
            Ok(updated) => {
                tx.commit().await?;
                info!(
                    music_id = %id,
                    head_changed = patch.has_head_changes(),
                    verses = patch.verses.len(),
                    "Updated music record"
                );
                Ok(updated)
            }
            Err(e) => {
                tx.rollback_after(&e).await;
                Err(e)
            }
        }
    }
}
