//! # Repository Pattern Implementation
//!
//! Repository traits and their SQLite implementations.
//!
//! - Traits define the interface and are what the service layer depends on
//! - SQLite implementations use sqlx against a shared pool
//! - Multi-statement writes run inside a [`StoreTransaction`](crate::db::StoreTransaction)
//!
//! ## Available Repositories
//!
//! - `MusicRepository` - Song records with their lyric verses

pub mod music;
pub mod pagination;

pub use music::{MusicRepository, SqliteMusicRepository};
pub use pagination::{PageRequest, VerseRange};
