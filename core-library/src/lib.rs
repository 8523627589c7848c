//! # Library Management Module
//!
//! Owns the catalog database and the repository used to reach it.
//!
//! ## Overview
//!
//! This crate manages:
//! - The SQLite schema and migrations
//! - Connection pooling and explicit transactions
//! - The music record repository with filtered, paginated queries

pub mod db;
pub mod error;
pub mod models;
pub mod repositories;

pub use error::{LibraryError, Result};
pub use models::{Music, MusicFilters, MusicId, MusicPatch, MusicQuery, Verse};
pub use repositories::{MusicRepository, PageRequest, SqliteMusicRepository, VerseRange};
