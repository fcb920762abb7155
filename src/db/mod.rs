//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `patch.rs`: create payloads and optional-field patch types
//! - `actor.rs`: the DB actor and its typed handle

pub mod actor;
pub mod models;
pub mod patch;
pub mod schema;
pub mod traits;

mod patch_impl;

pub use models::{DbContactMessage, DbGalleryItem, DbReference, DbUser, UserRole};
pub use patch::{
    ContactMessageCreate, GalleryItemCreate, GalleryItemPatch, RecordPatch, ReferenceCreate,
    ReferencePatch, UserCreate,
};
pub use schema::SQLITE_INIT;

pub use actor::{DbHandle, spawn};
