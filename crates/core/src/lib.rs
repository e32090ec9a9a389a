//! Core logic for Quill.
//!
//! This crate contains logic with ZERO web or database dependencies.
//! Persistence is reached through traits implemented by the db crate.
//!
//! # Modules
//!
//! - `storage` - Streaming uploads to the media root and building public URLs
//! - `auth` - Password hashing
//! - `users` - User record service

pub mod auth;
pub mod storage;
pub mod users;
