#![doc = "firestore-seed-core: core logic library for firestore-seed."]

//! This crate holds the seed tree model, placeholder substitution, identifier
//! resolution, the recursive collection importer and the per-source
//! orchestration. It performs no network I/O: the target database is reached
//! through the [`contract::DocumentStore`] trait, implemented by the CLI crate
//! for Cloud Firestore and by [`memory::MemoryStore`] here.
//!
//! # Usage
//! Load seeds with [`loader::DirectorySeedLoader`], then hand them to
//! [`seeding::seed_all`] together with a store.

pub mod config;
pub mod contract;
pub mod error;
pub mod identifier;
pub mod import;
pub mod loader;
pub mod memory;
pub mod seed;
pub mod seeding;
pub mod substitute;
