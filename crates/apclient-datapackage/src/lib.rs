//! Data package caching for the Archipelago client.
//!
//! A "data package" maps each game's numeric item and location ids to
//! display names. Servers publish a checksum (or, historically, an
//! integer version) per game so clients can cache the mappings across
//! sessions. This crate provides the three pieces of that machinery:
//!
//! - [`DataPackageStore`] / [`FileDataPackageStore`] — the persistent
//!   cache, one JSON file per (game, checksum).
//! - [`Catalog`] — the in-memory id → name indices rebuilt whenever the
//!   package changes.
//! - [`sync_plan`] — the per-room decision of which cached entries are
//!   still valid and which games must be refetched.

mod catalog;
mod coherence;
mod error;
mod store;

pub use catalog::Catalog;
pub use coherence::{sync_plan, RoomCatalog, SyncPlan};
pub use error::StoreError;
pub use store::{DataPackageStore, FileDataPackageStore};
