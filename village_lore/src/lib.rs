//! # Village Lore
//!
//! The "Village Bible" crate - holds every piece of hand-authored setting data the
//! dialogue pipeline reads: who the NPCs are, what is happening in the village, and
//! the lines each persona falls back on. This crate contains no generation logic.
//!
//! ## Core Components
//!
//! - **persona**: Character personas with lore memory fragments and speech patterns
//! - **world**: World lore (village name, background, current events)
//! - **voice**: Per-persona dispatch tables (rejections, fallback pools, style guides)
//! - **config**: TOML loading of the tables above

pub mod config;
pub mod persona;
pub mod voice;
pub mod world;

pub use config::*;
pub use persona::*;
pub use voice::*;
pub use world::*;
