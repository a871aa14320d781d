#![forbid(unsafe_code)]

//! Core grid primitives for Bentostream.
//!
//! # Role in Bentostream
//! `bento-core` defines the vocabulary every other crate speaks: grid cells
//! ([`GridRect`]), item identities ([`ItemId`]), and positioned tiles
//! ([`Tile`]) keyed by [`TileKey`]. It has no state and performs no I/O.
//!
//! # How it fits in the system
//! `bento-layout` builds arrangements out of these tiles and persists them;
//! presentation layers consume `Tile` lists directly as renderer input.

pub mod geometry;
pub mod logging;
pub mod tile;

pub use geometry::{GRID_COLUMNS, GridRect};
pub use logging::{LogFormat, LoggingError};
pub use tile::{ItemId, Tile, TileKey, TileKeyParseError, TileKind, item_ids};
