//! Item identities and the tiles that place them on the grid.
//!
//! Every item owns two tiles: a *primary* tile (the video embed) and an
//! *auxiliary* tile (the chat embed). Tiles are addressed by a composite
//! [`TileKey`] rendered as `"<kind>-<item>"`, which is the element key the
//! grid renderer sees.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::GridRect;

/// Identifier of one grid item (a stream name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create an item id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Consume into the underlying string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for ItemId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ItemId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Build an owned item list from anything string-like.
pub fn item_ids<I, S>(ids: I) -> Vec<ItemId>
where
    I: IntoIterator<Item = S>,
    S: Into<ItemId>,
{
    ids.into_iter().map(Into::into).collect()
}

/// Which of an item's two tiles a key refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    /// The item's main tile.
    Primary,
    /// The item's secondary (chat) tile. At most one is visible at a time.
    Auxiliary,
}

impl TileKind {
    /// Key prefix for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Auxiliary => "auxiliary",
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to parse a [`TileKey`] from its string form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileKeyParseError {
    #[error("tile key {0:?} has no '-' separator")]
    MissingSeparator(String),
    #[error("tile key {key:?} has unknown kind {kind:?}")]
    UnknownKind { key: String, kind: String },
    #[error("tile key {0:?} has an empty item id")]
    EmptyItem(String),
}

/// Composite tile address: kind plus owning item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TileKey {
    pub kind: TileKind,
    pub item: ItemId,
}

impl TileKey {
    #[must_use]
    pub fn new(kind: TileKind, item: impl Into<ItemId>) -> Self {
        Self {
            kind,
            item: item.into(),
        }
    }

    #[must_use]
    pub fn primary(item: impl Into<ItemId>) -> Self {
        Self::new(TileKind::Primary, item)
    }

    #[must_use]
    pub fn auxiliary(item: impl Into<ItemId>) -> Self {
        Self::new(TileKind::Auxiliary, item)
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.item)
    }
}

impl FromStr for TileKey {
    type Err = TileKeyParseError;

    /// Splits on the first `-`; item ids may contain further dashes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, item) = s
            .split_once('-')
            .ok_or_else(|| TileKeyParseError::MissingSeparator(s.to_owned()))?;
        let kind = match kind {
            "primary" => TileKind::Primary,
            "auxiliary" => TileKind::Auxiliary,
            other => {
                return Err(TileKeyParseError::UnknownKind {
                    key: s.to_owned(),
                    kind: other.to_owned(),
                });
            }
        };
        if item.is_empty() {
            return Err(TileKeyParseError::EmptyItem(s.to_owned()));
        }
        Ok(Self::new(kind, item))
    }
}

impl TryFrom<String> for TileKey {
    type Error = TileKeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TileKey> for String {
    fn from(key: TileKey) -> Self {
        key.to_string()
    }
}

/// One positioned tile: what the grid renderer consumes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileKey,
    #[serde(flatten)]
    pub rect: GridRect,
}

impl Tile {
    #[must_use]
    pub fn new(id: TileKey, rect: GridRect) -> Self {
        Self { id, rect }
    }

    #[must_use]
    pub fn primary(item: impl Into<ItemId>, rect: GridRect) -> Self {
        Self::new(TileKey::primary(item), rect)
    }

    #[must_use]
    pub fn auxiliary(item: impl Into<ItemId>, rect: GridRect) -> Self {
        Self::new(TileKey::auxiliary(item), rect)
    }

    #[must_use]
    pub fn hidden_auxiliary(item: impl Into<ItemId>) -> Self {
        Self::auxiliary(item, GridRect::HIDDEN)
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> TileKind {
        self.id.kind
    }

    #[inline]
    #[must_use]
    pub fn item(&self) -> &ItemId {
        &self.id.item
    }

    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.rect.is_visible()
    }
}
