//! Dimension space points: coordinates in the content variation space.
//!
//! A point maps dimension names (e.g. `language`, `market`) to values.
//! Identity is the content hash of its canonical JSON form, so two points
//! are equal iff their hashes match.
//!
//! The hash is also a storage contract: whatever writes the projection's
//! `disableddimensionspacepointhash` column must produce it the same way
//! (see [`DimensionSpacePoint::hash`]).

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Anything keyed by a dimension space point hash.
pub trait ContentHash {
    fn content_hash(&self) -> &str;
}

// ============================================================================
// DimensionSpacePoint
// ============================================================================

/// A coordinate in the dimension space.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct DimensionSpacePoint {
    coordinates: BTreeMap<String, String>,
    hash: String,
}

impl DimensionSpacePoint {
    pub fn new(coordinates: BTreeMap<String, String>) -> Self {
        let hash = canonical_hash(&coordinates);
        Self { coordinates, hash }
    }

    /// The point of a dimensionless space.
    pub fn empty() -> Self {
        Self::new(BTreeMap::new())
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Parse the serialized column form, a flat JSON object of strings.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let coordinates: BTreeMap<String, String> =
            serde_json::from_str(input).map_err(|e| Error::MalformedCoordinate {
                input: input.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(Self::new(coordinates))
    }

    pub fn to_json(&self) -> String {
        canonical_json(&self.coordinates)
    }

    pub fn coordinates(&self) -> &BTreeMap<String, String> {
        &self.coordinates
    }

    pub fn coordinate(&self, dimension: &str) -> Option<&str> {
        self.coordinates.get(dimension).map(String::as_str)
    }

    /// Lowercase hex SHA-256 of [`to_json`](Self::to_json): compact JSON,
    /// keys sorted, values as strings.
    ///
    /// A `disableddimensionspacepointhash` column written any other way does
    /// not resolve under the strict policy and fails with
    /// [`Error::UnresolvedDisabledCoordinate`].
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

fn canonical_json(coordinates: &BTreeMap<String, String>) -> String {
    // BTreeMap serializes with sorted keys, which is the canonical form.
    serde_json::to_string(coordinates).unwrap_or_default()
}

fn canonical_hash(coordinates: &BTreeMap<String, String>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(coordinates).as_bytes());
    format!("{:x}", hasher.finalize())
}

impl ContentHash for DimensionSpacePoint {
    fn content_hash(&self) -> &str {
        &self.hash
    }
}

impl PartialEq for DimensionSpacePoint {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for DimensionSpacePoint {}

impl Hash for DimensionSpacePoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl From<BTreeMap<String, String>> for DimensionSpacePoint {
    fn from(coordinates: BTreeMap<String, String>) -> Self {
        Self::new(coordinates)
    }
}

impl From<DimensionSpacePoint> for BTreeMap<String, String> {
    fn from(point: DimensionSpacePoint) -> Self {
        point.coordinates
    }
}

impl fmt::Debug for DimensionSpacePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DimensionSpacePoint({})", self.to_json())
    }
}

impl fmt::Display for DimensionSpacePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

// ============================================================================
// OriginDimensionSpacePoint
// ============================================================================

/// The point where a node variant was authored.
///
/// Structurally a [`DimensionSpacePoint`], but kept as a separate type so
/// origins and covered points cannot be mixed up.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginDimensionSpacePoint(DimensionSpacePoint);

impl OriginDimensionSpacePoint {
    pub fn from_json_str(input: &str) -> Result<Self> {
        DimensionSpacePoint::from_json_str(input).map(Self)
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(DimensionSpacePoint::from_pairs(pairs))
    }

    pub fn to_dimension_space_point(&self) -> DimensionSpacePoint {
        self.0.clone()
    }

    pub fn as_dimension_space_point(&self) -> &DimensionSpacePoint {
        &self.0
    }

    pub fn hash(&self) -> &str {
        self.0.hash()
    }

    pub fn to_json(&self) -> String {
        self.0.to_json()
    }
}

impl ContentHash for OriginDimensionSpacePoint {
    fn content_hash(&self) -> &str {
        self.0.hash()
    }
}

impl From<DimensionSpacePoint> for OriginDimensionSpacePoint {
    fn from(point: DimensionSpacePoint) -> Self {
        Self(point)
    }
}

impl fmt::Debug for OriginDimensionSpacePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OriginDimensionSpacePoint({})", self.0.to_json())
    }
}

impl fmt::Display for OriginDimensionSpacePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
