//! Hash-keyed collections of dimension space points.
//!
//! Every collection here is keyed by [`ContentHash`] and keeps first-seen
//! insertion order, so materialized aggregates are deterministic no matter
//! how the backing hash map iterates.

use std::fmt;

use hashbrown::HashMap;

use super::dimension::{ContentHash, DimensionSpacePoint, OriginDimensionSpacePoint};

// ============================================================================
// PointMap
// ============================================================================

/// Insertion-ordered map from a point to a value.
///
/// Re-inserting a known point replaces the value but keeps its position.
#[derive(Clone)]
pub struct PointMap<P, V> {
    entries: Vec<(P, V)>,
    index: HashMap<String, usize>,
}

impl<P: ContentHash, V> PointMap<P, V> {
    pub fn new() -> Self {
        Self { entries: Vec::new(), index: HashMap::new() }
    }

    /// Insert or overwrite. Returns the previous value, if any.
    pub fn insert(&mut self, point: P, value: V) -> Option<V> {
        match self.index.get(point.content_hash()) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.index.insert(point.content_hash().to_owned(), self.entries.len());
                self.entries.push((point, value));
                None
            }
        }
    }

    /// Mutable access to the value at `point`, inserting `default()` first if absent.
    pub fn get_or_insert_with(&mut self, point: P, default: impl FnOnce() -> V) -> &mut V {
        let i = match self.index.get(point.content_hash()) {
            Some(&i) => i,
            None => {
                self.index.insert(point.content_hash().to_owned(), self.entries.len());
                self.entries.push((point, default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[i].1
    }

    pub fn get(&self, point: &impl ContentHash) -> Option<&V> {
        self.get_by_hash(point.content_hash())
    }

    pub fn get_by_hash(&self, hash: &str) -> Option<&V> {
        self.index.get(hash).map(|&i| &self.entries[i].1)
    }

    pub fn point_by_hash(&self, hash: &str) -> Option<&P> {
        self.index.get(hash).map(|&i| &self.entries[i].0)
    }

    pub fn contains(&self, point: &impl ContentHash) -> bool {
        self.index.contains_key(point.content_hash())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&P, &V)> {
        self.entries.iter().map(|(p, v)| (p, v))
    }

    pub fn points(&self) -> impl Iterator<Item = &P> {
        self.entries.iter().map(|(p, _)| p)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<P: ContentHash, V> Default for PointMap<P, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Order-insensitive: equal when both hold the same keys with equal values.
impl<P: ContentHash, V: PartialEq> PartialEq for PointMap<P, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(p, v)| other.get_by_hash(p.content_hash()) == Some(v))
    }
}

impl<P: fmt::Debug, V: fmt::Debug> fmt::Debug for PointMap<P, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter().map(|(p, v)| (p, v))).finish()
    }
}

// ============================================================================
// PointSet
// ============================================================================

/// Insertion-ordered set of points keyed by content hash.
#[derive(Clone)]
pub struct PointSet<P>(PointMap<P, ()>);

pub type DimensionSpacePointSet = PointSet<DimensionSpacePoint>;
pub type OriginDimensionSpacePointSet = PointSet<OriginDimensionSpacePoint>;

impl<P: ContentHash> PointSet<P> {
    pub fn new() -> Self {
        Self(PointMap::new())
    }

    /// Returns false if the point was already present.
    pub fn insert(&mut self, point: P) -> bool {
        self.0.insert(point, ()).is_none()
    }

    pub fn contains(&self, point: &impl ContentHash) -> bool {
        self.0.contains(point)
    }

    pub fn contains_hash(&self, hash: &str) -> bool {
        self.0.get_by_hash(hash).is_some()
    }

    pub fn get_by_hash(&self, hash: &str) -> Option<&P> {
        self.0.point_by_hash(hash)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &P> {
        self.0.points()
    }

    pub fn is_subset_of(&self, other: &PointSet<P>) -> bool {
        self.iter().all(|p| other.contains(p))
    }
}

impl<P: ContentHash> PartialEq for PointSet<P> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<P: ContentHash> Default for PointSet<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ContentHash> FromIterator<P> for PointSet<P> {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut set = Self::new();
        for point in iter {
            set.insert(point);
        }
        set
    }
}

impl<P: fmt::Debug> fmt::Debug for PointSet<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.entries.iter().map(|(p, _)| p)).finish()
    }
}

// ============================================================================
// Coverage relations
// ============================================================================

/// Fan-out: origin point → covered points served by the variant authored there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageByOrigin(PointMap<OriginDimensionSpacePoint, DimensionSpacePointSet>);

impl CoverageByOrigin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, origin: OriginDimensionSpacePoint, covered: DimensionSpacePoint) {
        self.0.get_or_insert_with(origin, PointSet::new).insert(covered);
    }

    pub fn coverage(&self, origin: &OriginDimensionSpacePoint) -> Option<&DimensionSpacePointSet> {
        self.0.get(origin)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OriginDimensionSpacePoint, &DimensionSpacePointSet)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Fan-in: covered point → the single origin serving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OriginByCoverage(PointMap<DimensionSpacePoint, OriginDimensionSpacePoint>);

impl OriginByCoverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later assignments overwrite earlier ones.
    pub fn assign(&mut self, covered: DimensionSpacePoint, origin: OriginDimensionSpacePoint) {
        self.0.insert(covered, origin);
    }

    pub fn origin(&self, covered: &DimensionSpacePoint) -> Option<&OriginDimensionSpacePoint> {
        self.0.get(covered)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DimensionSpacePoint, &OriginDimensionSpacePoint)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
