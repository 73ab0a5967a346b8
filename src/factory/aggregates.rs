//! Splitting a mixed row set into one [`NodeAggregate`] per aggregate id.
//!
//! The input is walked exactly once to partition row references by the raw
//! aggregate id column, in first-seen order. That pass does no decoding.
//! Node materialization and point decoding for a partition happen only when
//! the iterator is pulled for it, so stopping early skips the rest.

use hashbrown::HashMap;

use crate::model::*;
use crate::row::{Row, columns};
use crate::Result;
use super::aggregate::AggregateAccumulator;
use super::NodeFactory;

/// Lazy iterator over the aggregates of a mixed row set.
///
/// Ends after the first `Err` item.
pub struct NodeAggregates<'a> {
    factory: &'a NodeFactory,
    visibility_constraints: VisibilityConstraints,
    content_stream_id: Option<ContentStreamId>,
    partitions: std::vec::IntoIter<Vec<&'a Row>>,
}

impl<'a> NodeAggregates<'a> {
    /// Aggregates not yet yielded.
    pub fn remaining(&self) -> usize {
        self.partitions.len()
    }
}

impl Iterator for NodeAggregates<'_> {
    type Item = Result<NodeAggregate>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let partition = self.partitions.next()?;
            let mut accumulator = AggregateAccumulator::new(
                self.factory,
                self.visibility_constraints,
                self.content_stream_id.clone(),
            );
            for row in &partition {
                if let Err(e) = accumulator.accumulate(row) {
                    // Fused: nothing is yielded after the first failure.
                    self.partitions = Vec::new().into_iter();
                    return Some(Err(e));
                }
            }
            // Partitions are never empty, so this always yields.
            if let Some(aggregate) = accumulator.finish() {
                tracing::trace!(
                    node_aggregate_id = %aggregate.node_aggregate_id,
                    rows = partition.len(),
                    "emitted node aggregate"
                );
                return Some(Ok(aggregate));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.partitions.size_hint()
    }
}

impl ExactSizeIterator for NodeAggregates<'_> {}

impl std::iter::FusedIterator for NodeAggregates<'_> {}

impl NodeFactory {
    /// Partition rows by aggregate id and fold each partition lazily.
    ///
    /// The content stream is pinned to the first row of the whole input.
    /// Fails up front only if a row has no aggregate id or the first row's
    /// content stream id is invalid. A failing aggregate surfaces as an
    /// `Err` item when it is pulled, and the iterator ends there.
    pub fn map_node_rows_to_node_aggregates<'a>(
        &'a self,
        rows: impl IntoIterator<Item = &'a Row>,
        visibility_constraints: VisibilityConstraints,
    ) -> Result<NodeAggregates<'a>> {
        let mut content_stream_id = None;
        let mut index: HashMap<&'a str, usize> = HashMap::new();
        let mut partitions: Vec<Vec<&'a Row>> = Vec::new();
        let mut row_count = 0usize;

        for row in rows {
            if content_stream_id.is_none() {
                content_stream_id =
                    Some(ContentStreamId::from_string(row.require(columns::CONTENT_STREAM_ID)?)?);
            }
            let key = row.require(columns::NODE_AGGREGATE_ID)?;
            let slot = *index.entry(key).or_insert_with(|| {
                partitions.push(Vec::new());
                partitions.len() - 1
            });
            partitions[slot].push(row);
            row_count += 1;
        }

        tracing::debug!(
            rows = row_count,
            aggregates = partitions.len(),
            "partitioned node aggregate rows"
        );
        Ok(NodeAggregates {
            factory: self,
            visibility_constraints,
            content_stream_id,
            partitions: partitions.into_iter(),
        })
    }
}
