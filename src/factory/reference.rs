//! Mapping reference rows to [`References`].

use crate::model::*;
use crate::row::{Row, columns};
use crate::{Error, Result};
use super::NodeFactory;

impl NodeFactory {
    /// Each row is a full node row of the reference target plus the edge
    /// columns. Row order is kept and nothing is deduplicated.
    pub fn map_reference_rows_to_references<'r>(
        &self,
        rows: impl IntoIterator<Item = &'r Row>,
        visibility_constraints: VisibilityConstraints,
        content_stream_id: Option<&ContentStreamId>,
    ) -> Result<References> {
        let mut references = References::new();
        for row in rows {
            let name = match row.non_empty(columns::REFERENCE_NAME) {
                Some(name) => PropertyName::from_string(name)?,
                None => {
                    return Err(Error::MissingEdgeName(
                        row.get(columns::NODE_AGGREGATE_ID).unwrap_or_default().to_owned(),
                    ));
                }
            };
            let node = self.map_node_row_to_node(row, visibility_constraints, None, content_stream_id)?;
            let properties = row
                .non_empty(columns::REFERENCE_PROPERTIES)
                .map(|serialized| self.property_collection(serialized))
                .transpose()?;
            references.push(Reference::new(node, name, properties));
        }
        tracing::trace!(references = references.len(), "mapped reference rows");
        Ok(references)
    }
}
