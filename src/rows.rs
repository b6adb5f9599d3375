use std::sync::Arc;

use crate::error::SqlGatewayError;
use crate::types::SqlValue;

/// A single decoded row.
///
/// Column names are shared across all rows of one result.
#[derive(Debug, Clone)]
pub struct Row {
    column_names: Arc<Vec<String>>,
    values: Vec<SqlValue>,
}

impl Row {
    pub(crate) fn new(column_names: Arc<Vec<String>>, values: Vec<SqlValue>) -> Self {
        Self {
            column_names,
            values,
        }
    }

    /// Get a value by column name.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&SqlValue> {
        let idx = self.column_names.iter().position(|col| col == column_name)?;
        self.values.get(idx)
    }

    /// Get a value by column index.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Consume the row, yielding its values in column order.
    #[must_use]
    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}

/// A single-pass, forward-only sequence of row results.
///
/// Each item is itself a `Result`: decoding can fail per row without
/// poisoning the rest of the sequence. Consuming the iterator exhausts it;
/// it is not restartable.
#[derive(Debug)]
pub struct Rows {
    column_names: Arc<Vec<String>>,
    items: std::vec::IntoIter<Result<Vec<SqlValue>, SqlGatewayError>>,
}

impl Rows {
    pub fn new(
        column_names: Vec<String>,
        items: Vec<Result<Vec<SqlValue>, SqlGatewayError>>,
    ) -> Self {
        Self {
            column_names: Arc::new(column_names),
            items: items.into_iter(),
        }
    }

    /// An empty result, as produced by statements that return no rows.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Rows not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.items.len()
    }
}

impl Iterator for Rows {
    type Item = Result<Row, SqlGatewayError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.next()?;
        Some(item.map(|values| Row::new(Arc::clone(&self.column_names), values)))
    }
}
