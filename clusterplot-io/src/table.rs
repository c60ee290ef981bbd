//! Row-oriented access to cluster tables.

use crate::{Error, Result};
use clusterplot_core::{Event, Field};
use std::ops::Range;

/// A table of events with sequence-valued cluster fields.
pub trait ClusterTable {
    /// Number of events (rows).
    fn row_count(&self) -> usize;

    /// Returns true if at least one row may carry `field`.
    fn has_field(&self, field: Field) -> bool;

    /// Reads a contiguous range of rows.
    ///
    /// # Errors
    /// Returns an error if the range exceeds the table or the storage fails.
    fn read_rows(&self, rows: Range<usize>) -> Result<Vec<Event>>;

    /// Fields present in the table, in storage order.
    fn fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|&field| self.has_field(field))
            .collect()
    }

    /// Returns true if any energy field is present.
    fn has_energy(&self) -> bool {
        Field::ENERGY.into_iter().any(|field| self.has_field(field))
    }

    /// Iterates the table in chunks of at most `chunk_rows` events.
    fn events(&self, chunk_rows: usize) -> EventChunks<'_, Self> {
        EventChunks::new(self, chunk_rows)
    }
}

/// Lazy forward iterator over consecutive row chunks of a table.
pub struct EventChunks<'a, T: ?Sized> {
    table: &'a T,
    next_row: usize,
    chunk_rows: usize,
}

impl<'a, T: ClusterTable + ?Sized> EventChunks<'a, T> {
    fn new(table: &'a T, chunk_rows: usize) -> Self {
        Self {
            table,
            next_row: 0,
            chunk_rows: chunk_rows.max(1),
        }
    }

    /// Rows not yet yielded.
    #[must_use]
    pub fn remaining_rows(&self) -> usize {
        self.table.row_count().saturating_sub(self.next_row)
    }
}

impl<T: ClusterTable + ?Sized> Iterator for EventChunks<'_, T> {
    type Item = Result<Vec<Event>>;

    fn next(&mut self) -> Option<Self::Item> {
        let total = self.table.row_count();
        if self.next_row >= total {
            return None;
        }
        let start = self.next_row;
        let end = (start + self.chunk_rows).min(total);
        self.next_row = end;
        log::debug!("reading rows {start}..{end} of {total}");
        Some(self.table.read_rows(start..end))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let chunks = self.remaining_rows().div_ceil(self.chunk_rows);
        (chunks, Some(chunks))
    }
}

/// A table held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    events: Vec<Event>,
}

impl MemoryTable {
    /// Creates a table from events.
    #[must_use]
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// Appends one event.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Borrowed events.
    #[must_use]
    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }
}

impl FromIterator<Event> for MemoryTable {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl ClusterTable for MemoryTable {
    fn row_count(&self) -> usize {
        self.events.len()
    }

    fn has_field(&self, field: Field) -> bool {
        self.events.iter().any(|event| event.has_column(field))
    }

    fn read_rows(&self, rows: Range<usize>) -> Result<Vec<Event>> {
        self.events.get(rows.clone()).map(<[Event]>::to_vec).ok_or_else(|| {
            Error::InvalidFormat(format!(
                "rows {}..{} out of range for {} events",
                rows.start,
                rows.end,
                self.events.len()
            ))
        })
    }
}
