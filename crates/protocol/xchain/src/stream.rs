//! Ordering within a stream.
//!
//! Offsets on a stream are observed non-decreasing and gap free. A gap means the missing
//! messages have not been observed yet, never that they were skipped.

use crate::{MsgId, StreamError, StreamId};
use core::ops::Range;
use std::collections::BTreeMap;

/// Outcome of observing an offset with a [StreamCursor].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The next expected offset.
    Next,
    /// An offset past the next expected one. The skipped offsets are still pending.
    Ahead {
        /// Offsets not observed yet.
        pending: Range<u64>,
    },
    /// The latest observed offset, again.
    Duplicate,
}

/// Tracks the observed offsets of one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamCursor {
    stream: StreamId,
    next: u64,
    latest: Option<u64>,
}

impl StreamCursor {
    /// Creates a cursor expecting `first_offset` next.
    pub const fn new(stream: StreamId, first_offset: u64) -> Self {
        Self { stream, next: first_offset, latest: None }
    }

    /// Returns the stream of the cursor.
    pub const fn stream(&self) -> StreamId {
        self.stream
    }

    /// Returns the next expected offset.
    pub const fn next_offset(&self) -> u64 {
        self.next
    }

    /// Returns the highest offset observed so far.
    pub const fn latest(&self) -> Option<u64> {
        self.latest
    }

    /// Returns the number of offsets before `offset` that are still pending.
    pub const fn gap(&self, offset: u64) -> u64 {
        offset.saturating_sub(self.next)
    }

    /// Observes the message `id`, advancing the cursor.
    ///
    /// Observing an offset below the latest one is a [StreamError::Regressed] and leaves the
    /// cursor untouched.
    pub fn observe(&mut self, id: MsgId) -> Result<Observation, StreamError> {
        if id.stream_id != self.stream {
            return Err(StreamError::WrongStream { expected: self.stream, actual: id.stream_id });
        }

        let offset = id.stream_offset;
        match self.latest {
            Some(latest) if offset < latest => {
                return Err(StreamError::Regressed { stream: self.stream, offset, latest });
            }
            Some(latest) if offset == latest => return Ok(Observation::Duplicate),
            _ => {}
        }

        let observation = if offset > self.next {
            Observation::Ahead { pending: self.next..offset }
        } else {
            Observation::Next
        };
        self.latest = Some(offset);
        self.next = offset.saturating_add(1);

        Ok(observation)
    }
}

/// Buffers out of order items of one stream and releases them strictly by offset.
#[derive(Debug, Clone)]
pub struct OrderedBuffer<T> {
    next: u64,
    pending: BTreeMap<u64, T>,
}

impl<T> OrderedBuffer<T> {
    /// Creates a buffer that releases `first_offset` first.
    pub const fn new(first_offset: u64) -> Self {
        Self { next: first_offset, pending: BTreeMap::new() }
    }

    /// Returns the offset released next.
    pub const fn next_offset(&self) -> u64 {
        self.next
    }

    /// Returns the number of buffered items.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Buffers `item` at `offset`.
    ///
    /// Returns false if the offset was already released. A buffered duplicate is replaced.
    pub fn insert(&mut self, offset: u64, item: T) -> bool {
        if offset < self.next {
            return false;
        }
        self.pending.insert(offset, item);
        true
    }

    /// Returns the item at the next offset, if it is buffered.
    pub fn next_ready(&self) -> Option<&T> {
        self.pending.get(&self.next)
    }

    /// Releases the item at the next offset, if it is buffered.
    pub fn advance(&mut self) -> Option<T> {
        let item = self.pending.remove(&self.next)?;
        self.next += 1;
        Some(item)
    }

    /// Moves the next offset to `offset`, dropping the buffered items below it.
    pub fn reset(&mut self, offset: u64) {
        self.pending = self.pending.split_off(&offset);
        self.next = offset;
    }

    /// Releases the contiguous run of items starting at the next offset.
    pub fn drain_ready(&mut self) -> Vec<T> {
        core::iter::from_fn(|| self.advance()).collect()
    }
}
