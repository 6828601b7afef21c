//! Page types returned by stream and global log reads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sequence::Slice;

/// Well-known stream event numbers.
pub struct StreamPosition;

impl StreamPosition {
    /// The first event in a stream.
    pub const START: u64 = 0;

    /// The last event in a stream. Only meaningful as the start of a backward
    /// read; the server clamps it to the stream's last event number.
    pub const END: u64 = u64::MAX;
}

/// Outcome of a stream read, as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SliceReadStatus {
    #[default]
    Success,
    StreamNotFound,
    StreamDeleted,
}

/// Direction of a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadDirection {
    Forward,
    Backward,
}

/// A position in the global log.
///
/// Ordered by commit position, then prepare position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub commit_position: u64,
    pub prepare_position: u64,
}

impl Position {
    /// The beginning of the global log.
    pub const START: Position = Position::new(0, 0);

    /// The end of the global log.
    pub const END: Position = Position::new(u64::MAX, u64::MAX);

    pub const fn new(commit_position: u64, prepare_position: u64) -> Self {
        Self {
            commit_position,
            prepare_position,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.commit_position, self.prepare_position)
    }
}

/// One page of a single stream's events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEventsSlice<E> {
    /// Events in read order (descending event numbers for backward reads).
    pub events: Vec<E>,
    pub from_event_number: u64,
    /// Where the following page starts.
    pub next_event_number: u64,
    pub is_end_of_stream: bool,
    pub direction: ReadDirection,
    pub status: SliceReadStatus,
}

impl<E> Slice for StreamEventsSlice<E> {
    type Cursor = u64;
    type Event = E;

    fn next_cursor(&self) -> u64 {
        self.next_event_number
    }

    /// A missing or deleted stream has nothing more to read.
    fn is_end_of_stream(&self) -> bool {
        self.is_end_of_stream || self.status != SliceReadStatus::Success
    }

    fn into_events(self) -> Vec<E> {
        self.events
    }
}

/// One page of the global log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllEventsSlice<E> {
    pub events: Vec<E>,
    pub from_position: Position,
    pub next_position: Position,
    pub direction: ReadDirection,
}

impl<E> AllEventsSlice<E> {
    /// The global log has no end marker: a page without events is the end.
    pub fn is_end_of_stream(&self) -> bool {
        self.events.is_empty()
    }
}

impl<E> Slice for AllEventsSlice<E> {
    type Cursor = Position;
    type Event = E;

    fn next_cursor(&self) -> Position {
        self.next_position
    }

    fn is_end_of_stream(&self) -> bool {
        AllEventsSlice::is_end_of_stream(self)
    }

    fn into_events(self) -> Vec<E> {
        self.events
    }
}
