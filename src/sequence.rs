//! Lazy, page-at-a-time traversal of a log.
//!
//! [`LazySequence`] hands out events one by one and only asks its fetch
//! callback for the next page once the previous one has been consumed. The
//! same engine drives stream reads (either direction) and global log reads;
//! the page type decides how to find the next cursor and the end of data.

use std::collections::VecDeque;
use std::future::Future;

use futures_util::stream::{self, Stream};
use thiserror::Error;
use tracing::trace;

use crate::slice::{AllEventsSlice, StreamEventsSlice};

/// One page of a paginated read.
pub trait Slice {
    /// Resumption marker passed to the fetch callback.
    type Cursor: Clone + std::fmt::Debug;
    type Event;

    /// Cursor to fetch the following page from.
    fn next_cursor(&self) -> Self::Cursor;

    /// True when no page follows this one.
    fn is_end_of_stream(&self) -> bool;

    fn into_events(self) -> Vec<Self::Event>;
}

/// Errors returned by [`LazySequence::next`].
#[derive(Debug, Error)]
pub enum SequenceError<E> {
    /// `next` was called with nothing left to return. Check
    /// [`has_more`](LazySequence::has_more) first.
    #[error("No more events in sequence")]
    Exhausted,
    #[error("Failed to fetch next page")]
    Fetch(#[source] E),
}

/// Lazily traverses a paginated log with a single page of lookahead.
///
/// `F` fetches the page starting at a cursor; batch size and read direction
/// are whatever the callback uses. Each refill calls `F` exactly once, and
/// once a page reports end of data `F` is never called again.
pub struct LazySequence<S: Slice, F> {
    cursor: S::Cursor,
    fetch: F,
    buffer: VecDeque<S::Event>,
    ended: bool,
    pages_fetched: usize,
}

/// Per-stream traversal, cursor is the event number.
pub type StreamEvents<E, F> = LazySequence<StreamEventsSlice<E>, F>;

/// Global log traversal, cursor is the log [`Position`](crate::Position).
pub type AllEvents<E, F> = LazySequence<AllEventsSlice<E>, F>;

impl<S, F, Fut, E> LazySequence<S, F>
where
    S: Slice,
    F: FnMut(S::Cursor) -> Fut,
    Fut: Future<Output = Result<S, E>>,
{
    pub fn new(start: S::Cursor, fetch: F) -> Self {
        Self {
            cursor: start,
            fetch,
            buffer: VecDeque::new(),
            ended: false,
            pages_fetched: 0,
        }
    }

    /// Whether another event is available, fetching at most one page.
    pub async fn has_more(&mut self) -> Result<bool, E> {
        if !self.buffer.is_empty() {
            return Ok(true);
        }
        if self.ended {
            return Ok(false);
        }
        self.refill().await?;
        Ok(!self.buffer.is_empty())
    }

    /// Take the next event, fetching a page first if the buffer is empty.
    pub async fn next(&mut self) -> Result<S::Event, SequenceError<E>> {
        if self.buffer.is_empty() && !self.ended {
            self.refill().await.map_err(SequenceError::Fetch)?;
        }
        self.buffer.pop_front().ok_or(SequenceError::Exhausted)
    }

    /// Cursor the next fetch will start from.
    pub fn cursor(&self) -> &S::Cursor {
        &self.cursor
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// True once the last page has been fetched (events may still be buffered).
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Turn the sequence into a [`Stream`] of events.
    ///
    /// A fetch error is yielded once and ends the stream.
    pub fn into_stream(self) -> impl Stream<Item = Result<S::Event, E>> {
        stream::unfold(Some(self), |state| async move {
            let mut seq = state?;
            loop {
                match seq.has_more().await {
                    Ok(true) => {
                        let event = seq.buffer.pop_front()?;
                        return Some((Ok(event), Some(seq)));
                    }
                    // Empty page that is not the last one: keep paging.
                    Ok(false) if !seq.ended => continue,
                    Ok(false) => return None,
                    Err(e) => return Some((Err(e), None)),
                }
            }
        })
    }

    async fn refill(&mut self) -> Result<(), E> {
        debug_assert!(!self.ended, "refill after end of stream");

        let slice = (self.fetch)(self.cursor.clone()).await?;
        self.pages_fetched += 1;

        let next_cursor = slice.next_cursor();
        let ended = slice.is_end_of_stream();
        let events = slice.into_events();

        trace!(
            from = ?self.cursor,
            next = ?next_cursor,
            events = events.len(),
            ended,
            "Fetched page"
        );

        self.cursor = next_cursor;
        self.ended = ended;
        self.buffer.extend(events);
        Ok(())
    }
}

impl<S: Slice, F> std::fmt::Debug for LazySequence<S, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazySequence")
            .field("cursor", &self.cursor)
            .field("buffered", &self.buffer.len())
            .field("ended", &self.ended)
            .field("pages_fetched", &self.pages_fetched)
            .finish()
    }
}
