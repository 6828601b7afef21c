//! Shared test helpers for beacon integration tests.
//!
//! Provides a scripted in-process gossip client, a fixed DNS resolver, and an
//! in-memory event log that serves stream and global log pages.

// Each test binary compiles this module independently and only uses a subset
// of exports, so unused items are expected.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use beacon::{
    AllEventsSlice, DnsResolver, GossipClient, GossipSeed, MemberInfo, NodeRole, Position,
    ReadDirection, SliceReadStatus, StreamEventsSlice,
};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::time::Instant;

// ============================================================================
// Addresses and members
// ============================================================================

pub fn addr(last_octet: u8, port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, last_octet], port))
}

pub fn member(address: SocketAddr, role: NodeRole) -> MemberInfo {
    MemberInfo {
        address,
        is_alive: true,
        role,
        epoch_number: 1,
        log_position: 100,
    }
}

// ============================================================================
// ScriptedGossip — fake gossip client
// ============================================================================

/// How a seed answers gossip requests.
#[derive(Debug, Clone)]
pub enum SeedBehavior {
    /// Always respond with these members.
    Respond(Vec<MemberInfo>),
    /// Always fail.
    Fail,
    /// Never answer.
    Hang,
    /// Fail the first `n` requests, then respond.
    FailTimes(usize, Vec<MemberInfo>),
}

/// Gossip client answering from a per-endpoint script and recording calls.
#[derive(Debug, Default)]
pub struct ScriptedGossip {
    behaviors: HashMap<SocketAddr, SeedBehavior>,
    calls: Mutex<Vec<(SocketAddr, Instant)>>,
}

impl ScriptedGossip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(mut self, endpoint: SocketAddr, behavior: SeedBehavior) -> Self {
        self.behaviors.insert(endpoint, behavior);
        self
    }

    /// Every request so far, in call order.
    pub fn calls(&self) -> Vec<(SocketAddr, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Distinct instants at which requests were issued, one per round.
    pub fn round_starts(&self) -> Vec<Instant> {
        let mut starts: Vec<Instant> = self.calls().into_iter().map(|(_, at)| at).collect();
        starts.sort();
        starts.dedup();
        starts
    }

    fn calls_to(&self, endpoint: SocketAddr) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(a, _)| *a == endpoint)
            .count()
    }
}

impl GossipClient for ScriptedGossip {
    fn fetch_gossip<'a>(
        &'a self,
        seed: &'a GossipSeed,
    ) -> BoxFuture<'a, anyhow::Result<Vec<MemberInfo>>> {
        let previous = self.calls_to(seed.endpoint);
        self.calls
            .lock()
            .unwrap()
            .push((seed.endpoint, Instant::now()));

        match self.behaviors.get(&seed.endpoint).cloned() {
            Some(SeedBehavior::Respond(members)) => {
                async move { Ok::<_, anyhow::Error>(members) }.boxed()
            }
            Some(SeedBehavior::FailTimes(n, members)) if previous >= n => {
                async move { Ok::<_, anyhow::Error>(members) }.boxed()
            }
            Some(SeedBehavior::Hang) => std::future::pending().boxed(),
            Some(SeedBehavior::Fail) | Some(SeedBehavior::FailTimes(..)) | None => {
                let err = anyhow::anyhow!("connection refused: {}", seed.endpoint);
                async move { Err::<Vec<MemberInfo>, _>(err) }.boxed()
            }
        }
    }
}

// ============================================================================
// FixedResolver — fake DNS
// ============================================================================

/// Resolver that returns a fixed answer (or fails when empty-handed).
#[derive(Debug, Default)]
pub struct FixedResolver {
    answer: Option<Vec<IpAddr>>,
    lookups: AtomicUsize,
}

impl FixedResolver {
    pub fn answering(ips: Vec<IpAddr>) -> Self {
        Self {
            answer: Some(ips),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl DnsResolver for FixedResolver {
    fn resolve<'a>(&'a self, name: &'a str) -> BoxFuture<'a, anyhow::Result<Vec<IpAddr>>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let answer = self.answer.clone();
        async move { answer.ok_or_else(|| anyhow::anyhow!("no such host: {name}")) }.boxed()
    }
}

// ============================================================================
// EventLog — in-memory paginated log
// ============================================================================

/// A recorded event: its number in the stream and its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestEvent {
    pub number: u64,
    pub data: String,
}

/// In-memory log holding one stream; the global log is the same events.
#[derive(Debug)]
pub struct EventLog {
    events: Vec<TestEvent>,
    reads: AtomicUsize,
}

impl EventLog {
    /// A log with `n` events numbered from 0.
    pub fn with_events(n: u64) -> Arc<Self> {
        let events = (0..n)
            .map(|number| TestEvent {
                number,
                data: format!("event-{number}"),
            })
            .collect();
        Arc::new(Self {
            events,
            reads: AtomicUsize::new(0),
        })
    }

    pub fn events(&self) -> &[TestEvent] {
        &self.events
    }

    /// Number of page reads served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn read_stream_forward(&self, start: u64, count: usize) -> StreamEventsSlice<TestEvent> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let from = (start as usize).min(self.events.len());
        let to = (from + count).min(self.events.len());
        let page = self.events[from..to].to_vec();
        let next = to as u64;

        StreamEventsSlice {
            events: page,
            from_event_number: start,
            next_event_number: next,
            is_end_of_stream: to >= self.events.len(),
            direction: ReadDirection::Forward,
            status: SliceReadStatus::Success,
        }
    }

    pub fn read_stream_backward(&self, start: u64, count: usize) -> StreamEventsSlice<TestEvent> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let last = self.events.len().saturating_sub(1) as u64;
        let start = start.min(last);
        let count = count as u64;
        let lowest = start.saturating_sub(count - 1);
        let page = (lowest..=start)
            .rev()
            .map(|n| self.events[n as usize].clone())
            .collect();

        StreamEventsSlice {
            events: page,
            from_event_number: start,
            next_event_number: start.saturating_sub(count),
            is_end_of_stream: start < count,
            direction: ReadDirection::Backward,
            status: SliceReadStatus::Success,
        }
    }

    /// Global log page; event `n` sits at position `(n * 10, n * 10)`.
    pub fn read_all_forward(&self, from: Position, count: usize) -> AllEventsSlice<TestEvent> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let page: Vec<TestEvent> = self
            .events
            .iter()
            .filter(|e| position_of(e.number) >= from)
            .take(count)
            .cloned()
            .collect();
        let next_position = match page.last() {
            Some(e) => position_of(e.number + 1),
            None => from,
        };

        AllEventsSlice {
            events: page,
            from_position: from,
            next_position,
            direction: ReadDirection::Forward,
        }
    }
}

pub fn position_of(event_number: u64) -> Position {
    Position::new(event_number * 10, event_number * 10)
}
