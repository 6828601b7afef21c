//! beacon — leader discovery and lazy log reads for event-log cluster clients.
//!
//! Two pieces a client needs before and after it has a connection:
//!
//! - **Discovery**: find the node to talk to by asking gossip seeds (explicit
//!   or DNS-resolved) for their view of the cluster, with bounded retry.
//! - **Lazy reads**: walk a stream or the global log one page at a time,
//!   without holding more than one page in memory.
//!
//! beacon does no networking of its own beyond DNS: gossip requests and page
//! reads are injected by the connection layer.
//!
//! # Quick start
//!
//! 1. Build [`DiscoverySettings`] with [`DiscoverySettings::for_gossip_seeds`]
//!    or [`DiscoverySettings::for_dns`] (or load a [`DiscoveryConfig`]).
//! 2. Implement [`GossipClient`] over your gossip transport and create a
//!    [`ClusterDiscoverer`]; call [`discover`](ClusterDiscoverer::discover)
//!    whenever a connection needs an endpoint.
//! 3. Wrap your page read in a [`LazySequence`] and pull events with
//!    [`has_more`](LazySequence::has_more) / [`next`](LazySequence::next), or
//!    consume it as a stream with [`into_stream`](LazySequence::into_stream).

pub mod config;
pub mod discovery;
pub mod gossip;
pub mod rank;
pub mod sequence;
pub mod slice;

pub use config::{
    ConfigError, DiscoveryConfig, DiscoverySettings, DnsSettingsBuilder,
    GossipSeedSettingsBuilder, SeedSource, DEFAULT_EXTERNAL_GOSSIP_PORT,
};
pub use discovery::{ClusterDiscoverer, DiscoveryError};
pub use gossip::{DnsResolver, GossipClient, GossipSeed, MemberInfo, NodeRole, TokioDnsResolver};
pub use rank::rank;
pub use sequence::{AllEvents, LazySequence, SequenceError, Slice, StreamEvents};
pub use slice::{
    AllEventsSlice, Position, ReadDirection, SliceReadStatus, StreamEventsSlice, StreamPosition,
};
