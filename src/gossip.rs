//! Gossip data model and the network capabilities discovery depends on.
//!
//! beacon never speaks the gossip wire format itself. A [`GossipClient`]
//! supplied by the connection layer turns a [`GossipSeed`] into decoded
//! [`MemberInfo`] records, and a [`DnsResolver`] turns a cluster DNS name into
//! addresses.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};

/// One gossip endpoint to query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GossipSeed {
    pub endpoint: SocketAddr,
    /// Value for the HTTP `Host` header, when the endpoint sits behind a proxy.
    #[serde(default)]
    pub host_header: Option<String>,
}

impl GossipSeed {
    pub fn new(endpoint: SocketAddr) -> Self {
        Self {
            endpoint,
            host_header: None,
        }
    }

    pub fn with_host_header(endpoint: SocketAddr, host_header: impl Into<String>) -> Self {
        Self {
            endpoint,
            host_header: Some(host_header.into()),
        }
    }
}

impl fmt::Display for GossipSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.host_header {
            Some(ref host) => write!(f, "{} (host: {host})", self.endpoint),
            None => write!(f, "{}", self.endpoint),
        }
    }
}

/// Role a member declares for itself in a gossip response.
///
/// `Ord` ranks roles by preference: Leader, Follower, ReadReplica, Other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    Leader,
    Follower,
    ReadReplica,
    /// Any state that is not a serving role (initializing, catching up, ...).
    #[serde(other)]
    Other,
}

impl NodeRole {
    /// Higher is preferred.
    pub fn priority(self) -> u8 {
        match self {
            NodeRole::Leader => 3,
            NodeRole::Follower => 2,
            NodeRole::ReadReplica => 1,
            NodeRole::Other => 0,
        }
    }
}

impl PartialOrd for NodeRole {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeRole {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority().cmp(&other.priority())
    }
}

/// One member's state as reported by a single gossip round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    /// Client-facing TCP address of the member.
    pub address: SocketAddr,
    pub is_alive: bool,
    pub role: NodeRole,
    pub epoch_number: u64,
    /// Last log position the member has written.
    pub log_position: u64,
}

impl MemberInfo {
    /// Recency marker: later epochs win, then further log positions.
    pub fn recency(&self) -> (u64, u64) {
        (self.epoch_number, self.log_position)
    }
}

// ============================================================================
// Injected capabilities
// ============================================================================

/// Fetches the membership view a gossip endpoint reports.
///
/// Implemented by the connection layer (HTTP gossip, test doubles, ...).
/// Timeouts are enforced by the caller.
pub trait GossipClient: Send + Sync {
    fn fetch_gossip<'a>(
        &'a self,
        seed: &'a GossipSeed,
    ) -> BoxFuture<'a, anyhow::Result<Vec<MemberInfo>>>;
}

/// Resolves a cluster DNS name into member addresses.
pub trait DnsResolver: Send + Sync {
    fn resolve<'a>(&'a self, name: &'a str) -> BoxFuture<'a, anyhow::Result<Vec<IpAddr>>>;
}

/// [`DnsResolver`] backed by the system resolver via tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDnsResolver;

impl DnsResolver for TokioDnsResolver {
    fn resolve<'a>(&'a self, name: &'a str) -> BoxFuture<'a, anyhow::Result<Vec<IpAddr>>> {
        async move {
            let mut ips: Vec<IpAddr> = tokio::net::lookup_host((name, 0u16))
                .await?
                .map(|addr| addr.ip())
                .collect();
            ips.sort();
            ips.dedup();
            Ok(ips)
        }
        .boxed()
    }
}
