//! Leader discovery over gossip.
//!
//! Each call to [`ClusterDiscoverer::discover`] runs up to
//! `max_discover_attempts` rounds. A round resolves the candidate seeds,
//! queries all of them concurrently (each under the gossip timeout) and ranks
//! whatever came back. Unreachable seeds and DNS failures only cost the round;
//! the caller sees an error once every round has failed.

use std::net::SocketAddr;

use futures_util::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{DiscoverySettings, SeedSource};
use crate::gossip::{DnsResolver, GossipClient, GossipSeed, MemberInfo, TokioDnsResolver};
use crate::rank::rank;

/// Errors returned by [`ClusterDiscoverer::discover`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("Failed to discover a cluster node after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Finds the node a client should connect to.
///
/// Holds no state between calls, so one discoverer can serve any number of
/// concurrent `discover` calls.
pub struct ClusterDiscoverer<G, R = TokioDnsResolver> {
    settings: DiscoverySettings,
    gossip: G,
    resolver: R,
}

impl<G: GossipClient> ClusterDiscoverer<G> {
    /// Create a discoverer that resolves cluster DNS with the system resolver.
    pub fn new(settings: DiscoverySettings, gossip: G) -> Self {
        Self::with_resolver(settings, gossip, TokioDnsResolver)
    }
}

impl<G: GossipClient, R: DnsResolver> ClusterDiscoverer<G, R> {
    pub fn with_resolver(settings: DiscoverySettings, gossip: G, resolver: R) -> Self {
        Self {
            settings,
            gossip,
            resolver,
        }
    }

    pub fn settings(&self) -> &DiscoverySettings {
        &self.settings
    }

    pub fn gossip(&self) -> &G {
        &self.gossip
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Discover the current leader (or best available node).
    ///
    /// `failed_endpoint` is left out of this call, both as a gossip seed and as
    /// a ranked member. Pass back an address `discover` returned once the
    /// connection to it fails.
    pub async fn discover(
        &self,
        failed_endpoint: Option<SocketAddr>,
    ) -> Result<SocketAddr, DiscoveryError> {
        let max_attempts = self.settings.max_discover_attempts();
        let mut attempt: u32 = 0;

        while max_attempts.map_or(true, |max| attempt < max) {
            attempt = next_attempt(attempt);

            if let Some(node) = self.discover_round(attempt, failed_endpoint).await {
                info!(
                    attempt,
                    node = %node.address,
                    role = ?node.role,
                    "Discovered cluster node"
                );
                return Ok(node.address);
            }

            if max_attempts.map_or(true, |max| attempt < max) {
                debug!(
                    attempt,
                    retry_in = ?self.settings.discover_attempt_interval(),
                    "Discovery attempt failed"
                );
                tokio::time::sleep(self.settings.discover_attempt_interval()).await;
            }
        }

        warn!(attempts = attempt, "Cluster node discovery exhausted");
        Err(DiscoveryError::Exhausted { attempts: attempt })
    }

    /// One gossip round. `None` means the round produced no usable node.
    async fn discover_round(
        &self,
        attempt: u32,
        failed_endpoint: Option<SocketAddr>,
    ) -> Option<MemberInfo> {
        let candidates = match self.gossip_candidates(failed_endpoint).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(attempt, error = %e, "Failed to resolve gossip candidates");
                return None;
            }
        };

        debug!(attempt, candidates = candidates.len(), "Starting discovery round");

        let responses = join_all(candidates.iter().map(|seed| self.query_seed(seed))).await;
        let members: Vec<MemberInfo> = responses
            .into_iter()
            .flatten()
            .flatten()
            .filter(|member| Some(member.address) != failed_endpoint)
            .collect();

        if members.is_empty() {
            return None;
        }
        rank(&members).cloned()
    }

    /// Query one seed, swallowing failures and timeouts.
    async fn query_seed(&self, seed: &GossipSeed) -> Option<Vec<MemberInfo>> {
        let timeout = self.settings.gossip_timeout();
        match tokio::time::timeout(timeout, self.gossip.fetch_gossip(seed)).await {
            Ok(Ok(members)) => Some(members),
            Ok(Err(e)) => {
                debug!(seed = %seed, error = %e, "Gossip request failed");
                None
            }
            Err(_) => {
                debug!(seed = %seed, ?timeout, "Gossip request timed out");
                None
            }
        }
    }

    async fn gossip_candidates(
        &self,
        failed_endpoint: Option<SocketAddr>,
    ) -> anyhow::Result<Vec<GossipSeed>> {
        let candidates = match self.settings.seed_source() {
            SeedSource::GossipSeeds(seeds) => seeds.clone(),
            SeedSource::Dns(name) => {
                let port = self.settings.external_gossip_port();
                self.resolver
                    .resolve(name)
                    .await?
                    .into_iter()
                    .map(|ip| GossipSeed::new(SocketAddr::new(ip, port)))
                    .collect()
            }
        };

        Ok(match failed_endpoint {
            Some(failed) => candidates
                .into_iter()
                .filter(|seed| seed.endpoint != failed)
                .collect(),
            None => candidates,
        })
    }
}

/// Attempt counter step; unlimited discovery stops counting at `u32::MAX`.
fn next_attempt(attempt: u32) -> u32 {
    attempt.saturating_add(1)
}

impl<G, R> std::fmt::Debug for ClusterDiscoverer<G, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterDiscoverer")
            .field("settings", &self.settings)
            .finish()
    }
}
