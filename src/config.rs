//! Discovery settings and their builders.
//!
//! Settings come in two shapes: an explicit list of gossip seeds, or a DNS
//! name that resolves to the cluster's gossip endpoints. Both are built with
//! [`DiscoverySettings::for_gossip_seeds`] / [`DiscoverySettings::for_dns`],
//! or loaded from a deserialized [`DiscoveryConfig`].

use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::gossip::GossipSeed;

/// Gossip port used for DNS-resolved addresses when none is configured.
pub const DEFAULT_EXTERNAL_GOSSIP_PORT: u16 = 30778;

/// Discovery attempts made per `discover` call when none is configured.
pub const DEFAULT_MAX_DISCOVER_ATTEMPTS: i32 = 10;

/// Delay between two failed discovery rounds when none is configured.
pub const DEFAULT_DISCOVER_ATTEMPT_INTERVAL: Duration = Duration::from_millis(500);

/// Per-seed gossip timeout when none is configured.
pub const DEFAULT_GOSSIP_TIMEOUT: Duration = Duration::from_secs(1);

/// `max_discover_attempts` value meaning "retry forever".
pub const UNLIMITED_DISCOVER_ATTEMPTS: i32 = -1;

/// Errors raised while building [`DiscoverySettings`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Gossip seed list is empty")]
    EmptyGossipSeeds,
    #[error("Cluster DNS name is empty")]
    EmptyClusterDns,
    #[error("max_discover_attempts value is out of range: {0}. Allowed range: [-1, infinity]")]
    MaxDiscoverAttemptsOutOfRange(i32),
    #[error("External gossip port should be positive")]
    NonPositivePort,
    #[error("Both cluster DNS and gossip seeds are configured")]
    AmbiguousSeedSource,
    #[error("External gossip port only applies to cluster DNS discovery")]
    PortWithoutClusterDns,
}

// ============================================================================
// DiscoverySettings
// ============================================================================

/// Where the discoverer finds gossip endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    /// A fixed list of gossip endpoints.
    GossipSeeds(Vec<GossipSeed>),
    /// A DNS name resolved on every discovery attempt.
    Dns(String),
}

/// Validated, immutable discovery configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverySettings {
    seed_source: SeedSource,
    max_discover_attempts: Option<u32>,
    discover_attempt_interval: Duration,
    external_gossip_port: u16,
    gossip_timeout: Duration,
}

impl DiscoverySettings {
    /// Start building settings for an explicit gossip seed list.
    pub fn for_gossip_seeds() -> GossipSeedSettingsBuilder {
        GossipSeedSettingsBuilder::default()
    }

    /// Start building settings for DNS-based discovery.
    pub fn for_dns() -> DnsSettingsBuilder {
        DnsSettingsBuilder::default()
    }

    pub fn seed_source(&self) -> &SeedSource {
        &self.seed_source
    }

    /// Maximum rounds per `discover` call, `None` when unlimited.
    pub fn max_discover_attempts(&self) -> Option<u32> {
        self.max_discover_attempts
    }

    pub fn discover_attempt_interval(&self) -> Duration {
        self.discover_attempt_interval
    }

    /// Port paired with DNS-resolved addresses. `0` for explicit seeds,
    /// which carry their own ports.
    pub fn external_gossip_port(&self) -> u16 {
        self.external_gossip_port
    }

    pub fn gossip_timeout(&self) -> Duration {
        self.gossip_timeout
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Knobs shared by both builder shapes.
#[derive(Debug, Clone, Default)]
struct CommonOptions {
    max_discover_attempts: Option<i32>,
    discover_attempt_interval: Option<Duration>,
    gossip_timeout: Option<Duration>,
}

struct ResolvedCommon {
    max_discover_attempts: Option<u32>,
    discover_attempt_interval: Duration,
    gossip_timeout: Duration,
}

impl CommonOptions {
    fn resolve(&self) -> Result<ResolvedCommon, ConfigError> {
        let attempts = self
            .max_discover_attempts
            .unwrap_or(DEFAULT_MAX_DISCOVER_ATTEMPTS);
        let max_discover_attempts = match attempts {
            UNLIMITED_DISCOVER_ATTEMPTS => None,
            n if n >= 0 => Some(n as u32),
            n => return Err(ConfigError::MaxDiscoverAttemptsOutOfRange(n)),
        };

        Ok(ResolvedCommon {
            max_discover_attempts,
            discover_attempt_interval: self
                .discover_attempt_interval
                .unwrap_or(DEFAULT_DISCOVER_ATTEMPT_INTERVAL),
            gossip_timeout: self.gossip_timeout.unwrap_or(DEFAULT_GOSSIP_TIMEOUT),
        })
    }
}

/// Builder for settings backed by an explicit gossip seed list.
#[derive(Debug, Clone, Default)]
pub struct GossipSeedSettingsBuilder {
    gossip_seeds: Vec<GossipSeed>,
    common: CommonOptions,
}

impl GossipSeedSettingsBuilder {
    pub fn gossip_seeds(mut self, seeds: Vec<GossipSeed>) -> Self {
        self.gossip_seeds = seeds;
        self
    }

    /// Set the seed list from plain endpoints (no host header).
    pub fn gossip_seed_endpoints(
        mut self,
        endpoints: impl IntoIterator<Item = SocketAddr>,
    ) -> Self {
        self.gossip_seeds = endpoints.into_iter().map(GossipSeed::new).collect();
        self
    }

    /// Rounds per `discover` call; `-1` retries forever.
    pub fn max_discover_attempts(mut self, attempts: i32) -> Self {
        self.common.max_discover_attempts = Some(attempts);
        self
    }

    pub fn discover_attempt_interval(mut self, interval: Duration) -> Self {
        self.common.discover_attempt_interval = Some(interval);
        self
    }

    pub fn gossip_timeout(mut self, timeout: Duration) -> Self {
        self.common.gossip_timeout = Some(timeout);
        self
    }

    /// Validate and produce the settings. The builder is left untouched.
    pub fn build(&self) -> Result<DiscoverySettings, ConfigError> {
        if self.gossip_seeds.is_empty() {
            return Err(ConfigError::EmptyGossipSeeds);
        }
        let common = self.common.resolve()?;

        Ok(DiscoverySettings {
            seed_source: SeedSource::GossipSeeds(self.gossip_seeds.clone()),
            max_discover_attempts: common.max_discover_attempts,
            discover_attempt_interval: common.discover_attempt_interval,
            external_gossip_port: 0,
            gossip_timeout: common.gossip_timeout,
        })
    }
}

/// Builder for settings backed by a cluster DNS name.
#[derive(Debug, Clone, Default)]
pub struct DnsSettingsBuilder {
    cluster_dns: String,
    external_gossip_port: Option<u16>,
    common: CommonOptions,
}

impl DnsSettingsBuilder {
    pub fn cluster_dns(mut self, name: impl Into<String>) -> Self {
        self.cluster_dns = name.into();
        self
    }

    pub fn external_gossip_port(mut self, port: u16) -> Self {
        self.external_gossip_port = Some(port);
        self
    }

    /// Rounds per `discover` call; `-1` retries forever.
    pub fn max_discover_attempts(mut self, attempts: i32) -> Self {
        self.common.max_discover_attempts = Some(attempts);
        self
    }

    pub fn discover_attempt_interval(mut self, interval: Duration) -> Self {
        self.common.discover_attempt_interval = Some(interval);
        self
    }

    pub fn gossip_timeout(mut self, timeout: Duration) -> Self {
        self.common.gossip_timeout = Some(timeout);
        self
    }

    /// Validate and produce the settings. The builder is left untouched.
    pub fn build(&self) -> Result<DiscoverySettings, ConfigError> {
        if self.cluster_dns.trim().is_empty() {
            return Err(ConfigError::EmptyClusterDns);
        }
        let external_gossip_port = match self.external_gossip_port {
            None => DEFAULT_EXTERNAL_GOSSIP_PORT,
            Some(0) => return Err(ConfigError::NonPositivePort),
            Some(port) => port,
        };
        let common = self.common.resolve()?;

        Ok(DiscoverySettings {
            seed_source: SeedSource::Dns(self.cluster_dns.clone()),
            max_discover_attempts: common.max_discover_attempts,
            discover_attempt_interval: common.discover_attempt_interval,
            external_gossip_port,
            gossip_timeout: common.gossip_timeout,
        })
    }
}

// ============================================================================
// DiscoveryConfig — deserializable form
// ============================================================================

/// Discovery configuration as loaded from a config file or environment.
///
/// The consumer deserializes this however they want (TOML, JSON, env); beacon
/// does no file I/O. Call [`build`](DiscoveryConfig::build) to validate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// DNS name to resolve for gossip endpoints.
    pub cluster_dns: Option<String>,
    /// Explicit gossip endpoints (e.g., `["10.0.0.1:2113", "10.0.0.2:2113"]`).
    pub gossip_seeds: Vec<SocketAddr>,
    /// Port paired with DNS-resolved addresses. Rejected alongside
    /// `gossip_seeds`, whose endpoints carry their own ports.
    pub external_gossip_port: Option<u16>,
    /// Rounds per discovery call, `-1` for unlimited.
    pub max_discover_attempts: Option<i32>,
    /// Delay between failed rounds (ms).
    pub discover_attempt_interval_ms: Option<u64>,
    /// Per-seed gossip timeout (ms).
    pub gossip_timeout_ms: Option<u64>,
}

impl DiscoveryConfig {
    /// Validate through the builder matching the configured seed source.
    pub fn build(&self) -> Result<DiscoverySettings, ConfigError> {
        let common = CommonOptions {
            max_discover_attempts: self.max_discover_attempts,
            discover_attempt_interval: self
                .discover_attempt_interval_ms
                .map(Duration::from_millis),
            gossip_timeout: self.gossip_timeout_ms.map(Duration::from_millis),
        };

        match self.cluster_dns {
            Some(_) if !self.gossip_seeds.is_empty() => Err(ConfigError::AmbiguousSeedSource),
            Some(ref dns) => DnsSettingsBuilder {
                cluster_dns: dns.clone(),
                external_gossip_port: self.external_gossip_port,
                common,
            }
            .build(),
            None if self.external_gossip_port.is_some() => {
                Err(ConfigError::PortWithoutClusterDns)
            }
            None => GossipSeedSettingsBuilder {
                gossip_seeds: self.gossip_seeds.iter().copied().map(GossipSeed::new).collect(),
                common,
            }
            .build(),
        }
    }
}
