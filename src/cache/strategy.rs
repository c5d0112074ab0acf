use serde::{Deserialize, Serialize};

/// Policy selecting the victim entry when a full store needs room.
///
/// Expired entries are always preferred over live ones; the strategy only
/// decides among live entries. Ties fall back to insertion order, so victim
/// selection is deterministic within a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionStrategy {
    /// Evict the entry with the oldest last access.
    #[default]
    Lru,
    /// Evict the entry inserted first, regardless of access.
    Fifo,
    /// Evict the entry with the fewest recorded accesses.
    Lfu,
}

impl EvictionStrategy {
    /// Parses the configuration spelling (`lru`, `fifo`, `lfu`), case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lru" => Some(EvictionStrategy::Lru),
            "fifo" => Some(EvictionStrategy::Fifo),
            "lfu" => Some(EvictionStrategy::Lfu),
            _ => None,
        }
    }

    /// The configuration spelling of this strategy.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionStrategy::Lru => "lru",
            EvictionStrategy::Fifo => "fifo",
            EvictionStrategy::Lfu => "lfu",
        }
    }
}

impl std::fmt::Display for EvictionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
