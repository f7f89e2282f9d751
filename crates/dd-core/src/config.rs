//! Build configuration.

/// How new style-variable ids are generated.
///
/// Every strategy keeps the `<prefix>_<6 chars>` shape and uniqueness within
/// one table. Only the dedup decision is guaranteed to be stable across runs;
/// the literal ids are stable only for `Seeded` and `ContentHash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// Random alphanumeric suffix from an OS-seeded generator.
    #[default]
    Random,
    /// Random alphanumeric suffix from a generator seeded with this value.
    Seeded(u64),
    /// Suffix derived from a hash of the canonical style value.
    ContentHash,
}

/// Configuration for `build`.
///
/// The defaults give the standard digest: random ids, vectors typed as images.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    /// Style-variable id generation. Default: **Random**.
    pub ids: IdStrategy,

    /// Rewrite `VECTOR` nodes to `IMAGE-SVG` after simplification.
    /// Default: **true**.
    pub rewrite_vectors: bool,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            ids: IdStrategy::Random,
            rewrite_vectors: true,
        }
    }
}

impl DigestConfig {
    /// Config with reproducible ids, handy for snapshots and diffs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            ids: IdStrategy::Seeded(seed),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DigestConfig::default();
        assert_eq!(config.ids, IdStrategy::Random);
        assert!(config.rewrite_vectors);
    }

    #[test]
    fn seeded_keeps_other_defaults() {
        let config = DigestConfig::seeded(17);
        assert_eq!(config.ids, IdStrategy::Seeded(17));
        assert!(config.rewrite_vectors);
    }
}
