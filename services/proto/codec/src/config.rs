//! Codec limits.

use serde::{Deserialize, Serialize};

/// Default bound on nested message depth
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Default bound on decoded input size (64 MiB)
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Limits applied by [`Encoder`](crate::Encoder) and [`Decoder`](crate::Decoder)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Deepest allowed nesting; the top-level message is depth 0
    pub max_depth: usize,
    /// Largest input accepted by decode, in bytes
    pub max_message_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.max_depth, 100);
        assert_eq!(config.max_message_size, 64 * 1024 * 1024);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: CodecConfig = serde_yaml::from_str("max_depth: 8\n").unwrap();
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
    }
}
