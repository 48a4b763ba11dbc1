/// Upper bounds applied while loading a configuration blob.
///
/// Tracker configurations are small documents; these limits only exist to
/// reject pathological input early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// Maximum number of JSON nodes (values and object keys) in one document.
    pub max_nodes: usize,
    /// Maximum byte length of a single numeric literal.
    pub max_literal_len: usize,
    /// Maximum container nesting depth.
    pub max_depth: usize,
}

pub const DEFAULT_MAX_NODES: usize = 4096;
pub const DEFAULT_MAX_LITERAL_LEN: usize = 127;
pub const DEFAULT_MAX_DEPTH: usize = 64;

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            max_literal_len: DEFAULT_MAX_LITERAL_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseLimits {
    /// Defaults, overridden by `LH_CONFIG_MAX_NODES`, `LH_CONFIG_MAX_LITERAL`
    /// and `LH_CONFIG_MAX_DEPTH` when set to a positive integer.
    pub fn from_env() -> Self {
        Self {
            max_nodes: read_env_usize("LH_CONFIG_MAX_NODES", DEFAULT_MAX_NODES),
            max_literal_len: read_env_usize("LH_CONFIG_MAX_LITERAL", DEFAULT_MAX_LITERAL_LEN),
            max_depth: read_env_usize("LH_CONFIG_MAX_DEPTH", DEFAULT_MAX_DEPTH),
        }
    }
}

fn read_env_usize(name: &str, default: usize) -> usize {
    parse_limit(std::env::var(name).ok().as_deref()).unwrap_or_else(|| {
        if std::env::var_os(name).is_some() {
            log::warn!("Ignoring invalid {}, using {}", name, default);
        }
        default
    })
}

fn parse_limit(value: Option<&str>) -> Option<usize> {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&v| v > 0)
}
