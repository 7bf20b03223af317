use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by [`crate::engine::Engine`]. Rejected navigations are not
/// errors; see [`crate::events::NavigationResult`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine was disposed; calling into it again is a programming error.
    #[error("carousel engine used after dispose")]
    Disposed,

    /// A configuration update was refused and the previous configuration kept.
    #[error("configuration rejected: {0}")]
    InvalidConfig(#[from] ConfigError),
}
