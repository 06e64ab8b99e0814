//! Engine error type wrapping the backend crates.

use rr_core::LinkId;
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Core error: {0}")]
    Core(#[from] rr_core::RrError),

    #[error("Network error: {0}")]
    Network(#[from] rr_network::NetworkError),

    #[error("Forcing error: {0}")]
    Forcing(#[from] rr_forcing::ForcingError),

    #[error("State error: {0}")]
    State(#[from] rr_state::StateError),

    #[error("Configuration error: {0}")]
    Config(#[from] rr_config::ConfigError),

    #[error("Kernel failure in sub-network {outlet}: {message}")]
    Kernel { outlet: LinkId, message: String },

    #[error("Failed to build dispatch thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
