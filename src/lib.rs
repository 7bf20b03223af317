pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod tasks {
    pub mod carousel;
    pub mod input;
}

pub use engine::Engine;
pub use error::EngineError;
