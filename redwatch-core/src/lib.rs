pub mod config;
pub mod error;
pub mod matcher;
pub mod types;

pub use config::*;
pub use error::*;
pub use matcher::*;
pub use types::*;
