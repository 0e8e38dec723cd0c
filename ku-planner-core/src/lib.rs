//! KU Planner Core Library
//!
//! Course catalog loading, the weekly schedule store, grid layout and the
//! planner session reducer shared by the server and the CLI.

pub mod cache;
pub mod catalog;
pub mod controller;
pub mod error;
pub mod export;
pub mod grid;
pub mod store;
pub mod time;
pub mod types;

// Re-export core types and error handling
pub use error::{Error, Result};
pub use types::*;

/// Commonly used items
pub mod prelude {
    pub use crate::{
        catalog::*, controller::*, export::*, grid::*, store::*, time::*, types::*,
    };
}
