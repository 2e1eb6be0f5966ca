//! # Verdant Engine
//!
//! Headless front end for the Verdant garden simulator.
//!
//! This crate ties the simulation to the outside world:
//! - Config: TOML configuration with defaults and validation
//! - Journal: durable log of important events
//! - Console: text commands driving a running simulation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod console;
pub mod journal;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::console::*;
    pub use crate::journal::*;
}

pub use prelude::*;
