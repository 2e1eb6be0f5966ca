//! # Verdant Sim
//!
//! The garden simulation engine.
//!
//! This crate provides:
//! - Plant model, insect catalog and the garden grid
//! - Fixed rule tables (decay, drought, watering, recovery, overwatering)
//! - Pest control and the statistics report
//! - The single-writer engine, its intent mailbox and timer scheduler
//! - The `Simulation` handle and event/alert sinks

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod clock;
pub mod config;
pub mod engine;
pub mod events;
pub mod garden;
pub mod insects;
pub mod intent;
pub mod pest_control;
pub mod plant;
pub mod rules;
pub mod scheduler;
pub mod simulation;
pub mod stats;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::clock::*;
    pub use crate::config::*;
    pub use crate::engine::*;
    pub use crate::events::*;
    pub use crate::garden::*;
    pub use crate::insects::*;
    pub use crate::intent::*;
    pub use crate::pest_control::*;
    pub use crate::plant::*;
    pub use crate::scheduler::*;
    pub use crate::simulation::*;
    pub use crate::stats::*;
    pub use verdant_common::prelude::*;
}

pub use prelude::*;
