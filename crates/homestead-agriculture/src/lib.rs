//! # Homestead Agriculture
//!
//! The farm domain for Homestead.
//!
//! This crate turns farm zones into concrete content:
//! - Biome classification and the terrain analyzer for pre-built maps
//! - The crop catalogue
//! - Village site selection and shared facilities
//! - Farm layouts (buildings, fields, infrastructure, paths)
//! - Farmer generation (roles, routes, schedules, dialogue)
//!
//! All content is laid out in the zone frame of its [`FarmZone`] and is a
//! pure function of the zone and the generator passed in.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod biome;
pub mod crops;
pub mod farm;
pub mod farmer;
pub mod village;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::biome::*;
    pub use crate::crops::*;
    pub use crate::farm::*;
    pub use crate::farmer::*;
    pub use crate::village::*;
}

pub use prelude::*;
