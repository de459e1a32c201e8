//! Slab terrain generation library
//!
//! Procedurally generates tabletop-map terrain and decorative scatter, and
//! converts placement documents to and from the client's compressed binary
//! slab exchange format.

pub mod assets;
pub mod catalog;
pub mod codec;
pub mod custom;
pub mod export;
pub mod generator;
pub mod heightfield;
pub mod noisemap;
pub mod quad;
pub mod scatter;
pub mod seeds;
pub mod settings;
pub mod slab;
pub mod terrain;
