// ZoneLoader - core/mod.rs
//
// Core layer: data model, observable cells, cancellation and the data
// source contract.
// Dependencies: standard library, serde, util layer.
// Must NOT depend on: app, platform, or any thread spawning.

pub mod cancel;
pub mod cell;
pub mod filter;
pub mod model;
pub mod source;
