// ZoneLoader - app/mod.rs
//
// Application layer: derivation dispatch, loading and error state, and the
// controller that composes them.
// Dependencies: core layer.
// Must NOT depend on: platform specifics.

pub mod controller;
pub mod errors;
pub mod loading;
pub mod memory_source;
pub mod refresh;
pub mod switcher;
