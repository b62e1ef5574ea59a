// ZoneLoader - lib.rs
//
// Library entry point, exposing the controller and its building blocks for
// integration testing and embedding.
//
// The console front end lives in `main.rs` and is not part of the library
// surface.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
