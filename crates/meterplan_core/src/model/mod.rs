//! Core data model: scenario inputs and results.

mod adoption;
mod households;
mod leaks;
mod meter;
mod persistence;
mod perspective;
mod results;

pub use adoption::*;
pub use households::*;
pub use leaks::*;
pub use meter::*;
pub use persistence::*;
pub use perspective::*;
pub use results::*;
