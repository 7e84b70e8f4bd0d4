// Camera domain: session boundary, parameter metadata, and simulation.

pub mod error;
pub mod session;
pub mod sim;
pub mod types;
