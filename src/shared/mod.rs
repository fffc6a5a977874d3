//! Read interface and run control for front-ends.
//!
//! Front-ends never touch a `World` directly: they read `WorldSnapshot`s and
//! drive the run with `SimCommand`s, usually through a `SimulationHandle`
//! running the world on its own thread.

pub mod commands;
pub mod sim_thread;
pub mod snapshot;

pub use commands::{SimCommand, SimSettings, SimState};
pub use sim_thread::SimulationHandle;
pub use snapshot::{AgentView, FoodView, WorldSnapshot};
