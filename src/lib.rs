//! Lock-step predator/prey/plant ecosystem. Each species and each collision
//! pair runs as its own role on its own thread; a coordinator paces the ticks.

pub mod cli;
pub mod collision;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod display;
pub mod error;
pub mod lifecycle;
pub mod population;
pub mod protocol;
#[cfg(feature = "gui")]
pub mod renderer;
pub mod simulation;
pub mod species;
pub mod transport;
pub mod utils;

pub use config::{PopulationSizes, SimulationConfig};
pub use coordinator::{RunSummary, Termination};
pub use display::{Frame, HeadlessRenderer, RenderControl, Renderer};
pub use error::{SimError, TransportError};
pub use population::Species;
pub use simulation::{SimulationReport, WorkerReport, run_simulation};
