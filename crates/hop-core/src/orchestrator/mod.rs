mod guard;
mod manager;
mod types;

pub use guard::{InFlightGuard, InFlightTicket};
pub use manager::Orchestrator;
pub use types::{Stage, StageReport, SwitchOutcome, SwitchReport};
