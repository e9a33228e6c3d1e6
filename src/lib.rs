pub mod cli;
pub mod logging;
pub mod report;
pub mod runner;
pub mod sched;

pub use cli::Request;
pub use sched::{KernelScheduler, Policy, Scheduler};
