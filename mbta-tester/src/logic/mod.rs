pub mod reports;
pub mod runner;
pub mod seeds;
pub mod tester;

pub use runner::TripRunner;
pub use seeds::resolve_seed_inputs;
pub use tester::*;
