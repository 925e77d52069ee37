pub mod orchestrator;
pub mod pair_selection;

pub use orchestrator::{CycleError, CycleOutcome, CycleSettings, OrchestratorStatus, TradingOrchestrator};
pub use pair_selection::{PairSelectionError, PairSelector};
