pub mod manager;
pub mod sizing;
pub mod state;

pub use manager::{RiskManager, RiskViolation, TradeAssessment};
pub use sizing::{derive_stop_loss, derive_take_profit, position_size};
pub use state::{recovery_due, HaltReason, RiskState};
