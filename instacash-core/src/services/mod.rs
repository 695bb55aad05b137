//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and the ledger store. All of them share
//! one `Ledger`, so every mutation goes through the same critical section.

mod doctor;
mod history;
pub mod ledger;
pub mod logging;
mod movement;
mod registry;
mod session;
mod status;

pub use doctor::{CheckResult, CheckStatus, DoctorResult, DoctorService, DoctorSummary};
pub use history::{HistoryFilter, HistoryService};
pub use ledger::{Ledger, Mutation};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use movement::{MovementService, Receipt};
pub use registry::RegistryService;
pub use session::{Screen, Session, SessionState};
pub use status::{KindTotals, StatusService, StoreStatus, WalletOverview};
