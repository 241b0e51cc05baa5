// Application layer: use-case services orchestrating the domain through its ports.

pub mod list_events;
pub mod place_bet;
pub mod record_outcome;
pub mod unit_of_work;
pub mod user_balance;

pub use list_events::{EventPage, ListEventsService};
pub use place_bet::{PlaceBetCommand, PlaceBetService};
pub use record_outcome::RecordOutcomeService;
pub use unit_of_work::UnitOfWork;
pub use user_balance::UserBalanceService;
