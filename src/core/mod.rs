pub mod event_bus;
pub mod executor;
pub mod history;
pub mod navigation;
pub mod trigger;

pub use event_bus::{create_event_channel, EventEmitter, EventReceiver, EventSender, ProcessorEvent};
pub use executor::{CommandDispatcher, CommandState, MarkerOutcome, RunSummary};
pub use history::{HistoryState, HistoryStore, PageSnapshot, SessionHistory, UrlChange};
pub use navigation::{FakeNavigator, NavigationController, Navigator};
pub use trigger::TriggerDispatcher;
