//! Concrete rule handlers.

mod counter;
mod fortune;
mod pick;
mod sql;

pub use counter::CounterHandler;
pub use fortune::{FortuneHandler, Rewrite};
pub use pick::{MAX_PICKS, PickHandler};
pub use sql::SqlHandler;
