//! Admin list screens: paginated loading, long-press selection, bulk delete.

mod controller;
mod pager;
mod selection;

pub use controller::{BulkDeleteReport, ListController, Notice};
pub use pager::{PageTicket, Pager};
pub use selection::{Effect, Input, Mode, Selection, LONG_PRESS};
