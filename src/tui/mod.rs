pub mod app;
pub mod input;
pub mod pagination;
pub mod result_list;

pub use app::{App, FetchOutcome};
pub use input::InputWidget;
pub use result_list::ResultList;
