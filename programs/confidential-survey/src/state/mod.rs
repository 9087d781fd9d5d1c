pub mod constraint;
pub mod entry;
pub mod query;
pub mod survey;

pub use constraint::*;
pub use entry::*;
pub use query::*;
pub use survey::*;
