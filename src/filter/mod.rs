pub mod types;
pub mod filter;
pub mod filter_where;
pub mod error;

pub use types::*;
pub use filter::Filter;
pub use error::FilterError;
pub use filter_where::FilterWhere;
