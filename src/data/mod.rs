pub mod coordinator;
pub mod extract;
pub mod fetch;
pub mod series;

pub use coordinator::{Applied, Completion, Coordinator, FetchMode};
pub use fetch::Fetcher;
pub use series::{Quote, TimeSeries};
