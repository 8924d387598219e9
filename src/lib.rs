// Main library file for the holiday explorer

// Export one module per component
pub mod api;
pub mod dates;
pub mod model;
pub mod query;
pub mod view;

// Re-export key types for convenience
pub use api::{ApiConfig, ApiError, FetchOutcome, HolidayApi, OpenHolidaysClient};
pub use model::{Country, Holiday, LocalizedText};
pub use query::{QueryCache, QueryState, QueryStats, QueryStatus};
pub use view::{HolidayQueryCache, HolidaysView, QueryData, QueryKey, Screen};
