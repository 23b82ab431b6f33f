//! Listing search filter: criteria, query-string codec, the location cascade
//! and the HTTP surface over them.

pub mod cascade;
pub mod filter;
pub(crate) mod picker;
pub mod query;
pub mod router;

pub use cascade::{reduce, CascadeState, FilterEvent, LocationFilter, SearchCallback, SubmitOutcome};
pub use filter::{FilterState, PropertyType, PROPERTY_TYPE_OPTIONS, ROOM_OPTIONS};
pub use picker::visible_options;
pub use query::QueryString;
pub use router::{search_router, FilterEventsRequest, FilterView, SearchContext};
