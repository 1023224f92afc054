pub mod cache_sync;
pub mod cardinality;
pub mod fetch;
pub mod link;
pub mod record_filter;
pub mod relation_card;
pub mod search_picker;
pub mod selection;

pub use cache_sync::*;
pub use cardinality::*;
pub use fetch::*;
pub use link::*;
pub use record_filter::*;
pub use relation_card::*;
pub use search_picker::*;
pub use selection::*;
