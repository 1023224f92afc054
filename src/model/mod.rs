pub mod candidate;
pub mod common;
pub mod filter;
pub mod record;
pub mod schema;

pub use candidate::*;
pub use common::*;
pub use filter::*;
pub use record::*;
pub use schema::*;
