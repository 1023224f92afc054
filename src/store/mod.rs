pub mod memory;
pub mod record_cache;
pub mod traits;

pub use memory::*;
pub use record_cache::*;
pub use traits::*;
