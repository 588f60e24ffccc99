//! Query Module
//!
//! Everything a lookup needs besides the filesystem itself.
//!
//! ## Responsibilities
//! - Decide exact lookup vs pattern match (`*`, `?`, empty key)
//! - Compile key patterns and filter key listings
//! - Structured get/post options
//! - Key augmentation on post (sequence prefix, GUID prefix)
//! - Result shapes returned to callers

mod options;
mod result;
pub mod keygen;
pub mod wildcard;

pub use options::{GetOptions, Mode, Order, PostOptions};
pub use result::{PostResult, QueryResult};
pub use wildcard::{is_wildcard, WildcardPattern};
