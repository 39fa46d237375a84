//! Request and response types for the REST API
//!
//! Entity records from `snipspace-core` are returned as-is; this module only
//! holds request bodies, query strings and list/aggregate wrappers.

mod common;
mod snippet;
mod space;
mod text_content;

pub use common::*;
pub use snippet::*;
pub use space::*;
pub use text_content::*;
