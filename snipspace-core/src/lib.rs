//! Snipspace Core - Entity Types
//!
//! Data structures shared by every other crate: typed identifiers, the
//! space/snippet/note/prompt records, error types, and the small pure
//! functions used to filter, sort and facet content lists.

pub mod entities;
pub mod enums;
pub mod error;
pub mod filter;
pub mod identity;
pub mod search;
pub mod validation;

pub use entities::*;
pub use enums::*;
pub use error::*;
pub use filter::*;
pub use identity::*;
pub use search::*;
pub use validation::*;

/// Name given to the space created for owners who have none.
pub const DEFAULT_SPACE_NAME: &str = "My Snippets";

/// Description of the default space.
pub const DEFAULT_SPACE_DESCRIPTION: &str = "Default space for your code snippets";

/// Icon of the default space.
pub const DEFAULT_SPACE_ICON: &str = "📝";
