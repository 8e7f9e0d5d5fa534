//! Navigation tree construction from `menu` permissions.
//!
//! - `node.rs`: the owned [`MenuNode`] tree and its wire shape
//! - `builder.rs`: flat rows → tree (arena keyed by permission id)
//! - `sort.rs`: stable sibling ordering at every level

pub mod builder;
pub mod node;
pub mod sort;

pub use builder::{MAX_MENU_DEPTH, MenuTreeBuilder, TreeReport};
pub use node::{MenuNode, MENU_ROOT_KEY, MENU_ROOT_LABEL};
pub use sort::{SortDirection, TreeSorter};
