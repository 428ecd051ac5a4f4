//! Human-readable views of a parsed translation unit
//!
//! - [`tree`]: indented dump of every node, `|- NODE` per node and
//!   `` `- value`` per leaf value
//! - [`explain`]: declarations rendered as English, in the style of
//!   `declare a as array 3 of pointer to int`

pub mod explain;
pub mod tree;

pub use explain::{explain_declaration, explain_function, explain_type, explain_unit};
pub use tree::{print_expr, print_node, print_unit};
