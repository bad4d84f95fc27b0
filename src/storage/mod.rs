mod store;
mod traversal;

pub use store::*;
pub use traversal::*;
