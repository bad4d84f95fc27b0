mod account;
mod category;
pub mod factory;
mod money;
mod observer;
mod operation;

pub use account::*;
pub use category::*;
pub use money::*;
pub use observer::*;
pub use operation::*;
