// Application layer: the ledger facade and the concerns wired around it.

pub mod command;
pub mod error;
pub mod logging;
pub mod service;

pub use command::*;
pub use error::*;
pub use logging::*;
pub use service::*;
