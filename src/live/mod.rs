pub mod hub;
pub mod protocol;
pub mod session;
pub mod snapshot;

pub use hub::{ChangeNotice, LiveHub, Scope};
pub use protocol::Collection;
