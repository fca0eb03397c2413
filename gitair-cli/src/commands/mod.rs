//! CLI command implementations

pub mod status;
pub mod watch;

pub use status::StatusArgs;
pub use watch::WatchArgs;
