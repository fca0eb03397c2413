//! git-air core - keeps a tree of git working copies converged with their remotes
//!
//! Repositories are discovered once under a root directory. A sequential loop
//! then commits and pushes local changes on a fixed interval and pulls remote
//! changes on a slower one, tolerating failure of any single step.

pub mod config;
pub mod error;
pub mod events;
pub mod git;
pub mod message;
pub mod repo;
pub mod scheduler;
pub mod sync;

pub use config::{CliOverrides, Config, MessageSettings, SyncSettings};
pub use error::{Error, Result};
pub use events::{EventSink, SyncEvent};
pub use git::{GitCli, GitClient, GitRepo, RemoteDescriptor, RemoteSet};
pub use message::{CommandMessageProvider, MessageProvider};
pub use repo::{classify, discover, Classification, RepositoryRecord};
pub use scheduler::{CycleContext, Scheduler};
