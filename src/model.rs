mod config;
mod entities;

pub use self::config::{CONFIG_VERSION, RemoteConfig, RosterConfig};
pub use self::entities::{Group, GroupSummary, Member, Snapshot};
