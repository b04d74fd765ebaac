//! Leadership Signalling
//!
//! This crate polls an external leader-election service, compares the
//! reported leader with this host's identity and publishes the resulting
//! `"true"`/`"false"` flag into a shared bucket under the host's own key.

pub mod config;
pub mod error;
pub mod health;
pub mod identity;
pub mod publisher;
pub mod resolver;
pub mod signaller;
pub mod types;

pub use config::SignallerConfig;
pub use error::{ConfigurationError, PublishError, ResolutionError, Result, SignallerError};
pub use health::{liveness_router, serve_liveness};
pub use identity::{HostIdentitySource, StaticHostIdentity, SystemHostname};
pub use publisher::StatusPublisher;
pub use resolver::{FixedLeaderResolver, HttpLeaderResolver, LeaderResolver};
pub use signaller::{CycleOutcome, Signaller};
pub use types::{HostIdentity, LeaderIdentity, LeadershipFlag};
