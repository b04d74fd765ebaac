//! The polling and publishing loop
//!
//! Every cycle resolves the current leader, compares it with this host's
//! identity and publishes the result, then sleeps for a fixed interval.
//! Failure handling is asymmetric: losing the election service or the host
//! identity ends the loop (the supervisor is expected to restart the process),
//! while a failed publish is logged and retried on the next cycle.

use crate::config::SignallerConfig;
use crate::error::{Result, SignallerError};
use crate::identity::{HostIdentitySource, StaticHostIdentity, SystemHostname};
use crate::publisher::StatusPublisher;
use crate::resolver::{FixedLeaderResolver, HttpLeaderResolver, LeaderResolver};
use crate::types::{HostIdentity, LeaderIdentity, LeadershipFlag};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What a single cycle decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    pub leader: LeaderIdentity,
    pub host: HostIdentity,
    pub flag: LeadershipFlag,
    pub published: bool,
}

pub struct Signaller {
    resolver: Arc<dyn LeaderResolver>,
    identity: Arc<dyn HostIdentitySource>,
    publisher: StatusPublisher,
    poll_interval: Duration,
}

impl Signaller {
    pub fn new(
        resolver: Arc<dyn LeaderResolver>,
        identity: Arc<dyn HostIdentitySource>,
        publisher: StatusPublisher,
        poll_interval: Duration,
    ) -> Self {
        Self {
            resolver,
            identity,
            publisher,
            poll_interval,
        }
    }

    /// Build every collaborator from a validated configuration
    pub fn from_config(config: &SignallerConfig) -> Result<Self> {
        config.validate()?;

        let resolver: Arc<dyn LeaderResolver> = match &config.fake_response {
            Some(leader) => {
                warn!("Using fixed leader {:?} instead of the election service", leader);
                Arc::new(FixedLeaderResolver::new(leader.clone()))
            }
            None => Arc::new(HttpLeaderResolver::new(
                &config.elector_url,
                config.resolve_timeout,
            )?),
        };

        let identity: Arc<dyn HostIdentitySource> = match &config.host_identity {
            Some(name) => {
                let host = HostIdentity::new(name.clone())
                    .ok_or_else(|| SignallerError::host_identity("host identity cannot be empty"))?;
                Arc::new(StaticHostIdentity::new(host))
            }
            None => Arc::new(SystemHostname),
        };

        let store = signal_store::create_object_store(
            &config.storage,
            &config.bucket_name,
            config.publish_timeout,
        )
        .map_err(crate::error::ConfigurationError::from)?;
        info!(
            "Publishing to {} bucket {:?}",
            config.storage.backend_name(),
            store.bucket()
        );

        let publisher = StatusPublisher::new(store, config.publish_timeout);

        Ok(Self::new(resolver, identity, publisher, config.poll_interval))
    }

    /// Run one resolve, compare, publish pass.
    ///
    /// Returns an error only for the fatal cases; a failed publish is logged
    /// and reported through `CycleOutcome::published`.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let leader = self.resolver.resolve_leader().await?;
        let host = self.identity.host_identity()?;
        let flag = LeadershipFlag::compare(&host, &leader);

        info!(
            leader = %leader,
            host = %host,
            is_leader = flag.is_leader(),
            "Resolved leadership"
        );

        let published = match self.publisher.publish(flag, &host).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to publish leadership status: {}", e);
                false
            }
        };

        Ok(CycleOutcome {
            leader,
            host,
            flag,
            published,
        })
    }

    /// Cycle until resolution or host identity fails.
    ///
    /// The sleep is a fixed delay after each cycle, so the real spacing
    /// between cycles is the interval plus the time the cycle took.
    pub async fn run(&self) -> Result<()> {
        info!(
            "Starting leadership signaller, polling every {:?}",
            self.poll_interval
        );

        loop {
            let outcome = self.run_cycle().await?;
            debug!(
                "Cycle complete (published: {}), sleeping {:?}",
                outcome.published, self.poll_interval
            );
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolutionError;
    use async_trait::async_trait;
    use signal_store::{MemoryStore, ObjectStore, ObjectWriter, StoreError};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays scripted answers, then fails once the script runs out
    struct ScriptedResolver {
        answers: Mutex<VecDeque<&'static str>>,
        calls: AtomicUsize,
    }

    impl ScriptedResolver {
        fn new(answers: &[&'static str]) -> Self {
            Self {
                answers: Mutex::new(answers.iter().copied().collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LeaderResolver for ScriptedResolver {
        async fn resolve_leader(&self) -> std::result::Result<LeaderIdentity, ResolutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.answers.lock().unwrap().pop_front() {
                Some(name) => Ok(LeaderIdentity::new(name)),
                None => Err(ResolutionError::Status { status: 503 }),
            }
        }
    }

    /// Store that counts attempts and rejects every write
    #[derive(Default)]
    struct UnreachableStore {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl ObjectStore for UnreachableStore {
        async fn open_writer(&self, _key: &str) -> signal_store::Result<Box<dyn ObjectWriter>> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::client("connection refused"))
        }

        async fn read(&self, _key: &str) -> signal_store::Result<Option<Vec<u8>>> {
            Err(StoreError::read("connection refused"))
        }

        fn bucket(&self) -> &str {
            "unreachable"
        }
    }

    struct FailingIdentity;

    impl HostIdentitySource for FailingIdentity {
        fn host_identity(&self) -> Result<HostIdentity> {
            Err(SignallerError::host_identity("no hostname"))
        }
    }

    fn host_a() -> Arc<dyn HostIdentitySource> {
        Arc::new(StaticHostIdentity::new(HostIdentity::new("host-a").unwrap()))
    }

    fn signaller_with(
        resolver: Arc<dyn LeaderResolver>,
        identity: Arc<dyn HostIdentitySource>,
        store: Arc<dyn ObjectStore>,
    ) -> Signaller {
        Signaller::new(
            resolver,
            identity,
            StatusPublisher::new(store, Duration::from_secs(5)),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_cycle_publishes_true_for_leader() {
        let store = Arc::new(MemoryStore::new("leaders"));
        let signaller = signaller_with(
            Arc::new(ScriptedResolver::new(&["host-a"])),
            host_a(),
            store.clone(),
        );

        let outcome = signaller.run_cycle().await.unwrap();
        assert!(outcome.flag.is_leader());
        assert!(outcome.published);
        assert_eq!(store.read("host-a").await.unwrap(), Some(b"true".to_vec()));
    }

    #[tokio::test]
    async fn test_cycle_publishes_false_for_follower() {
        let store = Arc::new(MemoryStore::new("leaders"));
        let signaller = signaller_with(
            Arc::new(ScriptedResolver::new(&["host-b"])),
            host_a(),
            store.clone(),
        );

        let outcome = signaller.run_cycle().await.unwrap();
        assert!(!outcome.flag.is_leader());
        assert_eq!(outcome.leader.as_str(), "host-b");
        assert_eq!(store.read("host-a").await.unwrap(), Some(b"false".to_vec()));
        assert_eq!(store.read("host-b").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolution_failure_stops_loop_without_publishing() {
        let store = Arc::new(MemoryStore::new("leaders"));
        let resolver = Arc::new(ScriptedResolver::new(&[]));
        let signaller = signaller_with(resolver.clone(), host_a(), store.clone());

        let err = signaller.run().await.unwrap_err();
        assert!(matches!(err, SignallerError::Resolution(_)));
        assert_eq!(resolver.calls(), 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_failure_does_not_stop_loop() {
        let store = Arc::new(UnreachableStore::default());
        let resolver = Arc::new(ScriptedResolver::new(&["host-a", "host-a", "host-b"]));
        let signaller = signaller_with(resolver.clone(), host_a(), store.clone());

        let err = signaller.run().await.unwrap_err();

        // Three good cycles each tried to publish, the fourth lost the resolver
        assert!(matches!(err, SignallerError::Resolution(_)));
        assert_eq!(resolver.calls(), 4);
        assert_eq!(store.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_leadership_change_is_published_next_cycle() {
        let store = Arc::new(MemoryStore::new("leaders"));
        let resolver = Arc::new(ScriptedResolver::new(&["host-b", "host-a"]));
        let signaller = signaller_with(resolver.clone(), host_a(), store.clone());

        let first = signaller.run_cycle().await.unwrap();
        assert!(!first.flag.is_leader());
        assert_eq!(store.read("host-a").await.unwrap(), Some(b"false".to_vec()));

        let second = signaller.run_cycle().await.unwrap();
        assert!(second.flag.is_leader());
        assert_eq!(store.read("host-a").await.unwrap(), Some(b"true".to_vec()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_sleeps_between_cycles() {
        let store = Arc::new(MemoryStore::new("leaders"));
        let resolver = Arc::new(ScriptedResolver::new(&["host-a", "host-a"]));
        let signaller = signaller_with(resolver.clone(), host_a(), store);

        let start = tokio::time::Instant::now();
        let _ = signaller.run().await;

        // Two sleeps separate the three resolver calls
        assert_eq!(resolver.calls(), 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(10), "slept only {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(11), "slept {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_host_identity_failure_is_fatal() {
        let store = Arc::new(MemoryStore::new("leaders"));
        let signaller = signaller_with(
            Arc::new(ScriptedResolver::new(&["host-a"])),
            Arc::new(FailingIdentity),
            store.clone(),
        );

        let err = signaller.run().await.unwrap_err();
        assert!(matches!(err, SignallerError::HostIdentity(_)));
        assert!(store.is_empty().await);
    }

    #[test]
    fn test_from_config_rejects_missing_url() {
        let config = SignallerConfig {
            storage: signal_store::StorageBackendConfig::Memory,
            ..Default::default()
        };
        assert!(matches!(
            Signaller::from_config(&config),
            Err(SignallerError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_from_config_with_fake_response() {
        let config = SignallerConfig {
            elector_url: "http://localhost:4040/".to_string(),
            fake_response: Some("host-a".to_string()),
            host_identity: Some("host-a".to_string()),
            storage: signal_store::StorageBackendConfig::Memory,
            ..Default::default()
        };

        let signaller = Signaller::from_config(&config).unwrap();
        let outcome = signaller.run_cycle().await.unwrap();
        assert!(outcome.flag.is_leader());
        assert!(outcome.published);
    }
}
