use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use signal_core::SignallerConfig;
use signal_store::StorageBackendConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SLED_PATH: &str = "/var/lib/leader-signal";

#[derive(Parser, Debug)]
#[command(
    name = "leader-signal",
    version,
    about = "Publishes whether this host is the elected leader into a shared bucket"
)]
pub struct Cli {
    /// Config file path (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Election service query URL
    #[arg(long, env = "ELECTOR_GET_URL")]
    pub elector_url: Option<String>,

    /// Bucket the status records are written into
    #[arg(long, env = "BUCKET_NAME")]
    pub bucket_name: Option<String>,

    /// ip:port where liveness requests are served
    #[arg(long)]
    pub bind_address: Option<SocketAddr>,

    /// Report this leader instead of querying the election service (dev mode)
    #[arg(long, env = "FAKE_RESPONSE")]
    pub fake_response: Option<String>,

    /// Publish under this identity instead of the hostname
    #[arg(long)]
    pub host_identity: Option<String>,

    /// Storage backend
    #[arg(long, value_enum)]
    pub storage: Option<StorageKind>,

    /// Database directory for the sled backend
    #[arg(long, value_name = "DIR")]
    pub sled_path: Option<PathBuf>,

    /// Seconds to sleep between cycles
    #[arg(long)]
    pub poll_interval_secs: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    Gcs,
    Sled,
    Memory,
}

impl Cli {
    /// Start from the config file (or defaults) and apply flag overrides
    pub fn load_config(&self) -> Result<SignallerConfig> {
        let mut config = match &self.config {
            Some(path) => SignallerConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SignallerConfig::default(),
        };

        if let Some(url) = &self.elector_url {
            config.elector_url = url.clone();
        }
        if let Some(bucket) = &self.bucket_name {
            config.bucket_name = bucket.clone();
        }
        if let Some(addr) = self.bind_address {
            config.bind_address = addr;
        }
        if let Some(leader) = &self.fake_response {
            config.fake_response = Some(leader.clone());
        }
        if let Some(host) = &self.host_identity {
            config.host_identity = Some(host.clone());
        }
        if let Some(secs) = self.poll_interval_secs {
            config.poll_interval = Duration::from_secs(secs);
        }

        match self.storage {
            Some(StorageKind::Gcs) if config.storage.backend_name() != "gcs" => {
                config.storage = StorageBackendConfig::default();
            }
            Some(StorageKind::Sled) if config.storage.backend_name() != "sled" => {
                config.storage = StorageBackendConfig::Sled {
                    path: PathBuf::from(DEFAULT_SLED_PATH),
                };
            }
            Some(StorageKind::Memory) => config.storage = StorageBackendConfig::Memory,
            _ => {}
        }

        if let Some(path) = &self.sled_path {
            match &mut config.storage {
                StorageBackendConfig::Sled { path: current } => *current = path.clone(),
                other => bail!(
                    "--sled-path only applies to the sled storage backend, not {}",
                    other.backend_name()
                ),
            }
        }

        config.validate()?;
        Ok(config)
    }
}
