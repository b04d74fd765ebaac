//! Host identity resolution

use crate::error::{Result, SignallerError};
use crate::types::HostIdentity;

/// Source of the name this process publishes under
pub trait HostIdentitySource: Send + Sync {
    fn host_identity(&self) -> Result<HostIdentity>;
}

/// Kernel hostname of the machine or container
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHostname;

impl HostIdentitySource for SystemHostname {
    fn host_identity(&self) -> Result<HostIdentity> {
        let name = nix::unistd::gethostname()
            .map_err(|e| SignallerError::host_identity(format!("gethostname failed: {}", e)))?
            .into_string()
            .map_err(|raw| {
                SignallerError::host_identity(format!("hostname {:?} is not valid UTF-8", raw))
            })?;

        HostIdentity::new(name).ok_or_else(|| SignallerError::host_identity("hostname is empty"))
    }
}

/// Fixed identity supplied through configuration
#[derive(Debug, Clone)]
pub struct StaticHostIdentity(HostIdentity);

impl StaticHostIdentity {
    pub fn new(identity: HostIdentity) -> Self {
        Self(identity)
    }
}

impl HostIdentitySource for StaticHostIdentity {
    fn host_identity(&self) -> Result<HostIdentity> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_hostname_is_not_empty() {
        let identity = SystemHostname.host_identity().unwrap();
        assert!(!identity.as_str().is_empty());
    }

    #[test]
    fn test_static_identity() {
        let source = StaticHostIdentity::new(HostIdentity::new("host-a").unwrap());
        assert_eq!(source.host_identity().unwrap().as_str(), "host-a");
    }
}
