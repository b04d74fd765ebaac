//! Identities and the leadership flag derived from them

use std::fmt;

/// Name this process uses for itself, also the key of its published record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostIdentity(String);

impl HostIdentity {
    /// Returns `None` for an empty name.
    pub fn new<T: Into<String>>(name: T) -> Option<Self> {
        let name = name.into();
        if name.is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Leader reported by the election service at the moment it was queried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderIdentity(String);

impl LeaderIdentity {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeaderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether this host is the current leader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadershipFlag(bool);

impl LeadershipFlag {
    /// Exact, case-sensitive comparison of the two names.
    pub fn compare(host: &HostIdentity, leader: &LeaderIdentity) -> Self {
        Self(host.as_str() == leader.as_str())
    }

    pub fn is_leader(self) -> bool {
        self.0
    }

    /// Literal value stored in the published record
    pub fn as_payload(self) -> &'static str {
        if self.0 {
            "true"
        } else {
            "false"
        }
    }
}

impl From<bool> for LeadershipFlag {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

impl fmt::Display for LeadershipFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_payload())
    }
}
