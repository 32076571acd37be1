//! SRV records.

use std::fmt::Display;

/// Representation of types that contain the fields of a SRV record.
///
/// Implemented by the records resolvers return and by
/// [`ServiceInstance`](crate::ServiceInstance), so that both can be fed to
/// [`select`](crate::select()).
pub trait SrvRecord {
    /// Type representing the SRV record's target. Must implement `Display` so
    /// it can be turned into a host name.
    type Target: Display + ?Sized;

    /// Gets a SRV record's target.
    fn target(&self) -> &Self::Target;

    /// Gets a SRV record's port.
    fn port(&self) -> u16;

    /// Gets a SRV record's priority.
    fn priority(&self) -> u16;

    /// Gets a SRV record's weight.
    fn weight(&self) -> u16;
}

/// A SRV record held in memory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SrvTarget {
    /// Lower is more preferred
    pub priority: u16,
    /// Relative weight among records of equal priority
    pub weight: u16,
    /// Port the service listens on
    pub port: u16,
    /// Host name of the server
    pub target: String,
}

impl SrvTarget {
    /// Creates a record pointing at `target:port`.
    pub fn new(priority: u16, weight: u16, port: u16, target: impl Into<String>) -> Self {
        Self {
            priority,
            weight,
            port,
            target: target.into(),
        }
    }
}

impl SrvRecord for SrvTarget {
    type Target = str;

    fn target(&self) -> &Self::Target {
        &self.target
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn priority(&self) -> u16 {
        self.priority
    }

    fn weight(&self) -> u16 {
        self.weight
    }
}
