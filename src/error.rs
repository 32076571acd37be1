//! Errors encountered during discovery.

use std::time::Duration;

use crate::resolver::RecordKind;

/// A name or field failed validation before any lookup was attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidArgument {
    /// Not a DNS-SD service type
    #[error("not a valid service type: {0:?}")]
    ServiceType(String),
    /// Not a DNS-SD service instance name
    #[error("not a valid service instance name: {0:?}")]
    ServiceInstance(String),
    /// Not a fully qualified host name
    #[error("not a valid host name: {0:?}")]
    Host(String),
    /// Not a DNS-SD TXT attribute name
    #[error("not a valid attribute name: {0:?}")]
    AttributeName(String),
}

/// Why the SRV and TXT records of a service instance do not define it.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError<Lookup: std::error::Error + 'static> {
    /// The instance has no record of this kind
    #[error("no {kind} record")]
    NotFound {
        /// Kind of record that is missing
        kind: RecordKind,
    },
    /// The instance has more than one record of this kind
    #[error("more than 1 {kind} record ({count})")]
    RecordCount {
        /// Kind of record that is duplicated
        kind: RecordKind,
        /// Number of records found
        count: usize,
    },
    /// Looking up the records failed for another reason
    #[error("{kind} lookup error")]
    Lookup {
        /// Kind of record that was looked up
        kind: RecordKind,
        /// Error reported by the resolver
        #[source]
        source: Lookup,
    },
}

impl<Lookup: std::error::Error + 'static> DefinitionError<Lookup> {
    /// Kind of record the error is about.
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::NotFound { kind } | Self::RecordCount { kind, .. } | Self::Lookup { kind, .. } => {
                *kind
            }
        }
    }
}

/// Errors encountered by a [`Discoverer`](crate::Discoverer).
#[derive(Debug, thiserror::Error)]
pub enum Error<Lookup: std::error::Error + 'static> {
    /// A service type or instance name is malformed
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
    /// The DNS records of a service instance are incomplete or ambiguous
    #[error("service instance definition not valid: {instance}")]
    InvalidServiceDefinition {
        /// Name of the offending service instance
        instance: String,
        /// What is wrong with its records
        #[source]
        cause: DefinitionError<Lookup>,
    },
    /// PTR lookup errors
    #[error("PTR lookup error")]
    Lookup(#[source] Lookup),
    /// The operation did not complete in time
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}
