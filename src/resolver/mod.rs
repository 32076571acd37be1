//! DNS-SD resolvers.
//!
//! Discovery only consumes decoded record sets. Where they come from is up
//! to a [`DnsSdResolver`]; this crate provides one backed by the system's DNS
//! configuration (feature `hickory`) and an in-memory one ([`zone::StaticZone`]).

use crate::SrvRecord;
use async_trait::async_trait;
use std::{fmt, sync::Arc};

#[cfg(feature = "hickory")]
pub mod hickory;

pub mod zone;

/// Kinds of records DNS-SD is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Service type to instance names
    Ptr,
    /// Instance name to host, port, priority and weight
    Srv,
    /// Instance name to attributes
    Txt,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ptr => "PTR",
            Self::Srv => "SRV",
            Self::Txt => "TXT",
        })
    }
}

/// Errors produced by a [`DnsSdResolver`].
pub trait LookupError: std::error::Error + Send + Sync + 'static {
    /// Whether the error means the name does not exist or has no records of
    /// the requested type (NXDOMAIN or NODATA).
    fn is_not_found(&self) -> bool;
}

/// Looks up the records DNS-SD discovery is built from.
///
/// Names passed in and returned are in presentation form, with `.` and `\`
/// inside labels escaped by a backslash and no trailing root dot. An empty
/// record set is treated like an error for which
/// [`LookupError::is_not_found`] holds.
#[async_trait]
pub trait DnsSdResolver: Send + Sync {
    /// Type of SRV record returned by the resolver.
    type Record: SrvRecord + Send;

    /// Errors encountered during lookup.
    type Error: LookupError;

    /// Gets the instance names a service type points to.
    async fn resolve_ptr(&self, name: &str) -> Result<Vec<String>, Self::Error>;

    /// Gets the SRV records of a service instance.
    async fn resolve_srv(&self, name: &str) -> Result<Vec<Self::Record>, Self::Error>;

    /// Gets the TXT records of a service instance, each as its list of
    /// character-strings.
    async fn resolve_txt(&self, name: &str) -> Result<Vec<Vec<String>>, Self::Error>;
}

#[async_trait]
impl<R: DnsSdResolver + ?Sized> DnsSdResolver for Arc<R> {
    type Record = R::Record;
    type Error = R::Error;

    async fn resolve_ptr(&self, name: &str) -> Result<Vec<String>, Self::Error> {
        (**self).resolve_ptr(name).await
    }

    async fn resolve_srv(&self, name: &str) -> Result<Vec<Self::Record>, Self::Error> {
        (**self).resolve_srv(name).await
    }

    async fn resolve_txt(&self, name: &str) -> Result<Vec<Vec<String>>, Self::Error> {
        (**self).resolve_txt(name).await
    }
}
