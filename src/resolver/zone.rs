//! In-memory resolver.

use super::{DnsSdResolver, LookupError, RecordKind};
use crate::SrvTarget;
use async_trait::async_trait;
use std::{
    collections::{HashMap, HashSet},
    sync::{Mutex, PoisonError},
};

/// Errors produced by a [`StaticZone`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ZoneError {
    /// No records of any kind exist for the name (NXDOMAIN)
    #[error("{0}: no such name")]
    NoSuchName(String),
    /// The name exists but has no records of the requested kind (NODATA)
    #[error("{name}: no {kind} records")]
    NoRecords {
        /// Name that was looked up
        name: String,
        /// Kind of record that was requested
        kind: RecordKind,
    },
    /// Lookups of the name were configured to fail
    #[error("{0}: server failure")]
    ServerFailure(String),
}

impl LookupError for ZoneError {
    fn is_not_found(&self) -> bool {
        matches!(self, Self::NoSuchName(_) | Self::NoRecords { .. })
    }
}

/// A fixed set of PTR, SRV and TXT records.
///
/// Names are matched case-insensitively. Every lookup is recorded and can be
/// inspected with [`StaticZone::queries`].
#[derive(Debug, Default)]
pub struct StaticZone {
    ptr: HashMap<String, Vec<String>>,
    srv: HashMap<String, Vec<SrvTarget>>,
    txt: HashMap<String, Vec<Vec<String>>>,
    failing: HashSet<String>,
    queries: Mutex<Vec<(RecordKind, String)>>,
}

fn key(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl StaticZone {
    /// Creates an empty zone.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a PTR record from `service_type` to `instance`.
    pub fn with_ptr(mut self, service_type: &str, instance: impl Into<String>) -> Self {
        self.ptr
            .entry(key(service_type))
            .or_default()
            .push(instance.into());
        self
    }

    /// Adds a SRV record for `instance`.
    pub fn with_srv(mut self, instance: &str, record: SrvTarget) -> Self {
        self.srv.entry(key(instance)).or_default().push(record);
        self
    }

    /// Adds a TXT record for `instance`.
    pub fn with_txt<I>(mut self, instance: &str, strings: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.txt
            .entry(key(instance))
            .or_default()
            .push(strings.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a complete instance: its PTR, SRV and TXT records.
    pub fn with_instance<I>(
        self,
        service_type: &str,
        instance: &str,
        record: SrvTarget,
        strings: I,
    ) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.with_ptr(service_type, instance)
            .with_srv(instance, record)
            .with_txt(instance, strings)
    }

    /// Makes every lookup of `name` fail with [`ZoneError::ServerFailure`].
    pub fn with_failure(mut self, name: &str) -> Self {
        self.failing.insert(key(name));
        self
    }

    /// The lookups performed so far, in order.
    pub fn queries(&self) -> Vec<(RecordKind, String)> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lookup<T: Clone>(
        &self,
        kind: RecordKind,
        records: &HashMap<String, Vec<T>>,
        name: &str,
    ) -> Result<Vec<T>, ZoneError> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((kind, name.to_owned()));

        let key = key(name);
        if self.failing.contains(&key) {
            return Err(ZoneError::ServerFailure(name.to_owned()));
        }
        match records.get(&key) {
            Some(found) if !found.is_empty() => Ok(found.clone()),
            _ if self.knows(&key) => Err(ZoneError::NoRecords {
                name: name.to_owned(),
                kind,
            }),
            _ => Err(ZoneError::NoSuchName(name.to_owned())),
        }
    }

    fn knows(&self, key: &str) -> bool {
        self.ptr.contains_key(key) || self.srv.contains_key(key) || self.txt.contains_key(key)
    }
}

#[async_trait]
impl DnsSdResolver for StaticZone {
    type Record = SrvTarget;
    type Error = ZoneError;

    async fn resolve_ptr(&self, name: &str) -> Result<Vec<String>, Self::Error> {
        self.lookup(RecordKind::Ptr, &self.ptr, name)
    }

    async fn resolve_srv(&self, name: &str) -> Result<Vec<Self::Record>, Self::Error> {
        self.lookup(RecordKind::Srv, &self.srv, name)
    }

    async fn resolve_txt(&self, name: &str) -> Result<Vec<Vec<String>>, Self::Error> {
        self.lookup(RecordKind::Txt, &self.txt, name)
    }
}
