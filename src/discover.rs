//! Discovery of service instances from PTR, SRV and TXT records.

use crate::{
    error::{DefinitionError, Error, InvalidArgument},
    instance::{Details, ServiceInstance, ServiceInstanceParts},
    name,
    resolver::{DnsSdResolver, LookupError, RecordKind},
    select,
    txt::apply_txt_string,
    SrvRecord,
};
use futures_util::{
    future,
    stream::{FuturesUnordered, TryStreamExt},
};
use std::{collections::HashSet, future::Future, time::Duration};

/// Builds a filter for [`Discoverer::discover_filtered`] that rejects the
/// given instance names, ignoring ASCII case.
pub fn not_one_of<I>(instances: I) -> impl Fn(&str) -> bool + Clone + Send + Sync
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let excluded: HashSet<String> = instances
        .into_iter()
        .map(|instance| instance.as_ref().to_ascii_lowercase())
        .collect();
    move |instance: &str| !excluded.contains(&instance.to_ascii_lowercase())
}

/// Client for discovering the instances of DNS-SD service types.
///
/// # Usage
///
/// After being created by [`Discoverer::new`] or [`Discoverer::new_with_resolver`],
/// [`discover`] returns every instance of a service type and
/// [`select_instance`] picks the one to use now by priority and weight.
///
/// ## DNS Resolvers
///
/// PTR, SRV and TXT records are looked up by a [`DnsSdResolver`], which can be
/// set with [`Discoverer::resolver`].
///
/// ## Cancellation
///
/// Dropping a returned future cancels every lookup it has in flight. A
/// deadline for each operation can be set with [`Discoverer::timeout`].
///
/// [`discover`]: Discoverer::discover()
/// [`select_instance`]: Discoverer::select_instance()
#[derive(Debug, Clone)]
pub struct Discoverer<Resolver> {
    resolver: Resolver,
    timeout: Option<Duration>,
}

impl<Resolver: Default> Discoverer<Resolver> {
    /// Creates a new client using the default resolver.
    pub fn new() -> Self {
        Self::new_with_resolver(Resolver::default())
    }
}

impl<Resolver: Default> Default for Discoverer<Resolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Resolver> Discoverer<Resolver> {
    /// Creates a new client looking up records with `resolver`.
    pub fn new_with_resolver(resolver: Resolver) -> Self {
        Self {
            resolver,
            timeout: None,
        }
    }

    /// Sets the resolver of the client.
    pub fn resolver<R>(self, resolver: R) -> Discoverer<R> {
        Discoverer {
            resolver,
            timeout: self.timeout,
        }
    }

    /// Sets how long each operation of the client may take in total.
    pub fn timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }
}

impl<Resolver: DnsSdResolver> Discoverer<Resolver> {
    /// Builds a [`ServiceInstance`] from the SRV and TXT records of
    /// `instance`, which must have exactly one of each.
    ///
    /// The service type of the result is the base service type the instance
    /// name ends in; a subtype cannot be recovered from the instance name.
    pub async fn lookup_instance(
        &self,
        instance: &str,
    ) -> Result<ServiceInstance, Error<Resolver::Error>> {
        self.with_deadline(self.resolve_instance(instance)).await
    }

    /// Gets every instance of `service_type`, in no particular order.
    ///
    /// A service type without PTR records has no instances. Fails with the
    /// first instance whose records are invalid.
    pub async fn discover(
        &self,
        service_type: &str,
    ) -> Result<Vec<ServiceInstance>, Error<Resolver::Error>> {
        self.discover_filtered(service_type, |_| true).await
    }

    /// Like [`Discoverer::discover`], skipping the instance names for which
    /// `filter` returns `false` before looking up their records.
    pub async fn discover_filtered<F>(
        &self,
        service_type: &str,
        filter: F,
    ) -> Result<Vec<ServiceInstance>, Error<Resolver::Error>>
    where
        F: Fn(&str) -> bool,
    {
        self.with_deadline(self.discover_instances(service_type, filter))
            .await
    }

    /// Discovers the instances of `service_type` and selects the one to use
    /// now, or `None` if there are none.
    pub async fn select_instance(
        &self,
        service_type: &str,
    ) -> Result<Option<ServiceInstance>, Error<Resolver::Error>> {
        self.select_instance_filtered(service_type, |_| true).await
    }

    /// Like [`Discoverer::select_instance`], only considering the instance
    /// names for which `filter` returns `true`.
    pub async fn select_instance_filtered<F>(
        &self,
        service_type: &str,
        filter: F,
    ) -> Result<Option<ServiceInstance>, Error<Resolver::Error>>
    where
        F: Fn(&str) -> bool,
    {
        let instances = self.discover_filtered(service_type, filter).await?;
        let selected = select(&instances).cloned();
        #[cfg(feature = "log")]
        if let Some(selected) = &selected {
            tracing::trace!(%selected, "Selected service instance");
        }
        Ok(selected)
    }

    async fn with_deadline<T>(
        &self,
        operation: impl Future<Output = Result<T, Error<Resolver::Error>>>,
    ) -> Result<T, Error<Resolver::Error>> {
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, operation)
                .await
                .map_err(|_| Error::Timeout(timeout))?,
            None => operation.await,
        }
    }

    async fn discover_instances<F>(
        &self,
        service_type: &str,
        filter: F,
    ) -> Result<Vec<ServiceInstance>, Error<Resolver::Error>>
    where
        F: Fn(&str) -> bool,
    {
        if !name::is_service_type(service_type) {
            return Err(InvalidArgument::ServiceType(service_type.to_owned()).into());
        }

        let names = match self.resolver.resolve_ptr(service_type).await {
            Ok(names) => names,
            Err(e) if e.is_not_found() => {
                #[cfg(feature = "log")]
                tracing::debug!(service_type, error = %e, "No instances of service type");
                return Ok(Vec::new());
            }
            Err(e) => return Err(Error::Lookup(e)),
        };

        let lookups = names
            .iter()
            .filter(|instance| {
                let keep = filter(instance.as_str());
                #[cfg(feature = "log")]
                if !keep {
                    tracing::trace!(instance = %instance, "Skipping filtered service instance");
                }
                keep
            })
            .map(|instance| self.resolve_discovered(service_type, instance))
            .collect::<FuturesUnordered<_>>();
        let instances: Vec<ServiceInstance> = lookups.try_collect().await?;

        #[cfg(feature = "log")]
        tracing::debug!(service_type, count = instances.len(), "Discovered service instances");
        Ok(instances)
    }

    /// Resolves an instance found under `service_type`, which becomes the
    /// service type of the result.
    async fn resolve_discovered(
        &self,
        service_type: &str,
        instance: &str,
    ) -> Result<ServiceInstance, Error<Resolver::Error>> {
        let resolved = self.resolve_instance(instance).await?;
        let parts = ServiceInstanceParts {
            service_type: service_type.to_owned(),
            ..resolved.into_parts()
        };
        Ok(ServiceInstance::new(parts)?)
    }

    async fn resolve_instance(
        &self,
        instance: &str,
    ) -> Result<ServiceInstance, Error<Resolver::Error>> {
        let service_type = base_service_type(instance)
            .ok_or_else(|| InvalidArgument::ServiceInstance(instance.to_owned()))?;

        let srv = async {
            exactly_one(RecordKind::Srv, self.resolver.resolve_srv(instance).await)
        };
        let txt = async {
            exactly_one(RecordKind::Txt, self.resolver.resolve_txt(instance).await)
        };
        let (srv, txt) = future::try_join(srv, txt).await.map_err(|cause| {
            #[cfg(feature = "log")]
            tracing::debug!(instance, error = %cause, "Invalid service instance definition");
            Error::InvalidServiceDefinition {
                instance: instance.to_owned(),
                cause,
            }
        })?;

        let details = txt
            .iter()
            .fold(Details::new(), |details, s| apply_txt_string(details, s));
        let target = srv.target().to_string();
        let host = target.strip_suffix('.').unwrap_or(&target).to_owned();

        Ok(ServiceInstance::new(ServiceInstanceParts {
            service_type,
            instance: instance.to_owned(),
            host,
            port: srv.port(),
            priority: srv.priority(),
            weight: srv.weight(),
            details,
        })?)
    }
}

/// `_<type>._<proto>.<domain>` of a valid instance name.
fn base_service_type(instance: &str) -> Option<String> {
    if !name::is_service_instance(instance) {
        return None;
    }
    Some(format!(
        "_{}._{}.{}",
        name::extract_type(instance)?,
        name::extract_protocol(instance)?,
        name::extract_domain(instance)?
    ))
}

fn exactly_one<T, E: LookupError>(
    kind: RecordKind,
    records: Result<Vec<T>, E>,
) -> Result<T, DefinitionError<E>> {
    match records {
        Ok(mut records) => match records.len() {
            count if count > 1 => Err(DefinitionError::RecordCount { kind, count }),
            _ => records.pop().ok_or(DefinitionError::NotFound { kind }),
        },
        Err(e) if e.is_not_found() => Err(DefinitionError::NotFound { kind }),
        Err(source) => Err(DefinitionError::Lookup { kind, source }),
    }
}
