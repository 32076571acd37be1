//! DNS-SD resolver backed by [`hickory_resolver`].

use super::{DnsSdResolver, LookupError};
use crate::{name, SrvRecord};
use async_trait::async_trait;
use hickory_resolver::{
    name_server::ConnectionProvider,
    proto::{
        rr::{domain::Label, rdata::SRV, RData, RecordType},
        ProtoError,
    },
    Name, ResolveError, Resolver, TokioResolver,
};
use std::time::Duration;

/// Builds a tokio resolver from the system's DNS configuration, optionally
/// overriding its per-query timeout.
pub fn system_resolver(timeout: Option<Duration>) -> Result<TokioResolver, ResolveError> {
    let mut builder = Resolver::builder_tokio()?;
    if let Some(timeout) = timeout {
        builder.options_mut().timeout = timeout;
    }
    Ok(builder.build())
}

/// Converts a presentation-form name label by label, so escaped dots and
/// backslashes stay inside their label.
fn to_name(fqdn: &str) -> Result<Name, ResolveError> {
    let labels = name::unescaped_labels(fqdn)
        .ok_or_else(|| ProtoError::from(format!("malformed name: {fqdn:?}")))?
        .iter()
        .map(|octets| Label::from_raw_bytes(octets))
        .collect::<Result<Vec<_>, _>>()?;
    let mut converted = Name::from_labels(labels)?;
    converted.set_fqdn(true);
    Ok(converted)
}

fn to_presentation(fqdn: &Name) -> String {
    fqdn.iter()
        .map(name::escape_label)
        .collect::<Vec<_>>()
        .join(".")
}

impl LookupError for ResolveError {
    fn is_not_found(&self) -> bool {
        self.is_no_records_found()
    }
}

#[async_trait]
impl<P> DnsSdResolver for Resolver<P>
where
    P: ConnectionProvider,
{
    type Record = SRV;
    type Error = ResolveError;

    async fn resolve_ptr(&self, name: &str) -> Result<Vec<String>, Self::Error> {
        let lookup = self.lookup(to_name(name)?, RecordType::PTR).await?;
        Ok(lookup
            .iter()
            .filter_map(|rdata| match rdata {
                RData::PTR(ptr) => Some(to_presentation(&ptr.0)),
                _ => None,
            })
            .collect())
    }

    async fn resolve_srv(&self, name: &str) -> Result<Vec<Self::Record>, Self::Error> {
        let lookup = self.srv_lookup(to_name(name)?).await?;
        Ok(lookup.into_iter().collect())
    }

    async fn resolve_txt(&self, name: &str) -> Result<Vec<Vec<String>>, Self::Error> {
        let lookup = self.txt_lookup(to_name(name)?).await?;
        Ok(lookup
            .iter()
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .map(|data| String::from_utf8_lossy(data).into_owned())
                    .collect()
            })
            .collect())
    }
}

impl SrvRecord for SRV {
    type Target = Name;

    fn target(&self) -> &Self::Target {
        self.target()
    }

    fn port(&self) -> u16 {
        self.port()
    }

    fn priority(&self) -> u16 {
        self.priority()
    }

    fn weight(&self) -> u16 {
        self.weight()
    }
}
