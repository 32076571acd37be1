//! Discovered service instances.

use std::{collections::BTreeMap, fmt};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{error::InvalidArgument, name, SrvRecord};

/// TXT attributes of a service instance, keyed by lower-cased attribute name.
pub type Details = BTreeMap<String, AttributeValue>;

/// Value of a DNS-SD TXT attribute.
///
/// Serializes as `true` for [`AttributeValue::Present`] and as a string
/// otherwise. There is no way to express an absent or `false` attribute;
/// such an attribute is simply not in [`Details`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeValue {
    /// The attribute is present without a value (`key`)
    Present,
    /// The attribute has a value, possibly empty (`key=value`)
    Value(String),
}

impl AttributeValue {
    /// The attribute's value, if it has one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Present => None,
            Self::Value(value) => Some(value),
        }
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Present => serializer.serialize_bool(true),
            Self::Value(value) => serializer.serialize_str(value),
        }
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl de::Visitor<'_> for Visitor {
            type Value = AttributeValue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("`true` or a string")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                if v {
                    Ok(AttributeValue::Present)
                } else {
                    Err(E::invalid_value(de::Unexpected::Bool(v), &self))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(AttributeValue::Value(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(AttributeValue::Value(v))
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

/// Whether `key` may name a DNS-SD TXT attribute: at least one printable
/// US-ASCII character, `=` excluded.
pub(crate) fn is_attribute_name(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| matches!(b, b' '..=b'<' | b'>'..=b'~'))
}

/// The fields of a [`ServiceInstance`], unvalidated.
///
/// This is also the JSON projection of a [`ServiceInstance`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstanceParts {
    /// Service type the instance was discovered under
    #[serde(rename = "type")]
    pub service_type: String,
    /// Full name of the instance
    pub instance: String,
    /// Host name of the server, from SRV
    pub host: String,
    /// Port, from SRV
    pub port: u16,
    /// Priority, from SRV
    pub priority: u16,
    /// Weight, from SRV
    pub weight: u16,
    /// Attributes, from TXT
    #[serde(default)]
    pub details: Details,
}

/// One discovered instance of a service type. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ServiceInstanceParts", into = "ServiceInstanceParts")]
pub struct ServiceInstance {
    service_type: String,
    instance: String,
    host: String,
    port: u16,
    priority: u16,
    weight: u16,
    details: Details,
}

impl ServiceInstance {
    /// Validates `parts` and creates a service instance from them.
    ///
    /// The service type and instance do not need to share a domain.
    pub fn new(parts: ServiceInstanceParts) -> Result<Self, InvalidArgument> {
        let ServiceInstanceParts {
            service_type,
            instance,
            host,
            port,
            priority,
            weight,
            details,
        } = parts;

        if !name::is_service_type(&service_type) {
            return Err(InvalidArgument::ServiceType(service_type));
        }
        if !name::is_service_instance(&instance) {
            return Err(InvalidArgument::ServiceInstance(instance));
        }
        if !name::is_fqdn(&host) {
            return Err(InvalidArgument::Host(host));
        }
        if let Some(key) = details.keys().find(|key| !is_attribute_name(key)) {
            return Err(InvalidArgument::AttributeName(key.clone()));
        }

        Ok(Self {
            service_type,
            instance,
            host,
            port,
            priority,
            weight,
            details,
        })
    }

    /// Full service type, e.g. `_http._tcp.example.com`.
    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    /// Full instance name, e.g. `Printer._http._tcp.example.com`.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Host name of the server.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port of the service on [`ServiceInstance::host`].
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Lower is more preferred.
    pub fn priority(&self) -> u16 {
        self.priority
    }

    /// Relative weight among instances of equal priority.
    pub fn weight(&self) -> u16 {
        self.weight
    }

    /// TXT attributes.
    pub fn details(&self) -> &Details {
        &self.details
    }

    /// Gives back the fields, e.g. to derive a new instance from this one.
    pub fn into_parts(self) -> ServiceInstanceParts {
        ServiceInstanceParts {
            service_type: self.service_type,
            instance: self.instance,
            host: self.host,
            port: self.port,
            priority: self.priority,
            weight: self.weight,
            details: self.details,
        }
    }

    /// The JSON projection of this instance.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "type": self.service_type,
            "instance": self.instance,
            "host": self.host,
            "port": self.port,
            "priority": self.priority,
            "weight": self.weight,
            "details": self.details,
        })
    }
}

impl TryFrom<ServiceInstanceParts> for ServiceInstance {
    type Error = InvalidArgument;

    fn try_from(parts: ServiceInstanceParts) -> Result<Self, Self::Error> {
        Self::new(parts)
    }
}

impl From<ServiceInstance> for ServiceInstanceParts {
    fn from(instance: ServiceInstance) -> Self {
        instance.into_parts()
    }
}

impl SrvRecord for ServiceInstance {
    type Target = str;

    fn target(&self) -> &Self::Target {
        &self.host
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

impl fmt::Display for ServiceInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.instance, self.host, self.port)
    }
}
