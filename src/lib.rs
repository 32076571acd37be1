#![deny(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

/*!
Rust client for DNS-based Service Discovery.

# Introduction

DNS-SD, as defined in [RFC 6763](https://tools.ietf.org/html/rfc6763),
publishes the instances of a service type with three kinds of DNS records:

```text
_http._tcp.example.com.            60 IN PTR One._http._tcp.example.com.
_http._tcp.example.com.            60 IN PTR Two._http._tcp.example.com.
One._http._tcp.example.com.        60 IN SRV 1 30 443 one.example.com.
One._http._tcp.example.com.        60 IN TXT "path=/api" "tls"
Two._http._tcp.example.com.        60 IN SRV 1 70 443 two.example.com.
Two._http._tcp.example.com.        60 IN TXT "path=/api"
```

The PTR records list the instances of `_http._tcp.example.com`, and each
instance has exactly one SRV record (where to reach it) and exactly one TXT
record (attributes describing it). A client wanting to use this service
picks among the instances with the lowest SRV priority, proportionally to
their weights, per [RFC 2782](https://tools.ietf.org/html/rfc2782): here
`One` 30% and `Two` 70% of the time.

[`Discoverer::discover`] turns a service type into [`ServiceInstance`]s,
looking up every instance concurrently, and [`Discoverer::select_instance`]
picks the instance to use now. The [`name`] module validates and
decomposes service type and instance names.

# Resolvers

Records are looked up by a [`DnsSdResolver`], which can be swapped out by
implementing the trait. The provided resolver backends are:

- [`StaticZone`], an in-memory set of records
- `hickory` (via [`hickory_resolver::Resolver`]), enabled by the `hickory` feature

[`DnsSdResolver`]: resolver::DnsSdResolver
[`StaticZone`]: resolver::zone::StaticZone
*/

mod discover;
pub use discover::{not_one_of, Discoverer};

mod error;
pub use error::{DefinitionError, Error, InvalidArgument};

mod instance;
pub use instance::{AttributeValue, Details, ServiceInstance, ServiceInstanceParts};

pub mod name;

mod record;
pub use record::{SrvRecord, SrvTarget};

pub mod resolver;

mod select;
pub use select::{select, select_with_rng};

mod txt;
pub use txt::apply_txt_string;
