//! DNS-SD TXT record strings.
//!
//! Follows [RFC 6763 §6.4 and §6.5](https://tools.ietf.org/html/rfc6763#section-6.4),
//! not [RFC 1464](https://tools.ietf.org/html/rfc1464): there is no backquote
//! quoting of `=`, keys are not trimmed, and a string without `=` is a boolean
//! attribute rather than being ignored.

use crate::instance::{is_attribute_name, AttributeValue, Details};

/// Adds the attribute encoded by one TXT character-string to `attrs`.
///
/// The key is everything up to the first `=` and is stored lower-cased. The
/// value is everything after it, verbatim, and may be empty or contain more
/// `=`. A string without `=` is a boolean attribute. If `attrs` already holds
/// the key, the string is ignored: the first occurrence wins. Strings that
/// are empty, start with `=`, or whose key contains characters outside
/// printable US-ASCII are ignored as well.
///
/// Meant to be folded over the strings of a TXT record, in order:
///
/// ```ignore
/// let details = strings.iter().fold(Details::new(), |d, s| apply_txt_string(d, s));
/// ```
pub fn apply_txt_string(mut attrs: Details, raw: &str) -> Details {
    let (key, value) = match raw.split_once('=') {
        Some((key, value)) => (key, AttributeValue::Value(value.to_owned())),
        None => (raw, AttributeValue::Present),
    };
    if is_attribute_name(key) {
        attrs.entry(key.to_ascii_lowercase()).or_insert(value);
    }
    attrs
}
