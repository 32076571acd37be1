//! DNS-SD name grammar.
//!
//! A _service type_ is `_<service>._<proto>.<domain>`, optionally prefixed by
//! `<subtype>._sub.`, and a _service instance_ is `<instance>._<service>._<proto>.<domain>`
//! ([RFC 6763 §4.1 and §7](https://tools.ietf.org/html/rfc6763#section-4.1)).
//! Subtype and instance labels may contain any octet; dots and backslashes
//! inside them are escaped with a backslash.
//!
//! Everything in this module is pure. Predicates return `false` and
//! extractors return `None` on malformed input; they never panic.

use std::ops::Range;

/// Maximum length of a domain name, in octets of its presentation form.
pub const MAX_FQDN_LENGTH: usize = 253;

/// Maximum length of a single label, in octets of its presentation form.
pub const MAX_LABEL_LENGTH: usize = 63;

/// RFC 6335 §5.1
const MAX_SERVICE_NAME_LENGTH: usize = 15;

const SUBTYPE_MARKER: &str = "_sub";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Escapes {
    /// A backslash escapes whatever octet follows it.
    Any,
    /// A backslash may only escape `.` or `\`.
    DotOrBackslash,
}

/// A name split at its unescaped dots, with the position of the rightmost
/// `_tcp`/`_udp` label.
struct Labels<'a> {
    name: &'a str,
    spans: Vec<Range<usize>>,
    protocol: usize,
}

impl<'a> Labels<'a> {
    fn locate(name: &'a str) -> Option<Self> {
        let spans = label_spans(name, Escapes::Any)?;
        let protocol = spans
            .iter()
            .rposition(|span| matches!(&name[span.clone()], "_tcp" | "_udp"))?;
        Some(Self {
            name,
            spans,
            protocol,
        })
    }

    /// Like [`Labels::locate`], but rejects over-long names and labels before
    /// looking at any structure.
    fn checked(name: &'a str) -> Option<Self> {
        if name.is_empty() || name.len() > MAX_FQDN_LENGTH {
            return None;
        }
        let labels = Self::locate(name)?;
        if labels.spans.iter().any(|span| span.len() > MAX_LABEL_LENGTH) {
            return None;
        }
        Some(labels)
    }

    fn label(&self, index: usize) -> &'a str {
        &self.name[self.spans[index].clone()]
    }

    fn domain(&self) -> Option<&'a str> {
        self.spans
            .get(self.protocol + 1)
            .map(|span| &self.name[span.start..])
    }

    /// Whether the labels from `index` on form a base service type.
    fn is_base_service_type_from(&self, index: usize) -> bool {
        self.protocol == index + 1
            && is_service_name_label(self.label(index))
            && self.domain().is_some_and(is_fqdn)
    }
}

fn label_spans(name: &str, escapes: Escapes) -> Option<Vec<Range<usize>>> {
    let bytes = name.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                match bytes.get(i + 1) {
                    Some(b'.' | b'\\') => {}
                    Some(_) if escapes == Escapes::Any => {}
                    _ => return None,
                }
                i += 2;
            }
            b'.' => {
                spans.push(start..i);
                start = i + 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    spans.push(start..bytes.len());
    Some(spans)
}

/// `_<service-name>` per RFC 6335 §5.1, allowing non-ASCII letters.
fn is_service_name_label(label: &str) -> bool {
    let Some(service) = label.strip_prefix('_') else {
        return false;
    };
    let is_letter = |c: char| c.is_ascii_alphabetic() || (!c.is_ascii() && !c.is_control());
    let count = service.chars().count();
    (1..=MAX_SERVICE_NAME_LENGTH).contains(&count)
        && service.chars().next().is_some_and(is_letter)
        && service.chars().next_back().is_some_and(is_letter)
        && service.chars().all(|c| is_letter(c) || c.is_ascii_digit() || c == '-')
        && !service.contains("--")
}

/// Full-width ASCII variants, U+FF01 to U+FF5E.
fn is_full_width(c: char) -> bool {
    ('\u{ff01}'..='\u{ff5e}').contains(&c)
}

fn is_host_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LENGTH
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || c == '-'
                || (('\u{a1}'..='\u{ffff}').contains(&c) && !is_full_width(c))
        })
}

fn is_tld(tld: &str) -> bool {
    if let Some(rest) = tld.to_ascii_lowercase().strip_prefix("xn") {
        if rest.len() >= 2
            && rest
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return true;
        }
    }
    tld.chars().count() >= 2
        && tld.chars().all(|c| {
            !c.is_whitespace()
                && (c.is_ascii_alphabetic()
                    || matches!(c,
                        '\u{a1}'..='\u{a8}'
                        | '\u{aa}'..='\u{d7ff}'
                        | '\u{f900}'..='\u{fdcf}'
                        | '\u{fdf0}'..='\u{ffef}'))
        })
}

/// Whether `name` is a syntactically valid fully qualified host or domain name.
///
/// Labels consist of letters, digits, hyphens and non-ASCII characters and
/// neither start nor end with a hyphen. There must be at least two labels,
/// the last of which is a top-level domain of two or more letters (or an
/// `xn--` label). A single trailing root dot is accepted.
pub fn is_fqdn(name: &str) -> bool {
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty() || name.len() > MAX_FQDN_LENGTH {
        return false;
    }
    let labels: Vec<&str> = name.split('.').collect();
    labels.len() >= 2
        && labels.last().is_some_and(|tld| is_tld(tld))
        && labels.iter().all(|label| is_host_label(label))
}

/// Whether `label` is a valid subtype or instance label on its own: between 1
/// and 63 octets, with every `.` and `\` escaped, and no other escapes.
pub fn is_subtype_or_instance_name(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LENGTH
        && label_spans(label, Escapes::DotOrBackslash).is_some_and(|spans| spans.len() == 1)
}

/// Whether `name` is a service type without a subtype, e.g. `_http._tcp.example.com`.
pub fn is_base_service_type(name: &str) -> bool {
    Labels::checked(name).is_some_and(|labels| labels.is_base_service_type_from(0))
}

/// Whether `name` is a service type, e.g. `_http._tcp.example.com` or
/// `_printer._sub._http._tcp.example.com`.
pub fn is_service_type(name: &str) -> bool {
    let Some(labels) = Labels::checked(name) else {
        return false;
    };
    labels.is_base_service_type_from(0)
        || (labels.spans.len() > 3
            && labels.label(1) == SUBTYPE_MARKER
            && !labels.label(0).is_empty()
            && labels.is_base_service_type_from(2))
}

/// Whether `name` is a service instance name, e.g. `My Printer._http._tcp.example.com`.
pub fn is_service_instance(name: &str) -> bool {
    Labels::checked(name).is_some_and(|labels| {
        labels.spans.len() > 2 && !labels.label(0).is_empty() && labels.is_base_service_type_from(1)
    })
}

/// The domain of a service type or instance name, e.g. `example.com`.
pub fn extract_domain(name: &str) -> Option<&str> {
    Labels::locate(name)?.domain()
}

/// The protocol of a service type or instance name, `tcp` or `udp`.
pub fn extract_protocol(name: &str) -> Option<&str> {
    let labels = Labels::locate(name)?;
    labels.label(labels.protocol).strip_prefix('_')
}

/// The service of a service type or instance name, without its leading
/// underscore, e.g. `http`.
pub fn extract_type(name: &str) -> Option<&str> {
    let labels = Labels::locate(name)?;
    let index = labels.protocol.checked_sub(1)?;
    labels.label(index).strip_prefix('_')
}

/// The instance label of a service instance name, still escaped.
pub fn extract_instance(name: &str) -> Option<&str> {
    let labels = Labels::locate(name)?;
    (labels.protocol == 2).then(|| labels.label(0))
}

/// The subtype label of a service type, still escaped, or `None` if the
/// service type has no subtype.
///
/// A leading underscore is part of the subtype, RFC 6763 §7.1 does not
/// require one.
pub fn extract_subtype(name: &str) -> Option<&str> {
    let labels = Labels::locate(name)?;
    let marker = labels.protocol.checked_sub(2).filter(|&i| i > 0)?;
    (labels.label(marker) == SUBTYPE_MARKER).then(|| &name[..labels.spans[marker].start - 1])
}

/// Splits a name into its labels as raw octets, resolving `\.` and `\\`
/// escapes. A trailing root dot is ignored.
pub(crate) fn unescaped_labels(name: &str) -> Option<Vec<Vec<u8>>> {
    let mut spans = label_spans(name, Escapes::Any)?;
    if spans.len() > 1 && spans.last().is_some_and(|span| span.is_empty()) {
        spans.pop();
    }
    Some(
        spans
            .into_iter()
            .map(|span| {
                let mut octets = Vec::with_capacity(span.len());
                let mut bytes = name.as_bytes()[span].iter();
                while let Some(&b) = bytes.next() {
                    match (b, bytes.as_slice().first()) {
                        (b'\\', Some(&escaped)) => {
                            octets.push(escaped);
                            bytes.next();
                        }
                        _ => octets.push(b),
                    }
                }
                octets
            })
            .collect(),
    )
}

/// Presentation form of a single label: `.` and `\` escaped, other octets
/// decoded as (lossy) UTF-8.
pub(crate) fn escape_label(octets: &[u8]) -> String {
    let text = String::from_utf8_lossy(octets);
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '.' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAIN: &str = "dns-sd-lookup.toryt.org";
    const PROTOCOLS: [&str; 2] = ["tcp", "udp"];
    const SERVICE: &str = "a-Serv1ce-type";
    const SIMPLE_SUBTYPE: &str = "_a-sub-service";
    const SUBTYPES: [&str; 3] = [
        SIMPLE_SUBTYPE,
        r"_a\.complex\\sub\.service",
        "sub service type without an underscore",
    ];
    const INSTANCES: [&str; 4] = [
        "a-service-instance",
        "A Human Readable Sérvice Instance",
        r"instances\.with\.escaped\\dots\\and\.slashes",
        "instanceThatIsNotLongerThanIsAcceptableWhichIs63CharactersLabel",
    ];

    /// Names of exactly [`MAX_FQDN_LENGTH`] and one more octets, ending in `_tcp.<DOMAIN>`.
    fn max_length(before_protocol: &str) -> (String, String) {
        let protocol = "_tcp.";
        let places_left =
            MAX_FQDN_LENGTH - DOMAIN.len() - protocol.len() - before_protocol.len() - 1;
        let max_label = "abcdefghijklmnopqrstuvwxyz".repeat(2) + "abcdefghijk.";
        assert_eq!(max_label.len(), MAX_LABEL_LENGTH + 1);
        let rest = places_left % (MAX_LABEL_LENGTH + 1) - 1;
        let almost = format!(
            "{}.{}{}",
            &max_label[..rest],
            max_label.repeat(places_left / (MAX_LABEL_LENGTH + 1)),
            DOMAIN
        );
        let fits = format!("{before_protocol}.{protocol}{almost}");
        let too_long = format!("{before_protocol}.{protocol}z{almost}");
        assert_eq!(fits.len(), MAX_FQDN_LENGTH);
        assert_eq!(too_long.len(), MAX_FQDN_LENGTH + 1);
        (fits, too_long)
    }

    fn false_base_service_types() -> Vec<String> {
        let mut names: Vec<String> = [
            "",
            "# not _ a domain",
            "_thisIsSxteenLong",
            "_service spaces",
            "_service_undersc",
            "_service,comma",
            "_double--dash",
            "notStartWith_",
            "_-dash",
            "_dash-",
            "_9number",
            "_number9",
        ]
        .iter()
        .flat_map(|service| PROTOCOLS.map(|p| format!("{service}._{p}.{DOMAIN}")))
        .collect();
        names.extend([
            format!("notcporupd.{DOMAIN}"),
            format!("_{SERVICE}.notcporupd.{DOMAIN}"),
            format!("_udp.{DOMAIN}"),
            format!("_tcp.{DOMAIN}"),
            format!("_{SERVICE}._udp.a.thisIs999NotATld"),
            format!("_{SERVICE}._udp.a.domain_with.an.underscore.com"),
            format!("_{SERVICE}._tcp."),
            format!("_{SERVICE}._tcp.localhost"),
        ]);
        names
    }

    #[test]
    fn fqdns() {
        for name in [DOMAIN, "example.com.", "xn--bcher-kva.xn--p1ai", "ünïcode.example"] {
            assert!(is_fqdn(name), "{name}");
        }
        for name in [
            "",
            ".",
            "localhost",
            "under_score.example.com",
            "-dash.example.com",
            "dash-.example.com",
            "double..dot.com",
            "example.c0m",
            "example.c",
            "sp ace.example.com",
            "full\u{ff41}width.example.com",
        ] {
            assert!(!is_fqdn(name), "{name:?}");
        }
    }

    #[test]
    fn subtype_or_instance_names() {
        for label in SUBTYPES.iter().chain(INSTANCES.iter()) {
            assert!(is_subtype_or_instance_name(label), "{label}");
        }
        for label in [
            "",
            "anInstanceThatIsLongerThanIsAcceptableWhichIs63ACharactersLabels",
            "contains.an.unescaped.dot._service",
            r"contains\unescaped\backslash._service",
            r"gratuitous\escape",
            r"dangling\",
        ] {
            assert!(!is_subtype_or_instance_name(label), "{label}");
        }
    }

    #[test]
    fn base_service_types() {
        for p in PROTOCOLS {
            assert!(is_base_service_type(&format!("_{SERVICE}._{p}.{DOMAIN}")));
        }
        assert!(is_base_service_type("_t1i-no-sub._tcp.dns-sd-lookup.toryt.org"));
        assert!(is_base_service_type("_http._tcp.example.com."));

        let (fits, too_long) = max_length(&format!("_{SERVICE}"));
        assert!(is_base_service_type(&fits));
        assert!(!is_base_service_type(&too_long));

        for name in false_base_service_types() {
            assert!(!is_base_service_type(&name), "{name}");
        }
        assert!(!is_base_service_type(&format!(
            "{SIMPLE_SUBTYPE}._sub._{SERVICE}._tcp.{DOMAIN}"
        )));
    }

    #[test]
    fn service_types() {
        for p in PROTOCOLS {
            assert!(is_service_type(&format!("_{SERVICE}._{p}.{DOMAIN}")));
            for sub in SUBTYPES {
                let name = format!("{sub}._sub._{SERVICE}._{p}.{DOMAIN}");
                assert!(is_service_type(&name), "{name}");
            }
        }

        let (fits, too_long) = max_length(&format!("_{SERVICE}"));
        assert!(is_service_type(&fits));
        assert!(!is_service_type(&too_long));
        let (fits, too_long) = max_length(&format!("{SIMPLE_SUBTYPE}._sub._{SERVICE}"));
        assert!(is_service_type(&fits));
        assert!(!is_service_type(&too_long));

        for name in false_base_service_types() {
            assert!(!is_service_type(&name), "{name}");
        }
        for name in [
            format!("._sub._{SERVICE}._tcp.{DOMAIN}"),
            format!("un.escaped._sub._{SERVICE}._tcp.{DOMAIN}"),
            format!("{}._sub._{SERVICE}._tcp.{DOMAIN}", "x".repeat(64)),
            format!("{SIMPLE_SUBTYPE}._notsub._{SERVICE}._tcp.{DOMAIN}"),
            format!("{SIMPLE_SUBTYPE}._sub._{SERVICE}._tcp.a.thisIs999NotATld"),
            format!("an-instance._{SERVICE}._tcp.{DOMAIN}"),
        ] {
            assert!(!is_service_type(&name), "{name}");
        }
    }

    #[test]
    fn service_instances() {
        for p in PROTOCOLS {
            for instance in INSTANCES {
                let name = format!("{instance}._{SERVICE}._{p}.{DOMAIN}");
                assert!(is_service_instance(&name), "{name}");
            }
        }

        let (fits, too_long) = max_length(&format!("an-instance._{SERVICE}"));
        assert!(is_service_instance(&fits));
        assert!(!is_service_instance(&too_long));

        for name in false_base_service_types() {
            assert!(!is_service_instance(&format!("an-instance.{name}")), "{name}");
        }
        for name in [
            format!("_{SERVICE}._tcp.{DOMAIN}"),
            format!("un.escaped._{SERVICE}._tcp.{DOMAIN}"),
            format!(r"dangling\._{SERVICE}._tcp.{DOMAIN}"),
            format!("{}._{SERVICE}._tcp.{DOMAIN}", "x".repeat(64)),
            format!("{SIMPLE_SUBTYPE}._sub._{SERVICE}._tcp.{DOMAIN}"),
        ] {
            assert!(!is_service_instance(&name), "{name}");
        }
    }

    fn prefixes() -> Vec<(String, Option<&'static str>, Option<&'static str>)> {
        let mut prefixes = vec![(format!("_{SERVICE}"), None, None)];
        prefixes.extend(
            SUBTYPES.map(|sub| (format!("{sub}._sub._{SERVICE}"), Some(sub), None)),
        );
        prefixes.extend(INSTANCES.map(|i| (format!("{i}._{SERVICE}"), None, Some(i))));
        prefixes
    }

    #[test]
    fn extraction() {
        for p in PROTOCOLS {
            for (prefix, subtype, instance) in prefixes() {
                let name = format!("{prefix}._{p}.{DOMAIN}");
                assert_eq!(extract_domain(&name), Some(DOMAIN), "{name}");
                assert_eq!(extract_protocol(&name), Some(p), "{name}");
                assert_eq!(extract_type(&name), Some(SERVICE), "{name}");
                assert_eq!(extract_subtype(&name), subtype, "{name}");
                assert_eq!(extract_instance(&name), instance, "{name}");
            }
        }
    }

    #[test]
    fn extraction_uses_rightmost_protocol() {
        let name = "_tcp._http._udp.example.com";
        assert_eq!(extract_protocol(name), Some("udp"));
        assert_eq!(extract_type(name), Some("http"));
        assert_eq!(extract_instance(name), Some("_tcp"));
        assert_eq!(extract_domain(name), Some("example.com"));
    }

    #[test]
    fn extraction_of_garbage() {
        for name in ["", "example.com", "_tcp", "_http._tcp"] {
            assert_eq!(extract_domain(name), None, "{name}");
            assert_eq!(extract_subtype(name), None, "{name}");
            assert_eq!(extract_instance(name), None, "{name}");
        }
        assert_eq!(extract_type("_tcp.example.com"), None);
    }

    #[test]
    fn label_octets() {
        let labels = unescaped_labels(r"a\.b\\c._http._tcp.example.com.").unwrap();
        assert_eq!(labels.len(), 5);
        assert_eq!(labels[0], br"a.b\c");
        assert_eq!(labels[4], b"com");
        assert_eq!(escape_label(&labels[0]), r"a\.b\\c");
        assert_eq!(unescaped_labels(r"dangling\"), None);
    }
}
