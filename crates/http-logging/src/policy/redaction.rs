//! Header and query-parameter redaction

use std::borrow::Cow;
use std::collections::HashSet;

use http::HeaderMap;
use serde_json::{Map, Value};
use url::{form_urlencoded, Url};

use crate::foundation::REDACTED_PLACEHOLDER;

/// Case-insensitive allow-list. Values of names outside it are replaced
/// with `REDACTED`; the names themselves stay visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedactionSet {
    allowed: HashSet<String>,
}

impl RedactionSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: names
                .into_iter()
                .map(|name| name.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.allowed.contains(&name.to_lowercase())
    }

    pub fn redact<'a>(&self, name: &str, value: &'a str) -> Cow<'a, str> {
        if self.is_allowed(name) {
            Cow::Borrowed(value)
        } else {
            Cow::Borrowed(REDACTED_PLACEHOLDER)
        }
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

/// One field per header name; repeated values are joined with `,`
pub fn redact_headers(headers: &HeaderMap, allowed: &RedactionSet) -> Map<String, Value> {
    let mut fields = Map::new();
    for name in headers.keys() {
        let value = if allowed.is_allowed(name.as_str()) {
            headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()))
                .collect::<Vec<_>>()
                .join(",")
        } else {
            REDACTED_PLACEHOLDER.to_string()
        };
        fields.insert(name.as_str().to_string(), Value::String(value));
    }
    fields
}

/// URL for logging: path untouched, query values outside the allow-list
/// replaced, fragment dropped
pub fn redact_url(url: &Url, allowed: &RedactionSet) -> String {
    let mut redacted = url.clone();
    redacted.set_fragment(None);

    if let Some(query) = url.query() {
        let pairs: Vec<String> = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => {
                    let value = if allowed.is_allowed(&decode_key(key)) {
                        value
                    } else {
                        REDACTED_PLACEHOLDER
                    };
                    format!("{}={}", key, value)
                }
                None => pair.to_string(),
            })
            .collect();

        if pairs.is_empty() {
            redacted.set_query(None);
        } else {
            redacted.set_query(Some(&pairs.join("&")));
        }
    }

    redacted.to_string()
}

fn decode_key(raw: &str) -> String {
    form_urlencoded::parse(raw.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
        .unwrap_or_else(|| raw.to_string())
}
