//! Query-string construction and parsing
//!
//! - [`append_query`] appends percent-encoded pairs to a URI while keeping
//!   any `#fragment` at the end
//! - [`parse_query`] / [`parse_nullable_query`] turn a raw query string back
//!   into a case-insensitive multimap

pub mod accumulator;
pub mod params;

pub use accumulator::{KeyValueAccumulator, QueryMap};
pub use params::{QueryParams, ToQueryParams};

/// Append a single `name=value` pair to `uri`
pub fn append_query_pair(uri: &str, name: &str, value: &str) -> String {
    append_query(uri, [(name, value)])
}

/// Append `pairs` to `uri` in order.
///
/// The first pair is joined with `?`, or with `&` when the part before the
/// fragment already carries a query. Keys and values are percent-encoded.
pub fn append_query<I, K, V>(uri: &str, pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let (base, fragment) = match uri.find('#') {
        Some(pos) => uri.split_at(pos),
        None => (uri, ""),
    };

    let mut has_query = base.contains('?');
    let mut out = String::with_capacity(uri.len() + 32);
    out.push_str(base);

    for (key, value) in pairs {
        out.push(if has_query { '&' } else { '?' });
        out.push_str(&urlencoding::encode(key.as_ref()));
        out.push('=');
        out.push_str(&urlencoding::encode(value.as_ref()));
        has_query = true;
    }

    out.push_str(fragment);
    out
}

/// Parse `query` into a multimap; absent or empty input yields an empty map
pub fn parse_query(query: &str) -> QueryMap {
    parse_nullable_query(query).unwrap_or_default()
}

/// Parse `query`, returning `None` when it holds no key/value pairs.
///
/// The position of the next `=` is tracked across the whole string rather
/// than per `&` segment: a segment only counts as `key=value` when that
/// tracked `=` falls inside it, otherwise it is stored verbatim as a key with
/// an empty value.
pub fn parse_nullable_query(query: &str) -> Option<QueryMap> {
    if query.is_empty() || query == "?" {
        return None;
    }

    let len = query.len();
    let mut acc = KeyValueAccumulator::new();
    let mut i = usize::from(query.starts_with('?'));
    let mut eq = query.find('=').unwrap_or(len);

    while i < len {
        let amp = find_from(query, '&', i).unwrap_or(len);

        if eq < amp {
            let key_span = query[i..eq].trim_start();
            let value_span = &query[eq + 1..amp];
            acc.append(decode_component(key_span), decode_component(value_span));
            eq = find_from(query, '=', amp).unwrap_or(len);
        } else if amp > i {
            acc.append(query[i..amp].to_string(), String::new());
        }

        i = amp + 1;
    }

    if !acc.has_values() {
        return None;
    }
    Some(acc.into_results())
}

fn find_from(haystack: &str, needle: char, from: usize) -> Option<usize> {
    haystack
        .get(from..)
        .and_then(|rest| rest.find(needle))
        .map(|pos| pos + from)
}

/// `+` becomes a space, then percent escapes are decoded. Malformed escapes
/// are kept as-is; escapes that do not form valid UTF-8 leave the component
/// undecoded.
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match String::from_utf8(urlencoding::decode_binary(spaced.as_bytes()).into_owned()) {
        Ok(decoded) => decoded,
        Err(_) => spaced,
    }
}
