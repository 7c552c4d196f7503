//! Explicitly declared query parameters

use std::fmt::Display;

/// Ordered list of query parameters.
///
/// Keys may repeat; every pair is emitted in insertion order when appended
/// to a URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single `key=value` pair
    pub fn push(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// Add one pair per value, all under `key`
    pub fn push_all<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let key = key.into();
        for value in values {
            self.pairs.push((key.clone(), value.into()));
        }
        self
    }

    /// Add a pair only when `value` is present and renders non-empty
    pub fn push_opt<V: Display>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value.map(|v| v.to_string()) {
            Some(rendered) if !rendered.is_empty() => self.push(key, rendered),
            _ => self,
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Types that declare how they project onto query parameters.
///
/// Implemented by hand for endpoint parameter structs:
///
/// ```
/// use smarthttp_core::query::{QueryParams, ToQueryParams};
///
/// struct ListUsers {
///     page: u32,
///     search: Option<String>,
/// }
///
/// impl ToQueryParams for ListUsers {
///     fn to_query_params(&self) -> QueryParams {
///         QueryParams::new()
///             .push("page", self.page.to_string())
///             .push_opt("search", self.search.as_deref())
///     }
/// }
///
/// let params = ListUsers { page: 2, search: None }.to_query_params();
/// assert_eq!(params.len(), 1);
/// ```
pub trait ToQueryParams {
    fn to_query_params(&self) -> QueryParams;
}

impl ToQueryParams for QueryParams {
    fn to_query_params(&self) -> QueryParams {
        self.clone()
    }
}

impl<K, V> ToQueryParams for [(K, V)]
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn to_query_params(&self) -> QueryParams {
        self.iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect()
    }
}

impl<K, V, const N: usize> ToQueryParams for [(K, V); N]
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn to_query_params(&self) -> QueryParams {
        self.as_slice().to_query_params()
    }
}

impl<K, V> ToQueryParams for Vec<(K, V)>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn to_query_params(&self) -> QueryParams {
        self.as_slice().to_query_params()
    }
}
