//! Query Builder
//!
//! Accumulates filter predicates and a field projection for a single request.

/// Reserved query key selecting the field projection
pub const FIELDS_KEY: &str = "fields";

/// Filters and field projection for one REST request
///
/// Filters keep insertion order. `set` replaces a key in place, `add` appends
/// another value to a repeatable filter. Key names are not validated here;
/// the API rejects what it does not understand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filters: Vec<(String, Vec<String>)>,
    fields: Vec<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a filter, replacing any existing value for that key
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.filters.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => *values = vec![value],
            None => self.filters.push((key.to_string(), vec![value])),
        }
        self
    }

    /// Append a value to a multi-valued filter
    pub fn add(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.filters.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value),
            None => self.filters.push((key.to_string(), vec![value])),
        }
        self
    }

    /// Replace the field projection
    pub fn fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Values currently held for a filter key
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.filters
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    pub fn projection(&self) -> &[String] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.fields.is_empty()
    }

    /// Flatten into wire pairs: filters in order, repeated keys for
    /// multi-valued filters, then `fields` if a projection is set
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .filters
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |v| (key.clone(), v.clone())))
            .collect();

        if !self.fields.is_empty() {
            pairs.push((FIELDS_KEY.to_string(), self.fields.join(",")));
        }

        pairs
    }

    /// Render as a percent-encoded query string (without the leading `?`)
    pub fn to_query_string(&self) -> String {
        self.to_pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Append this query to a URL
    pub fn append_to(&self, url: &str) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            url.to_string()
        } else if url.contains('?') {
            format!("{}&{}", url, query)
        } else {
            format!("{}?{}", url, query)
        }
    }
}
