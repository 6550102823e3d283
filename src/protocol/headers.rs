//! Case-insensitive, order-preserving header multimap.
//!
//! ICAP headers may repeat; values within one name keep their wire order,
//! order between distinct names is not significant. Keys are stored
//! lowercased so lookups are case-insensitive by construction.

use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    inner: IndexMap<String, Vec<Vec<u8>>>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: &str, value: Vec<u8>) {
        self.inner
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value);
    }

    pub fn set(&mut self, name: &str, value: Vec<u8>) {
        self.inner.insert(name.to_ascii_lowercase(), vec![value]);
    }

    /// All values bound to `name`, in wire order; empty if absent.
    pub fn get_all(&self, name: &str) -> &[Vec<u8>] {
        self.inner
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The first value bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.get_all(name).first().map(Vec::as_slice)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| std::str::from_utf8(v).ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(&name.to_ascii_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.inner
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_slice())))
    }

    /// Whether the `Connection` header's sole value equals `close`,
    /// case-insensitively, after trimming whitespace.
    pub fn requests_connection_close(&self) -> bool {
        match self.get("connection") {
            Some(v) => std::str::from_utf8(v)
                .map(|s| s.trim().eq_ignore_ascii_case("close"))
                .unwrap_or(false),
            None => false,
        }
    }

    /// Whether `Allow` lists `204` among its comma-separated tokens.
    pub fn allows_204(&self) -> bool {
        match self.get_str("allow") {
            Some(v) => v.split(',').any(|tok| tok.trim() == "204"),
            None => false,
        }
    }

    pub fn has_preview(&self) -> bool {
        self.contains("preview")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut h = HeaderMap::new();
        h.append("Allow", b"204".to_vec());
        assert_eq!(h.get("allow"), Some(&b"204"[..]));
    }

    #[test]
    fn connection_close_is_case_insensitive_and_trimmed() {
        let mut h = HeaderMap::new();
        h.append("Connection", b" Close ".to_vec());
        assert!(h.requests_connection_close());
    }

    #[test]
    fn connection_close_does_not_match_substring() {
        let mut h = HeaderMap::new();
        h.append("Connection", b"keep-alive".to_vec());
        assert!(!h.requests_connection_close());
    }

    #[test]
    fn allow_204_requires_exact_token() {
        let mut h = HeaderMap::new();
        h.append("Allow", b"206, 204".to_vec());
        assert!(h.allows_204());

        let mut h2 = HeaderMap::new();
        h2.append("Allow", b"2045".to_vec());
        assert!(!h2.allows_204());
    }
}
