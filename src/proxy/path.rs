//! Upstream path construction.

use std::fmt;

/// The joined path of a proxied request, relative to the upstream base.
///
/// Segments are joined with "/" and otherwise left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamPath(String);

impl UpstreamPath {
    /// Join ordered path segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = segments
            .into_iter()
            .map(|s| s.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join("/");
        Self(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substring test against the joined path.
    pub fn contains(&self, marker: &str) -> bool {
        self.0.contains(marker)
    }

    /// True when any of `markers` occurs in the path.
    pub fn contains_any<S: AsRef<str>>(&self, markers: &[S]) -> bool {
        markers.iter().any(|m| self.contains(m.as_ref()))
    }

    /// Outbound URL: base + "/" + joined path.
    pub fn target_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }
}

impl fmt::Display for UpstreamPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
