//! Validated Realtime Database paths.

use std::fmt;

use crate::error::{DatabaseError, DatabaseResult};

const FORBIDDEN: [char; 6] = ['.', '$', '#', '[', ']', '/'];

/// A location in the database tree, e.g. `users/u1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DatabasePath {
    segments: Vec<String>,
}

impl DatabasePath {
    /// The database root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash-separated path. Leading and trailing slashes are ignored.
    pub fn parse(path: &str) -> DatabaseResult<Self> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        trimmed
            .split('/')
            .try_fold(Self::root(), |acc, segment| acc.child(segment))
    }

    /// Append a single segment.
    pub fn child(mut self, segment: impl AsRef<str>) -> DatabaseResult<Self> {
        let segment = segment.as_ref();
        validate_segment(segment)?;
        self.segments.push(segment.to_string());
        Ok(self)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, if any.
    pub fn key(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Percent-encoded form used in REST URLs.
    pub fn to_url_path(&self) -> String {
        self.segments
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for DatabasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("/");
        }
        f.write_str(&self.segments.join("/"))
    }
}

fn validate_segment(segment: &str) -> DatabaseResult<()> {
    if segment.is_empty() {
        return Err(DatabaseError::invalid_path("empty path segment"));
    }
    if let Some(c) = segment
        .chars()
        .find(|c| FORBIDDEN.contains(c) || c.is_ascii_control())
    {
        return Err(DatabaseError::invalid_path(format!(
            "segment {:?} contains forbidden character {:?}",
            segment, c
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_from_segments() {
        let path = DatabasePath::root()
            .child("users")
            .and_then(|p| p.child("u1"))
            .unwrap();
        assert_eq!(path.to_string(), "users/u1");
        assert_eq!(path.key(), Some("u1"));
        assert_eq!(path.segments().len(), 2);
    }

    #[test]
    fn test_parse_ignores_outer_slashes() {
        let path = DatabasePath::parse("/posts/u1/p1/").unwrap();
        assert_eq!(path.to_string(), "posts/u1/p1");
        assert!(DatabasePath::parse("").unwrap().is_root());
        assert_eq!(DatabasePath::root().to_string(), "/");
    }

    #[test]
    fn test_rejects_forbidden_segments() {
        for bad in ["", "a.b", "a$", "#x", "[0]", "a]", "a\nb"] {
            assert!(
                DatabasePath::root().child(bad).is_err(),
                "segment {:?} should be rejected",
                bad
            );
        }
        assert!(DatabasePath::parse("users//u1").is_err());
    }

    #[test]
    fn test_url_path_is_percent_encoded() {
        let path = DatabasePath::parse("users/first last").unwrap();
        assert_eq!(path.to_url_path(), "users/first%20last");
        assert_eq!(path.to_string(), "users/first last");
    }
}
