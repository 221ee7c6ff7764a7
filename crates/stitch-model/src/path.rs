//! Lookup paths for re-locating containers
//!
//! A [`LookupPath`] is the structural address of a container. It survives
//! re-parses of unchanged regions, so a session can find "the same"
//! container in every new snapshot.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Structural address of a container within a document
///
/// The first segment is the namespace-qualified name of a top-level type;
/// every following segment names a nested type.
///
/// # Examples
/// - `["Acme.Orders.OrderService"]` → `Acme.Orders.OrderService`
/// - `["Acme.Orders.OrderService", "Validator"]` → `Acme.Orders.OrderService/Validator`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct LookupPath(Vec<String>);

impl LookupPath {
    /// Create path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Path to a top-level type
    #[inline]
    #[must_use]
    pub fn top_level(qualified_name: impl Into<String>) -> Self {
        Self(vec![qualified_name.into()])
    }

    /// Path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the path addresses nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of a nested type inside this container
    #[inline]
    #[must_use]
    pub fn nested(&self, name: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(name.into());
        new
    }

    /// Enclosing container path, if this is a nested type
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() > 1 {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        } else {
            None
        }
    }

    /// Simple name of the addressed container
    #[must_use]
    pub fn simple_name(&self) -> Option<&str> {
        let last = self.0.last()?;
        Some(last.rsplit('.').next().unwrap_or(last))
    }

    /// Iterator over segments from outermost to innermost
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for LookupPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl FromStr for LookupPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }

        let segments = s
            .split('/')
            .enumerate()
            .map(|(i, seg)| {
                if seg.is_empty() {
                    return Err(PathError::EmptySegment);
                }
                // Only the first segment may carry a namespace qualifier.
                let valid = seg.split('.').all(|part| {
                    !part.is_empty() && part.chars().all(|c| c.is_alphanumeric() || c == '_')
                });
                if !valid || (i > 0 && seg.contains('.')) {
                    Err(PathError::InvalidSegment(seg.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl From<Vec<String>> for LookupPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

/// Errors related to lookup paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// No segments at all
    #[error("lookup path is empty")]
    Empty,

    /// Empty segment in path
    #[error("lookup path contains empty segment")]
    EmptySegment,

    /// Invalid segment characters
    #[error("invalid segment: {0}")]
    InvalidSegment(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_and_nested() {
        let path = LookupPath::top_level("Acme.Orders.OrderService");
        let nested = path.nested("Validator");
        assert_eq!(nested.len(), 2);
        assert_eq!(nested.to_string(), "Acme.Orders.OrderService/Validator");
        assert_eq!(nested.parent(), Some(path.clone()));
        assert_eq!(path.parent(), None);
    }

    #[test]
    fn simple_name_strips_namespace() {
        let path = LookupPath::top_level("Acme.Orders.OrderService");
        assert_eq!(path.simple_name(), Some("OrderService"));
        assert_eq!(path.nested("Inner").simple_name(), Some("Inner"));
    }

    #[test]
    fn parse_roundtrip() {
        let path: LookupPath = "Acme.OrderService/Inner".parse().unwrap();
        assert_eq!(path.segments(), &["Acme.OrderService", "Inner"]);
        assert_eq!(path.to_string(), "Acme.OrderService/Inner");
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(matches!("".parse::<LookupPath>(), Err(PathError::Empty)));
        assert!(matches!("A//B".parse::<LookupPath>(), Err(PathError::EmptySegment)));
        assert!(matches!(
            "A/B.C".parse::<LookupPath>(),
            Err(PathError::InvalidSegment(_))
        ));
        assert!(matches!(
            "A-b".parse::<LookupPath>(),
            Err(PathError::InvalidSegment(_))
        ));
    }
}
