use std::fmt;

/// Slash-separated address of a node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    pub fn root() -> Self {
        StorePath::default()
    }

    /// Parses `a/b/c`. Empty segments are dropped, so `""` and `"/"` are the root.
    pub fn parse(raw: &str) -> Self {
        StorePath {
            segments: raw
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Appends one or more segments. A relative path such as
    /// `transactions/transactions_total` appends both parts.
    pub fn child(&self, relative: impl AsRef<str>) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(
            relative
                .as_ref()
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
        StorePath { segments }
    }

    pub fn parent(&self) -> Option<StorePath> {
        if self.segments.is_empty() {
            return None;
        }
        Some(StorePath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Last segment, `None` at the root.
    pub fn key(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when `self` equals `other` or lies beneath it.
    pub fn starts_with(&self, other: &StorePath) -> bool {
        self.segments.len() >= other.segments.len()
            && self.segments[..other.segments.len()] == other.segments[..]
    }

    /// Segments of `self` below `ancestor`, if `ancestor` contains it.
    pub fn relative_to(&self, ancestor: &StorePath) -> Option<&[String]> {
        if self.starts_with(ancestor) {
            Some(&self.segments[ancestor.segments.len()..])
        } else {
            None
        }
    }

    /// True when one path contains the other, i.e. a write at one can change
    /// the value observed at the other.
    pub fn overlaps(&self, other: &StorePath) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }

    /// Keys may not contain `.`, `$`, `#`, `[`, `]`, `/` or control characters.
    pub fn is_valid_segment(segment: &str) -> bool {
        !segment.is_empty()
            && !segment
                .chars()
                .any(|c| matches!(c, '.' | '$' | '#' | '[' | ']' | '/') || c.is_control())
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}
