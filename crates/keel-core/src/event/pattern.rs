use std::fmt;

use crate::event::error::EventSystemError;

/// The subscription token that matches exactly one arbitrary key segment.
pub const WILDCARD: &str = "*";

/// A validated, dot-segmented event key (e.g. `fs.write.completed`).
///
/// Keys are validated once at construction; a key never contains the
/// wildcard token, empty segments, or control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct EventKey(String);

impl EventKey {
    /// Parse and validate a raw key string.
    pub fn parse(raw: &str) -> Result<Self, EventSystemError> {
        if let Err(reason) = validate_segments(raw, false) {
            return Err(EventSystemError::InvalidKey {
                key: raw.to_string(),
                reason,
            });
        }
        Ok(EventKey(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the dot-separated segments of the key.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One compiled segment of a subscription pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches a key segment equal to the string.
    Exact(String),
    /// Matches any single key segment.
    Wildcard,
}

/// A subscription pattern, compiled once at subscribe time.
///
/// Matching requires an equal segment count; each pattern segment is either
/// an exact string or the wildcard. No prefix or multi-level matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl EventPattern {
    /// Compile a raw pattern string into its segment list.
    pub fn compile(raw: &str) -> Result<Self, EventSystemError> {
        if let Err(reason) = validate_segments(raw, true) {
            return Err(EventSystemError::InvalidPattern {
                pattern: raw.to_string(),
                reason,
            });
        }
        let segments = raw
            .split('.')
            .map(|s| {
                if s == WILDCARD {
                    Segment::Wildcard
                } else {
                    Segment::Exact(s.to_string())
                }
            })
            .collect();
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Check whether an emitted key matches this pattern.
    pub fn matches(&self, key: &EventKey) -> bool {
        let mut count = 0usize;
        for (i, seg) in key.segments().enumerate() {
            count += 1;
            match self.segments.get(i) {
                Some(Segment::Wildcard) => {}
                Some(Segment::Exact(expected)) if expected == seg => {}
                _ => return false,
            }
        }
        count == self.segments.len()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Number of segments in the compiled pattern.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for EventPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Shared validation for keys and patterns. Returns the rejection reason.
fn validate_segments(raw: &str, allow_wildcard: bool) -> Result<(), String> {
    if raw.is_empty() {
        return Err("must not be empty".to_string());
    }
    if raw.chars().any(|c| c.is_control()) {
        return Err("must not contain control characters".to_string());
    }
    for segment in raw.split('.') {
        if segment.is_empty() {
            return Err("must not contain empty segments".to_string());
        }
        if !allow_wildcard && segment == WILDCARD {
            return Err(format!(
                "the wildcard token '{}' is only valid in subscription patterns",
                WILDCARD
            ));
        }
    }
    Ok(())
}
