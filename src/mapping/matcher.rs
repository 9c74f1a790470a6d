//! Specificity matching of query URLs against stored patterns.
//!
//! # Responsibilities
//! - Split patterns and queries on `/` into segments
//! - Match segment by segment (`*` matches exactly one segment)
//! - Rank competing matches by specificity
//!
//! # Design Decisions
//! - Segment counts must be equal; no prefix matching, no multi-segment glob
//! - Literal comparison is case-sensitive
//! - Host and path segments are treated alike
//! - Specificity is a left-to-right literal/wildcard bit sequence compared
//!   lexicographically, so a literal at an earlier position always wins
//! - Equal specificity: the pattern stored last wins

use crate::mapping::types::Mapping;

const WILDCARD: &str = "*";

/// One segment of a parsed pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Wildcard,
}

impl<'a> Segment<'a> {
    fn parse(raw: &'a str) -> Self {
        if raw == WILDCARD {
            Segment::Wildcard
        } else {
            Segment::Literal(raw)
        }
    }

    fn matches(&self, query: &str) -> bool {
        match self {
            Segment::Wildcard => true,
            Segment::Literal(lit) => *lit == query,
        }
    }
}

/// Literal/wildcard layout of a pattern, leftmost segment first.
///
/// `true` marks a literal segment. Ordering is lexicographic, which makes
/// `Specificity` directly comparable between patterns of the same length.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity(Vec<bool>);

/// A pattern split into segments, borrowing from its source string.
#[derive(Debug, Clone)]
pub struct SegmentPattern<'a> {
    segments: Vec<Segment<'a>>,
}

impl<'a> SegmentPattern<'a> {
    pub fn parse(pattern: &'a str) -> Self {
        Self {
            segments: pattern.split('/').map(Segment::parse).collect(),
        }
    }

    /// Returns true if every segment matches the query segment at the same position.
    pub fn matches(&self, query: &[&str]) -> bool {
        self.segments.len() == query.len()
            && self
                .segments
                .iter()
                .zip(query)
                .all(|(segment, q)| segment.matches(q))
    }

    pub fn specificity(&self) -> Specificity {
        Specificity(
            self.segments
                .iter()
                .map(|s| matches!(s, Segment::Literal(_)))
                .collect(),
        )
    }
}

/// Split a normalized query URL into segments.
pub fn split_query(url: &str) -> Vec<&str> {
    url.split('/').collect()
}

/// Select the most specific mapping whose pattern matches `url`.
///
/// `url` must already be normalized. `mappings` is expected in insertion
/// order; among equally specific matches the last one is returned.
pub fn best_match<'m>(mappings: &'m [Mapping], url: &str) -> Option<&'m Mapping> {
    let query = split_query(url);

    mappings
        .iter()
        .filter_map(|mapping| {
            let pattern = SegmentPattern::parse(&mapping.pattern);
            pattern
                .matches(&query)
                .then(|| (pattern.specificity(), mapping))
        })
        // `max_by` keeps the last of equal elements
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, mapping)| mapping)
}
