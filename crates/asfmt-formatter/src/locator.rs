//! Decorator range extraction

use asfmt_host::Span;

use crate::superset::{self, Declaration};

/// Exact source range of one decorator, `@` through its last character
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecoratorRange {
    pub start: usize,
    pub end: usize,
}

impl DecoratorRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The decorator text in `source`
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

impl From<Span> for DecoratorRange {
    fn from(span: Span) -> Self {
        Self::new(span.start, span.end)
    }
}

/// Ranges of every decorator in `source`, ascending and non-overlapping
///
/// Returns `None` when `source` is not valid superset syntax; such files go
/// to the host formatter untouched.
pub fn locate(source: &str) -> Option<Vec<DecoratorRange>> {
    let tree = superset::parse(source).ok()?;
    let mut ranges = Vec::new();
    collect(&tree.declarations, &mut ranges);
    ranges.sort_unstable();
    debug_assert!(ranges.windows(2).all(|w| w[0].end <= w[1].start));
    Some(ranges)
}

fn collect(declarations: &[Declaration], ranges: &mut Vec<DecoratorRange>) {
    for declaration in declarations {
        match declaration {
            Declaration::Class {
                decorators,
                members,
                ..
            }
            | Declaration::Interface {
                decorators,
                members,
                ..
            }
            | Declaration::Namespace {
                decorators,
                members,
                ..
            } => {
                ranges.extend(decorators.iter().map(|d| DecoratorRange::from(d.span)));
                collect(members, ranges);
            }
            Declaration::Enum { decorators, .. }
            | Declaration::Method { decorators, .. }
            | Declaration::Field { decorators, .. }
            | Declaration::Function { decorators, .. }
            | Declaration::VariableStatement { decorators } => {
                ranges.extend(decorators.iter().map(|d| DecoratorRange::from(d.span)));
            }
            Declaration::Other => {}
        }
    }
}
