//! Semantic grouping of token kinds.

use std::collections::HashMap;
use std::fmt;

/// Semantic category of a token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Attribution,
    DataType,
    DataStructure,
    Value,
    Output,
    Scope,
    Decision,
    Loop,
    Modifier,
    Unknown,
}

const GROUPS: &[(Group, &[&str])] = &[
    (Group::Attribution, &["define"]),
    (Group::DataType, &["func", "fn", "static", "dynamic", "text"]),
    (Group::DataStructure, &["list", "dict", "obj"]),
    (Group::Value, &["var", "const", "true", "false", "null"]),
    (Group::Output, &["echo"]),
    (Group::Scope, &["scope", "end"]),
    (Group::Decision, &["case"]),
    (Group::Loop, &["cycle", "repeat"]),
    (
        Group::Modifier,
        &["format", "store", "to", "from", "through", "into"],
    ),
];

/// Look up the group of a token kind in the static table.
#[must_use]
pub fn group_of(kind: &str) -> Group {
    GROUPS
        .iter()
        .find(|(_, kinds)| kinds.contains(&kind))
        .map_or(Group::Unknown, |(group, _)| *group)
}

/// Memoizing classifier. Lives as long as one tree build.
#[derive(Debug, Default)]
pub struct Classifier {
    cache: HashMap<String, Group>,
}

impl Classifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Group of `kind`, cached after the first lookup.
    pub fn group_of(&mut self, kind: &str) -> Group {
        if let Some(group) = self.cache.get(kind) {
            return *group;
        }
        let group = group_of(kind);
        self.cache.insert(kind.to_string(), group);
        group
    }

    /// Number of distinct kinds classified so far.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Attribution => "attribution",
            Self::DataType => "data_type",
            Self::DataStructure => "data_structure",
            Self::Value => "value",
            Self::Output => "output",
            Self::Scope => "scope",
            Self::Decision => "decision",
            Self::Loop => "loop",
            Self::Modifier => "modifier",
            Self::Unknown => "unknown",
        })
    }
}
