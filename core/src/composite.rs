//! Composite job identifiers and selection normalization.
//!
//! A composite identifier names two jobs played together, e.g. a healer duo
//! selected as `"White Mage+Scholar"` or `"Sage (x2)"`. Row data is keyed by
//! single jobs, so composite selections are expanded into their parts before
//! matching.

use hashbrown::HashSet;

use crate::config::EngineConfig;

const DUPLICATE_SUFFIX: &str = " (x2)";

/// A parsed job identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobIdentity {
    Single(String),
    Pair(String, String),
}

impl JobIdentity {
    pub fn is_pair(&self) -> bool {
        matches!(self, JobIdentity::Pair(..))
    }

    /// Constituent jobs: one for a single, two for a pair.
    pub fn parts(&self) -> Vec<&str> {
        match self {
            JobIdentity::Single(name) => vec![name.as_str()],
            JobIdentity::Pair(a, b) => vec![a.as_str(), b.as_str()],
        }
    }
}

/// Raw job selection as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SelectionInput {
    #[default]
    None,
    One(String),
    Many(Vec<String>),
}

impl From<&str> for SelectionInput {
    fn from(s: &str) -> Self {
        SelectionInput::One(s.to_string())
    }
}

impl From<String> for SelectionInput {
    fn from(s: String) -> Self {
        SelectionInput::One(s)
    }
}

impl From<Vec<String>> for SelectionInput {
    fn from(v: Vec<String>) -> Self {
        SelectionInput::Many(v)
    }
}

impl From<&[&str]> for SelectionInput {
    fn from(v: &[&str]) -> Self {
        SelectionInput::Many(v.iter().map(|s| s.to_string()).collect())
    }
}

impl<T: Into<SelectionInput>> From<Option<T>> for SelectionInput {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or_default()
    }
}

/// Canonical ordered-unique selection: trimmed, blanks removed, first
/// occurrence wins.
pub fn normalize_selection(input: impl Into<SelectionInput>) -> Vec<String> {
    let names = match input.into() {
        SelectionInput::None => Vec::new(),
        SelectionInput::One(name) => vec![name],
        SelectionInput::Many(names) => names,
    };

    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty() && seen.insert(n.clone()))
        .collect()
}

/// Parses composite identifiers against a roster of pairable jobs.
#[derive(Debug, Clone, Default)]
pub struct CompositeExpander {
    pairable: HashSet<String>,
}

impl CompositeExpander {
    pub fn new<I, S>(pairable: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pairable: pairable.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.pairable_jobs.iter().cloned())
    }

    pub fn is_pairable(&self, name: &str) -> bool {
        self.pairable.contains(name)
    }

    /// Split `"A+B"` (two distinct pairable jobs) or `"A (x2)"` (one pairable
    /// job doubled). Anything else is an ordinary identifier and yields `None`.
    pub fn parse_composite(&self, name: &str) -> Option<(String, String)> {
        let name = name.trim();

        if let Some(base) = name.strip_suffix(DUPLICATE_SUFFIX) {
            let base = base.trim_end();
            return self
                .is_pairable(base)
                .then(|| (base.to_string(), base.to_string()));
        }

        let (a, b) = name.split_once('+')?;
        let (a, b) = (a.trim(), b.trim());
        if a != b && self.is_pairable(a) && self.is_pairable(b) {
            Some((a.to_string(), b.to_string()))
        } else {
            None
        }
    }

    pub fn identify(&self, name: &str) -> JobIdentity {
        match self.parse_composite(name) {
            Some((a, b)) => JobIdentity::Pair(a, b),
            None => JobIdentity::Single(name.trim().to_string()),
        }
    }

    /// Replace every composite identifier with its parts, de-duplicating and
    /// keeping first-seen order. Ordinary identifiers pass through untouched.
    pub fn expand_selection<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut expanded = Vec::new();
        for name in names {
            let identity = self.identify(name.as_ref());
            for part in identity.parts() {
                if seen.insert(part.to_string()) {
                    expanded.push(part.to_string());
                }
            }
        }
        expanded
    }
}
