//! Optional feature groups ("extras") and their requirements.

use std::collections::BTreeMap;
use std::fmt;

use semver::{Comparator, Op, Prerelease, VersionReq};
use serde::{Serialize, Serializer};

/// A dependency on another package, with an optional version constraint.
///
/// Renders as `name>=1.2.0,<2.0.0`; no constraint means any version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    name: String,
    constraint: Option<VersionReq>,
}

impl Requirement {
    /// A requirement on any version of `name`.
    pub fn any(name: impl Into<String>) -> Self {
        Requirement {
            name: name.into(),
            constraint: None,
        }
    }

    /// Add a `>=major.minor.patch` bound.
    pub fn at_least(self, major: u64, minor: u64, patch: u64) -> Self {
        self.with_comparator(comparator(Op::GreaterEq, major, minor, patch))
    }

    /// Add a `<major.minor.patch` bound.
    pub fn below(self, major: u64, minor: u64, patch: u64) -> Self {
        self.with_comparator(comparator(Op::Less, major, minor, patch))
    }

    fn with_comparator(mut self, cmp: Comparator) -> Self {
        self.constraint
            .get_or_insert_with(|| VersionReq { comparators: Vec::new() })
            .comparators
            .push(cmp);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn comparator(op: Op, major: u64, minor: u64, patch: u64) -> Comparator {
    Comparator {
        op,
        major,
        minor: Some(minor),
        patch: Some(patch),
        pre: Prerelease::EMPTY,
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(req) = &self.constraint {
            let bounds: Vec<String> = req.comparators.iter().map(|c| c.to_string()).collect();
            f.write_str(&bounds.join(","))?;
        }
        Ok(())
    }
}

impl Serialize for Requirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A named optional capability and the packages it pulls in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureGroup {
    pub key: &'static str,
    pub requirements: Vec<Requirement>,
}

impl FeatureGroup {
    pub fn new(key: &'static str, requirements: Vec<Requirement>) -> Self {
        FeatureGroup { key, requirements }
    }
}

/// Resolved extras: feature key to requirement list, keys unique and sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureMatrix {
    groups: BTreeMap<String, Vec<Requirement>>,
}

impl FeatureMatrix {
    pub fn new() -> Self {
        FeatureMatrix::default()
    }

    /// Insert a group. A later group with the same key replaces the earlier one.
    pub fn insert(&mut self, group: FeatureGroup) {
        self.groups.insert(group.key.to_string(), group.requirements);
    }

    /// Requirements for one feature key.
    pub fn get(&self, key: &str) -> Option<&[Requirement]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.groups.contains_key(key)
    }

    /// Feature keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Requirement])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<FeatureGroup> for FeatureMatrix {
    fn from_iter<I: IntoIterator<Item = FeatureGroup>>(iter: I) -> Self {
        let mut matrix = FeatureMatrix::new();
        for group in iter {
            matrix.insert(group);
        }
        matrix
    }
}
