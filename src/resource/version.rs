//! Version Gate
//!
//! Decides which optional fields the connected cluster can return. Each
//! resource kind owns a `const` table of [`FieldRule`]s; a rule adds its field
//! to the projection when every one of its conditions holds. Rules only ever
//! add fields, so the table can be evaluated in any order.

use serde::Serialize;
use std::fmt;

/// Cluster API version as reported by `/cluster`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct VersionInfo {
    pub generation: u32,
    pub major: u32,
    pub minor: u32,
}

impl VersionInfo {
    pub const fn new(generation: u32, major: u32, minor: u32) -> Self {
        Self {
            generation,
            major,
            minor,
        }
    }

    fn part(&self, part: VersionPart) -> u32 {
        match part {
            VersionPart::Generation => self.generation,
            VersionPart::Major => self.major,
            VersionPart::Minor => self.minor,
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.generation, self.major, self.minor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionPart {
    Generation,
    Major,
    Minor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparison {
    fn holds(self, left: u32, right: u32) -> bool {
        match self {
            Comparison::Eq => left == right,
            Comparison::Ne => left != right,
            Comparison::Gt => left > right,
            Comparison::Ge => left >= right,
            Comparison::Lt => left < right,
            Comparison::Le => left <= right,
        }
    }
}

/// A single numeric comparison against one part of the version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub part: VersionPart,
    pub cmp: Comparison,
    pub value: u32,
}

impl Condition {
    pub const fn new(part: VersionPart, cmp: Comparison, value: u32) -> Self {
        Self { part, cmp, value }
    }

    pub const fn generation(cmp: Comparison, value: u32) -> Self {
        Self::new(VersionPart::Generation, cmp, value)
    }

    pub const fn major(cmp: Comparison, value: u32) -> Self {
        Self::new(VersionPart::Major, cmp, value)
    }

    pub const fn minor(cmp: Comparison, value: u32) -> Self {
        Self::new(VersionPart::Minor, cmp, value)
    }

    pub fn matches(&self, version: &VersionInfo) -> bool {
        self.cmp.holds(version.part(self.part), self.value)
    }
}

/// Adds `field` to the projection when all `conditions` hold.
/// A rule without conditions always applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub conditions: &'static [Condition],
}

impl FieldRule {
    pub const fn new(field: &'static str, conditions: &'static [Condition]) -> Self {
        Self { field, conditions }
    }

    pub fn applies_to(&self, version: &VersionInfo) -> bool {
        self.conditions.iter().all(|c| c.matches(version))
    }
}

/// Base fields followed by every applicable rule's field, deduplicated
/// keeping the first occurrence
pub fn resolve_fields<S: AsRef<str>>(
    base: &[S],
    version: &VersionInfo,
    rules: &[FieldRule],
) -> Vec<String> {
    let gated = rules
        .iter()
        .filter(|rule| rule.applies_to(version))
        .map(|rule| rule.field);

    let mut fields: Vec<String> = Vec::with_capacity(base.len() + rules.len());
    for field in base.iter().map(AsRef::as_ref).chain(gated) {
        if !fields.iter().any(|f| f == field) {
            fields.push(field.to_string());
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const METRIC: FieldRule = FieldRule::new(
        "metric",
        &[
            Condition::generation(Comparison::Eq, 9),
            Condition::major(Comparison::Gt, 10),
        ],
    );

    #[test]
    fn test_rule_requires_every_condition() {
        assert!(METRIC.applies_to(&VersionInfo::new(9, 11, 0)));
        assert!(!METRIC.applies_to(&VersionInfo::new(9, 10, 1)));
        assert!(!METRIC.applies_to(&VersionInfo::new(10, 11, 0)));
    }

    #[test]
    fn test_rule_without_conditions_always_applies() {
        let rule = FieldRule::new("uuid", &[]);
        assert!(rule.applies_to(&VersionInfo::default()));
    }

    #[test]
    fn test_gated_field_added_after_base() {
        let fields = resolve_fields(&["destination", "gateway"], &VersionInfo::new(9, 11, 0), &[METRIC]);
        assert_eq!(fields, vec!["destination", "gateway", "metric"]);
    }

    #[test]
    fn test_gated_field_withheld_on_older_cluster() {
        let fields = resolve_fields(&["destination", "gateway"], &VersionInfo::new(9, 8, 0), &[METRIC]);
        assert_eq!(fields, vec!["destination", "gateway"]);
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let always = FieldRule::new("gateway", &[]);
        let fields = resolve_fields(
            &["gateway", "destination", "gateway"],
            &VersionInfo::new(9, 12, 1),
            &[METRIC, always, METRIC],
        );
        assert_eq!(fields, vec!["gateway", "destination", "metric"]);
    }

    #[test]
    fn test_comparisons() {
        let v = VersionInfo::new(9, 10, 1);
        assert!(Condition::minor(Comparison::Ge, 1).matches(&v));
        assert!(Condition::minor(Comparison::Le, 1).matches(&v));
        assert!(Condition::minor(Comparison::Lt, 2).matches(&v));
        assert!(Condition::major(Comparison::Ne, 11).matches(&v));
        assert!(!Condition::major(Comparison::Ne, 10).matches(&v));
    }

    #[test]
    fn test_display() {
        assert_eq!(VersionInfo::new(9, 13, 1).to_string(), "9.13.1");
    }
}
