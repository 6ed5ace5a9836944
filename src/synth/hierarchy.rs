//! Hierarchy Inference
//!
//! Picks, for a freshly generated class, the most specific class generated
//! before it that it should specialize. Which earlier classes qualify is a
//! [`ParentPolicy`]; the generator does not care which one is in use.

use serde::{Deserialize, Serialize};

use super::naming::Naming;
use super::GeneratedClass;

/// Decides which earlier classes may parent a new one
pub trait ParentPolicy: std::fmt::Debug {
    /// Whether `candidate` may be a parent of `child`. Must be false when the
    /// two have the same name.
    fn admits(&self, candidate: &GeneratedClass, child: &GeneratedClass) -> bool;

    /// Larger is more specific
    fn specificity(&self, candidate: &GeneratedClass) -> usize;
}

/// `child`'s name ends with the candidate's full name.
///
/// With a separator, the match must also start on a separator boundary.
#[derive(Debug, Clone, Default)]
pub struct NameSuffix {
    separator: String,
}

impl NameSuffix {
    pub fn new(naming: &Naming) -> Self {
        Self { separator: naming.separator().to_string() }
    }
}

impl ParentPolicy for NameSuffix {
    fn admits(&self, candidate: &GeneratedClass, child: &GeneratedClass) -> bool {
        if candidate.name == child.name {
            return false;
        }
        match child.name.strip_suffix(candidate.name.as_str()) {
            Some(head) => self.separator.is_empty() || head.ends_with(&self.separator),
            None => false,
        }
    }

    fn specificity(&self, candidate: &GeneratedClass) -> usize {
        candidate.name.len()
    }
}

/// The candidate's build tuple is a proper ordered subsequence of the child's
#[derive(Debug, Clone, Copy, Default)]
pub struct TagSubsequence;

impl ParentPolicy for TagSubsequence {
    fn admits(&self, candidate: &GeneratedClass, child: &GeneratedClass) -> bool {
        if candidate.name == child.name || candidate.tuple.len() >= child.tuple.len() {
            return false;
        }
        let mut remaining = child.tuple.iter();
        candidate
            .tuple
            .iter()
            .all(|tag| remaining.any(|t| t == tag))
    }

    fn specificity(&self, candidate: &GeneratedClass) -> usize {
        candidate.tuple.len()
    }
}

/// Configurable choice of [`ParentPolicy`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParentPolicyKind {
    #[default]
    NameSuffix,
    TagSubsequence,
}

impl ParentPolicyKind {
    pub fn build(self, naming: &Naming) -> Box<dyn ParentPolicy> {
        match self {
            Self::NameSuffix => Box::new(NameSuffix::new(naming)),
            Self::TagSubsequence => Box::new(TagSubsequence),
        }
    }
}

/// Most specific admitted candidate; the earliest wins a tie
pub fn infer_parent<'a>(
    policy: &dyn ParentPolicy,
    candidates: &'a [GeneratedClass],
    child: &GeneratedClass,
) -> Option<&'a GeneratedClass> {
    let mut best: Option<&GeneratedClass> = None;
    for candidate in candidates.iter().filter(|c| policy.admits(c, child)) {
        if best.map_or(true, |b| policy.specificity(candidate) > policy.specificity(b)) {
            best = Some(candidate);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(tuple: &[&str]) -> GeneratedClass {
        let tuple = tuple.iter().map(|t| t.to_string()).collect();
        GeneratedClass::new(&Naming::concatenate(), tuple, "WaterPoint")
    }

    #[test]
    fn test_name_suffix_prefers_longest() {
        let policy = NameSuffix::default();
        let earlier =
            vec![class(&["Sensor"]), class(&["Flow", "Sensor"]), class(&["Temp", "Sensor"])];
        let child = class(&["Chilled", "Flow", "Sensor"]);

        let parent = infer_parent(&policy, &earlier, &child).unwrap();
        assert_eq!(parent.name, "FlowSensor");
    }

    #[test]
    fn test_never_self_parent() {
        let policy = NameSuffix::default();
        let earlier = vec![class(&["Flow", "Sensor"])];
        assert!(infer_parent(&policy, &earlier, &class(&["Flow", "Sensor"])).is_none());
        assert!(infer_parent(&TagSubsequence, &earlier, &class(&["Flow", "Sensor"])).is_none());
    }

    #[test]
    fn test_name_suffix_accepts_accidental_substrings() {
        // "GaSp" is one tag, yet its name ends with the unrelated class "Sp"
        let policy = NameSuffix::default();
        let sp = class(&["Sp"]);
        let child = class(&["GaSp"]);
        assert!(policy.admits(&sp, &child));
        assert!(!TagSubsequence.admits(&sp, &child));
    }

    #[test]
    fn test_separator_boundary() {
        let naming = Naming::separated("_");
        let policy = NameSuffix::new(&naming);
        let sp = GeneratedClass::new(&naming, vec!["Sp".into()], "Point");
        let ga_sp = GeneratedClass::new(&naming, vec!["GaSp".into()], "Point");
        let temp_sp = GeneratedClass::new(&naming, vec!["Temp".into(), "Sp".into()], "Point");

        assert_eq!(temp_sp.name, "Temp_Sp");
        assert!(policy.admits(&sp, &temp_sp));
        assert!(!policy.admits(&sp, &ga_sp));
    }

    #[test]
    fn test_tag_subsequence_order_matters() {
        let earlier = vec![class(&["Flow", "Sensor"]), class(&["Sensor", "Flow"])];
        let child = class(&["Chilled", "Flow", "Sensor"]);
        let parent = infer_parent(&TagSubsequence, &earlier, &child).unwrap();
        assert_eq!(parent.tuple, vec!["Flow".to_string(), "Sensor".to_string()]);
    }

    #[test]
    fn test_policy_kind_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: ParentPolicyKind,
        }
        let parsed: Wrapper = toml::from_str("policy = \"tag-subsequence\"").unwrap();
        assert_eq!(parsed.policy, ParentPolicyKind::TagSubsequence);
    }
}
