//! Rule-based evaluation with priority and deny-wins conflict resolution.
//!
//! Rules from every assigned role are flattened into one candidate list. Only
//! the highest-priority tier of active, exactly matching rules is considered;
//! within that tier a single deny outweighs any number of allows. No candidates
//! means deny.
//!
//! Assignment scope is not consulted: a business-unit or outlet assignment
//! contributes its rules exactly like a global one.

use crate::models::{Effect, PermissionRule, RoleAssignment, normalize_token};

/// Outcome of rule evaluation, with enough detail to audit the decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub allowed: bool,
    /// Number of active rules matching the pair, across all tiers.
    pub candidates: usize,
    /// Priority of the winning tier (None when there were no candidates).
    pub top_priority: Option<i32>,
    /// Effect that decided the outcome.
    pub deciding_effect: Option<Effect>,
    /// Identifier of the role owning the deciding rule.
    pub deciding_role: Option<String>,
}

impl RuleOutcome {
    fn no_candidates() -> Self {
        Self {
            allowed: false,
            candidates: 0,
            top_priority: None,
            deciding_effect: None,
            deciding_role: None,
        }
    }
}

/// Evaluate a user's rule-based assignments for `(resource, action)`.
pub fn evaluate_rules(assignments: &[RoleAssignment], resource: &str, action: &str) -> bool {
    explain_rules(assignments, resource, action).allowed
}

/// Evaluate rules and report which tier and rule decided.
pub fn explain_rules(assignments: &[RoleAssignment], resource: &str, action: &str) -> RuleOutcome {
    let resource = normalize_token(resource);
    let action = normalize_token(action);

    let candidates: Vec<(&RoleAssignment, &PermissionRule)> = assignments
        .iter()
        .flat_map(|a| a.role.rules.iter().map(move |rule| (a, rule)))
        .filter(|(_, rule)| rule.applies_to(&resource, &action))
        .collect();

    let Some(max_priority) = candidates.iter().map(|(_, rule)| rule.priority).max() else {
        tracing::trace!(resource = %resource, action = %action, "No candidate rules");
        return RuleOutcome::no_candidates();
    };

    let top_tier: Vec<&(&RoleAssignment, &PermissionRule)> = candidates
        .iter()
        .filter(|(_, rule)| rule.priority == max_priority)
        .collect();

    // Deny wins within the top tier.
    let deciding = top_tier
        .iter()
        .find(|(_, rule)| rule.effect.is_deny())
        .or_else(|| {
            top_tier
                .iter()
                .find(|(_, rule)| rule.effect == Effect::Allow)
        });

    let outcome = match deciding {
        Some((assignment, rule)) => RuleOutcome {
            allowed: rule.effect == Effect::Allow,
            candidates: candidates.len(),
            top_priority: Some(max_priority),
            deciding_effect: Some(rule.effect),
            deciding_role: Some(assignment.role.identifier()),
        },
        None => RuleOutcome {
            candidates: candidates.len(),
            top_priority: Some(max_priority),
            ..RuleOutcome::no_candidates()
        },
    };

    tracing::trace!(
        resource = %resource,
        action = %action,
        candidates = outcome.candidates,
        top_priority = max_priority,
        effect = ?outcome.deciding_effect,
        role = ?outcome.deciding_role,
        "Rules evaluated"
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, RoleScope};

    fn assign(name: &str, rules: Vec<PermissionRule>) -> RoleAssignment {
        RoleAssignment::global(Role::new(name).with_rules(rules))
    }

    #[test]
    fn test_no_rules_denies() {
        assert!(!evaluate_rules(&[], "orders", "read"));
        let outcome = explain_rules(&[assign("viewer", vec![])], "orders", "read");
        assert_eq!(outcome, RuleOutcome::no_candidates());
    }

    #[test]
    fn test_single_allow() {
        let assignments = [assign("viewer", vec![PermissionRule::allow("orders", "read")])];
        assert!(evaluate_rules(&assignments, "orders", "read"));
        assert!(!evaluate_rules(&assignments, "orders", "update"));
        assert!(!evaluate_rules(&assignments, "products", "read"));
    }

    #[test]
    fn test_inputs_are_normalized() {
        let assignments = [assign("viewer", vec![PermissionRule::allow("orders", "read")])];
        assert!(evaluate_rules(&assignments, " Orders", "READ"));
    }

    #[test]
    fn test_inactive_rules_are_ignored() {
        let assignments = [assign(
            "viewer",
            vec![
                PermissionRule::deny("orders", "read")
                    .with_priority(100)
                    .with_active(false),
                PermissionRule::allow("orders", "read"),
            ],
        )];
        assert!(evaluate_rules(&assignments, "orders", "read"));
    }

    #[test]
    fn test_only_inactive_rules_deny() {
        let assignments = [assign(
            "viewer",
            vec![PermissionRule::allow("orders", "read").with_active(false)],
        )];
        assert!(!evaluate_rules(&assignments, "orders", "read"));
    }

    #[test]
    fn test_higher_priority_allow_overrides_deny() {
        let assignments = [
            assign("a", vec![PermissionRule::deny("orders", "void").with_priority(1)]),
            assign("b", vec![PermissionRule::allow("orders", "void").with_priority(2)]),
        ];
        let outcome = explain_rules(&assignments, "orders", "void");
        assert!(outcome.allowed);
        assert_eq!(outcome.candidates, 2);
        assert_eq!(outcome.top_priority, Some(2));
        assert_eq!(outcome.deciding_role.as_deref(), Some("b"));
    }

    #[test]
    fn test_higher_priority_deny_overrides_allow() {
        let assignments = [assign(
            "a",
            vec![
                PermissionRule::allow("orders", "void").with_priority(3),
                PermissionRule::deny("orders", "void").with_priority(4),
            ],
        )];
        assert!(!evaluate_rules(&assignments, "orders", "void"));
    }

    #[test]
    fn test_deny_wins_ties_regardless_of_order() {
        let allow = assign(
            "seller",
            vec![PermissionRule::allow("invoice", "read").with_priority(10)],
        );
        let deny = assign(
            "auditor",
            vec![PermissionRule::deny("invoice", "read").with_priority(10)],
        );

        let forward = explain_rules(&[allow.clone(), deny.clone()], "invoice", "read");
        let backward = explain_rules(&[deny, allow], "invoice", "read");
        assert!(!forward.allowed);
        assert!(!backward.allowed);
        assert_eq!(forward.deciding_effect, Some(Effect::Deny));
        assert_eq!(forward.deciding_role.as_deref(), Some("auditor"));
        assert_eq!(backward.deciding_role.as_deref(), Some("auditor"));
    }

    #[test]
    fn test_negative_priorities() {
        let assignments = [assign(
            "a",
            vec![
                PermissionRule::deny("orders", "read").with_priority(-5),
                PermissionRule::allow("orders", "read").with_priority(-1),
            ],
        )];
        let outcome = explain_rules(&assignments, "orders", "read");
        assert!(outcome.allowed);
        assert_eq!(outcome.top_priority, Some(-1));
    }

    #[test]
    fn test_scope_does_not_affect_evaluation() {
        let outlet_role = Role::new("outlet manager")
            .with_scope(RoleScope::Outlet)
            .with_rule(PermissionRule::allow("product", "update"));
        let assignments = [RoleAssignment::outlet(outlet_role, "outlet-42")];
        assert!(evaluate_rules(&assignments, "product", "update"));
    }
}
