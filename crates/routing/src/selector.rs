//! Model selector: fixed per-category priority table with degradation.
//!
//! | category   | 1st        | 2nd                                   |
//! |------------|------------|---------------------------------------|
//! | analytical | analytic   | general                               |
//! | complex    | reasoning  | analytic                              |
//! | creative   | generative | general                               |
//! | simple     | general    | analytic, generative, reasoning       |
//!
//! When no role in the row is available, the first available provider in
//! the configured fallback order is taken; failing that, any available
//! provider (lowest id first).

use std::collections::BTreeSet;

use parley_config::{RoleBindings, RoutingConfig};
use parley_core::error::RoutingError;
use parley_core::{Category, ProviderRole};

/// The outcome of a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub provider_id: String,
    /// The role the provider was picked for; `None` for order-based picks
    pub role: Option<ProviderRole>,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ModelSelector {
    roles: RoleBindings,
    fallback_order: Vec<String>,
}

impl ModelSelector {
    pub fn new(roles: RoleBindings, fallback_order: Vec<String>) -> Self {
        Self {
            roles,
            fallback_order,
        }
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        Self::new(config.roles.clone(), config.fallback_order.clone())
    }

    /// Provider id bound to a role.
    pub fn provider_for(&self, role: ProviderRole) -> &str {
        self.roles.get(role)
    }

    /// Roles to try for a category, in priority order.
    pub fn preferred_roles(category: Category) -> &'static [ProviderRole] {
        use ProviderRole::*;
        match category {
            Category::Analytical => &[Analytic, General],
            Category::Complex => &[Reasoning, Analytic],
            Category::Creative => &[Generative, General],
            Category::Simple => &[General, Analytic, Generative, Reasoning],
        }
    }

    pub fn select(
        &self,
        category: Category,
        available: &BTreeSet<String>,
    ) -> Result<Selection, RoutingError> {
        if available.is_empty() {
            return Err(RoutingError::NoProviderAvailable { category });
        }

        for role in Self::preferred_roles(category) {
            let id = self.roles.get(*role);
            if available.contains(id) {
                return Ok(Selection {
                    provider_id: id.to_string(),
                    role: Some(*role),
                    reason: format!("{category} query routed to {role} provider"),
                });
            }
        }

        let first = self
            .fallback_order
            .iter()
            .find(|id| available.contains(id.as_str()))
            .or_else(|| available.iter().next());

        match first {
            Some(id) => Ok(Selection {
                provider_id: id.clone(),
                role: None,
                reason: format!("no preferred provider for {category} query, first available"),
            }),
            None => Err(RoutingError::NoProviderAvailable { category }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector() -> ModelSelector {
        ModelSelector::from_config(&RoutingConfig::default())
    }

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    const ALL: &[&str] = &["openai", "anthropic", "gemini", "deepseek"];

    #[test]
    fn first_choices_when_all_available() {
        let s = selector();
        let all = set(ALL);
        assert_eq!(s.select(Category::Analytical, &all).unwrap().provider_id, "anthropic");
        assert_eq!(s.select(Category::Complex, &all).unwrap().provider_id, "deepseek");
        assert_eq!(s.select(Category::Creative, &all).unwrap().provider_id, "gemini");
        assert_eq!(s.select(Category::Simple, &all).unwrap().provider_id, "openai");
    }

    #[test]
    fn second_choices() {
        let s = selector();
        let sel = s.select(Category::Analytical, &set(&["openai", "gemini"])).unwrap();
        assert_eq!(sel.provider_id, "openai");
        assert_eq!(sel.role, Some(ProviderRole::General));

        let sel = s.select(Category::Complex, &set(&["anthropic", "gemini"])).unwrap();
        assert_eq!(sel.provider_id, "anthropic");

        let sel = s.select(Category::Simple, &set(&["gemini", "deepseek"])).unwrap();
        assert_eq!(sel.provider_id, "gemini");
    }

    #[test]
    fn falls_back_to_order() {
        let s = selector();
        // complex: neither reasoning nor analytic available
        let sel = s.select(Category::Complex, &set(&["gemini", "openai"])).unwrap();
        assert_eq!(sel.provider_id, "openai");
        assert!(sel.role.is_none());
    }

    #[test]
    fn empty_set_fails() {
        let s = selector();
        for category in Category::ALL {
            let err = s.select(category, &BTreeSet::new()).unwrap_err();
            assert!(matches!(err, RoutingError::NoProviderAvailable { .. }));
        }
    }

    #[test]
    fn single_provider_always_selected() {
        let s = selector();
        for id in ALL.iter().chain(&["mistral"]) {
            for category in Category::ALL {
                assert_eq!(s.select(category, &set(&[*id])).unwrap().provider_id, *id);
            }
        }
    }
}
