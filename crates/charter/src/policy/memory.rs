//! An in-memory government for headless use and tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use charter_core::Signal;
use charter_core::logging::targets;
use parking_lot::Mutex;

use super::domain::{
    CommandSink, EligibilityOracle, GovernmentContext, Policy, PolicyCatalog, PolicyCommand,
    PolicyRef, SlotInventory,
};

#[derive(Debug, Default)]
struct State {
    policies: BTreeMap<String, PolicyRef>,
    total_slots: BTreeMap<String, i32>,
    adopted: BTreeMap<String, BTreeMap<usize, String>>,
    locked: BTreeSet<String>,
    restricted: BTreeSet<String>,
    budget: f64,
    issued: Vec<PolicyCommand>,
}

impl State {
    fn is_adopted(&self, name: &str) -> bool {
        self.adopted.values().any(|slots| slots.values().any(|p| p == name))
    }

    fn remove_adopted(&mut self, name: &str) {
        for slots in self.adopted.values_mut() {
            slots.retain(|_, p| p != name);
        }
        self.adopted.retain(|_, slots| !slots.is_empty());
    }
}

/// Implements every domain service over plain collections.
///
/// Issued commands are recorded and applied immediately; each one fires
/// [`changed`](Self::changed).
#[derive(Debug)]
pub struct InMemoryGovernment {
    state: Mutex<State>,
    /// Fired after every applied command.
    pub changed: Signal<()>,
}

impl Default for InMemoryGovernment {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGovernment {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                budget: f64::INFINITY,
                ..State::default()
            }),
            changed: Signal::new(),
        }
    }

    pub fn add_policy(&self, policy: Policy) {
        self.state.lock().policies.insert(policy.name.clone(), Arc::new(policy));
    }

    pub fn set_slots(&self, category: impl Into<String>, count: i32) {
        self.state.lock().total_slots.insert(category.into(), count);
    }

    /// Put `policy` in a slot without issuing a command.
    pub fn adopt(&self, category: impl Into<String>, slot: usize, policy: impl Into<String>) {
        let policy = policy.into();
        let mut state = self.state.lock();
        state.remove_adopted(&policy);
        state.adopted.entry(category.into()).or_default().insert(slot, policy);
    }

    pub fn set_locked(&self, policy: impl Into<String>, locked: bool) {
        let policy = policy.into();
        let mut state = self.state.lock();
        if locked {
            state.locked.insert(policy);
        } else {
            state.locked.remove(&policy);
        }
    }

    pub fn set_restricted(&self, policy: impl Into<String>, restricted: bool) {
        let policy = policy.into();
        let mut state = self.state.lock();
        if restricted {
            state.restricted.insert(policy);
        } else {
            state.restricted.remove(&policy);
        }
    }

    /// Policies costing more than `budget` are unaffordable.
    pub fn set_budget(&self, budget: f64) {
        self.state.lock().budget = budget;
    }

    /// Every command issued so far.
    pub fn issued(&self) -> Vec<PolicyCommand> {
        self.state.lock().issued.clone()
    }

    /// Wrap in a context whose `policies_changed` follows [`changed`](Self::changed).
    pub fn into_context(self: Arc<Self>) -> Arc<GovernmentContext> {
        let context = GovernmentContext::from_service(self.clone());
        self.changed.forward_to(&context.policies_changed);
        Arc::new(context)
    }
}

impl PolicyCatalog for InMemoryGovernment {
    fn policies(&self) -> Vec<PolicyRef> {
        self.state.lock().policies.values().cloned().collect()
    }

    fn policy(&self, name: &str) -> Option<PolicyRef> {
        self.state.lock().policies.get(name).cloned()
    }
}

impl EligibilityOracle for InMemoryGovernment {
    fn is_adopted(&self, policy: &str) -> bool {
        self.state.lock().is_adopted(policy)
    }

    fn is_affordable(&self, policy: &str) -> bool {
        let state = self.state.lock();
        state.policies.get(policy).is_some_and(|p| p.adoption_cost <= state.budget)
    }

    fn is_restricted(&self, policy: &str) -> bool {
        self.state.lock().restricted.contains(policy)
    }

    fn is_locked(&self, policy: &str) -> bool {
        self.state.lock().locked.contains(policy)
    }
}

impl CommandSink for InMemoryGovernment {
    fn issue(&self, command: PolicyCommand) {
        tracing::debug!(target: targets::POLICY, ?command, "command issued");
        {
            let mut state = self.state.lock();
            if command.adopt {
                state.remove_adopted(&command.policy_name);
                state
                    .adopted
                    .entry(command.category.clone())
                    .or_default()
                    .insert(command.category_slot, command.policy_name.clone());
            } else {
                state.remove_adopted(&command.policy_name);
            }
            state.issued.push(command);
        }
        self.changed.emit(());
    }
}

impl SlotInventory for InMemoryGovernment {
    fn total_slots(&self) -> BTreeMap<String, i32> {
        self.state.lock().total_slots.clone()
    }

    fn adopted(&self) -> BTreeMap<String, BTreeMap<usize, String>> {
        self.state.lock().adopted.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_apply_and_notify() {
        let government = Arc::new(InMemoryGovernment::new());
        government.add_policy(Policy::new("PLC_ALGORITHMIC_RESEARCH", "SOCIAL_CATEGORY", 9.0));
        government.set_slots("SOCIAL_CATEGORY", 2);

        let context = government.clone().into_context();
        let fired = Arc::new(Mutex::new(0));
        let fired_clone = fired.clone();
        context.policies_changed.connect(move |_| *fired_clone.lock() += 1);

        government.issue(PolicyCommand {
            policy_name: "PLC_ALGORITHMIC_RESEARCH".into(),
            category: "SOCIAL_CATEGORY".into(),
            adopt: true,
            category_slot: 1,
        });
        assert!(government.is_adopted("PLC_ALGORITHMIC_RESEARCH"));
        assert_eq!(government.adopted()["SOCIAL_CATEGORY"][&1], "PLC_ALGORITHMIC_RESEARCH");
        assert_eq!(*fired.lock(), 1);

        government.issue(PolicyCommand {
            policy_name: "PLC_ALGORITHMIC_RESEARCH".into(),
            category: "SOCIAL_CATEGORY".into(),
            adopt: false,
            category_slot: 1,
        });
        assert!(!government.is_adopted("PLC_ALGORITHMIC_RESEARCH"));
        assert!(government.adopted().is_empty());
        assert_eq!(government.issued().len(), 2);
        assert_eq!(*fired.lock(), 2);
    }

    #[test]
    fn test_budget_controls_affordability() {
        let government = InMemoryGovernment::new();
        government.add_policy(Policy::new("PLC_CHEAP", "ECONOMIC_CATEGORY", 5.0));
        government.add_policy(Policy::new("PLC_DEAR", "ECONOMIC_CATEGORY", 50.0));
        government.set_budget(10.0);
        assert!(government.is_affordable("PLC_CHEAP"));
        assert!(!government.is_affordable("PLC_DEAR"));
        assert!(!government.is_affordable("PLC_UNKNOWN"));
    }

    #[test]
    fn test_catalog_categories_sorted() {
        let government = InMemoryGovernment::new();
        government.add_policy(Policy::new("B", "SOCIAL_CATEGORY", 1.0));
        government.add_policy(Policy::new("A", "ECONOMIC_CATEGORY", 1.0));
        government.add_policy(Policy::new("C", "ECONOMIC_CATEGORY", 1.0));
        assert_eq!(government.categories(), vec!["ECONOMIC_CATEGORY", "SOCIAL_CATEGORY"]);
    }
}
