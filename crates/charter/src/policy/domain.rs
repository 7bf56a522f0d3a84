//! The policy domain as the screens see it.
//!
//! Policies, slots and the empire's standing are owned elsewhere. The screens
//! read them through [`PolicyCatalog`], [`EligibilityOracle`] and
//! [`SlotInventory`], and request changes through [`CommandSink`]. A
//! [`GovernmentContext`] bundles the four with the notification the owner
//! fires after any change.

use std::collections::BTreeMap;
use std::sync::Arc;

use charter_core::Signal;

/// A government policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub name: String,
    pub category: String,
    pub adoption_cost: f64,
    pub short_description: String,
    pub description: String,
}

impl Policy {
    pub fn new(name: impl Into<String>, category: impl Into<String>, adoption_cost: f64) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            adoption_cost,
            short_description: String::new(),
            description: String::new(),
        }
    }

    pub fn with_descriptions(mut self, short: impl Into<String>, long: impl Into<String>) -> Self {
        self.short_description = short.into();
        self.description = long.into();
        self
    }
}

/// Shared handle to a catalog policy.
pub type PolicyRef = Arc<Policy>;

/// Where a policy stands for the current player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PolicyStatus {
    pub adopted: bool,
    pub affordable: bool,
    /// Prerequisites or exclusions are not satisfied.
    pub restricted: bool,
    /// Not yet available at all.
    pub locked: bool,
}

/// A request to adopt or revoke a policy in a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyCommand {
    pub policy_name: String,
    pub category: String,
    /// `false` revokes.
    pub adopt: bool,
    /// Slot index within `category`.
    pub category_slot: usize,
}

/// Every policy in the game.
pub trait PolicyCatalog: Send + Sync {
    fn policies(&self) -> Vec<PolicyRef>;

    fn policy(&self, name: &str) -> Option<PolicyRef> {
        self.policies().into_iter().find(|p| p.name == name)
    }

    /// Category names, sorted and without duplicates.
    fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> =
            self.policies().iter().map(|p| p.category.clone()).collect();
        categories.sort();
        categories.dedup();
        categories
    }
}

/// Answers eligibility questions for the current player.
pub trait EligibilityOracle: Send + Sync {
    fn is_adopted(&self, policy: &str) -> bool;
    fn is_affordable(&self, policy: &str) -> bool;
    fn is_restricted(&self, policy: &str) -> bool;
    fn is_locked(&self, policy: &str) -> bool;

    fn status(&self, policy: &str) -> PolicyStatus {
        PolicyStatus {
            adopted: self.is_adopted(policy),
            affordable: self.is_affordable(policy),
            restricted: self.is_restricted(policy),
            locked: self.is_locked(policy),
        }
    }
}

/// Receives adopt/revoke requests.
pub trait CommandSink: Send + Sync {
    fn issue(&self, command: PolicyCommand);
}

/// The player's policy slots.
pub trait SlotInventory: Send + Sync {
    /// Slot count per category. Counts may be negative; treat those as 0.
    fn total_slots(&self) -> BTreeMap<String, i32>;

    /// Category -> category slot -> adopted policy name.
    fn adopted(&self) -> BTreeMap<String, BTreeMap<usize, String>>;
}

/// The domain services a government screen works against.
pub struct GovernmentContext {
    pub catalog: Arc<dyn PolicyCatalog>,
    pub oracle: Arc<dyn EligibilityOracle>,
    pub commands: Arc<dyn CommandSink>,
    pub slots: Arc<dyn SlotInventory>,

    /// Fired by the owner whenever adopted policies or slots change.
    pub policies_changed: Signal<()>,
}

impl GovernmentContext {
    pub fn new(
        catalog: Arc<dyn PolicyCatalog>,
        oracle: Arc<dyn EligibilityOracle>,
        commands: Arc<dyn CommandSink>,
        slots: Arc<dyn SlotInventory>,
    ) -> Self {
        Self {
            catalog,
            oracle,
            commands,
            slots,
            policies_changed: Signal::new(),
        }
    }

    /// Build a context whose four services are all `service`.
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: PolicyCatalog + EligibilityOracle + CommandSink + SlotInventory + 'static,
    {
        Self::new(service.clone(), service.clone(), service.clone(), service)
    }

    pub fn status(&self, policy: &str) -> PolicyStatus {
        self.oracle.status(policy)
    }

    /// Every `(category_slot, category)` pair, in category order, as laid
    /// out by the main panel.
    pub fn concatenated_category_slots(&self) -> Vec<(usize, String)> {
        self.slots
            .total_slots()
            .into_iter()
            .flat_map(|(category, count)| {
                (0..count.max(0) as usize).map(move |n| (n, category.clone()))
            })
            .collect()
    }
}

impl std::fmt::Debug for GovernmentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernmentContext")
            .field("policies_changed", &self.policies_changed)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(GovernmentContext: Send, Sync);
