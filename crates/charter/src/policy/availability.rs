//! Availability filters for the policy palette.

use charter_core::logging::targets;

use super::domain::PolicyStatus;
use crate::config::AvailabilityDefaults;

/// One of the palette's availability filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Availability {
    Adopted = 0,
    Adoptable = 1,
    Unaffordable = 2,
    Restricted = 3,
    Locked = 4,
}

impl Availability {
    pub const COUNT: usize = 5;

    pub const ALL: [Availability; Self::COUNT] = [
        Availability::Adopted,
        Availability::Adoptable,
        Availability::Unaffordable,
        Availability::Restricted,
        Availability::Locked,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Label for the filter's toggle button.
    pub fn label(self) -> &'static str {
        match self {
            Availability::Adopted => "Adopted",
            Availability::Adoptable => "Adoptable",
            Availability::Unaffordable => "Unaffordable",
            Availability::Restricted => "Restricted",
            Availability::Locked => "Locked",
        }
    }
}

/// Which availabilities the palette currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityManager {
    shown: [bool; Availability::COUNT],
}

impl Default for AvailabilityManager {
    fn default() -> Self {
        Self::from(AvailabilityDefaults::default())
    }
}

impl From<AvailabilityDefaults> for AvailabilityManager {
    fn from(defaults: AvailabilityDefaults) -> Self {
        Self::new(
            defaults.adopted,
            defaults.adoptable,
            defaults.unaffordable,
            defaults.restricted,
            defaults.locked,
        )
    }
}

impl AvailabilityManager {
    pub fn new(
        adopted: bool,
        adoptable: bool,
        unaffordable: bool,
        restricted: bool,
        locked: bool,
    ) -> Self {
        Self {
            shown: [adopted, adoptable, unaffordable, restricted, locked],
        }
    }

    pub fn flags(&self) -> [bool; Availability::COUNT] {
        self.shown
    }

    pub fn get(&self, availability: Availability) -> bool {
        self.shown[availability.index()]
    }

    pub fn set(&mut self, availability: Availability, shown: bool) {
        self.shown[availability.index()] = shown;
    }

    pub fn toggle(&mut self, availability: Availability) {
        self.set(availability, !self.get(availability));
    }

    /// Set a filter by raw index. Indices past the last filter are logged and
    /// ignored.
    pub fn set_by_index(&mut self, index: usize, shown: bool) {
        match Availability::from_index(index) {
            Some(availability) => self.set(availability, shown),
            None => tracing::error!(
                target: targets::POLICY,
                index,
                "AvailabilityManager::set_by_index passed invalid availability"
            ),
        }
    }

    /// Whether a policy with `status` passes the filters.
    ///
    /// The first matching rule wins. Adopted policies are shown only by the
    /// adopted filter; locked ones only by the locked filter (unless
    /// adopted); restricted ones only by the restricted filter.
    pub fn is_displayed(&self, status: PolicyStatus) -> bool {
        let [
            show_adopted,
            show_adoptable,
            show_unaffordable,
            show_restricted,
            show_locked,
        ] = self.shown;
        let PolicyStatus {
            adopted,
            affordable,
            restricted,
            locked,
        } = status;

        if adopted && show_adopted {
            return true;
        }
        if show_locked && locked && !adopted {
            return true;
        }
        if show_unaffordable && !affordable && !adopted && !restricted && !locked {
            return true;
        }
        if show_restricted && restricted && !adopted && !locked {
            return true;
        }
        if show_adoptable && !adopted && affordable && !restricted && !locked {
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(adopted: bool, affordable: bool, restricted: bool, locked: bool) -> PolicyStatus {
        PolicyStatus {
            adopted,
            affordable,
            restricted,
            locked,
        }
    }

    fn only(availability: Availability) -> AvailabilityManager {
        let mut manager = AvailabilityManager::new(false, false, false, false, false);
        manager.set(availability, true);
        manager
    }

    #[test]
    fn test_default_shows_adopted_and_adoptable() {
        let manager = AvailabilityManager::default();
        assert_eq!(manager.flags(), [true, true, false, false, false]);
        assert!(manager.is_displayed(status(true, true, false, false)));
        assert!(manager.is_displayed(status(false, true, false, false)));
        assert!(!manager.is_displayed(status(false, false, false, false)));
        assert!(!manager.is_displayed(status(false, true, true, false)));
        assert!(!manager.is_displayed(status(false, true, false, true)));
    }

    #[test]
    fn test_locked_filter_ignores_adopted() {
        let manager = only(Availability::Locked);
        assert!(manager.is_displayed(status(false, true, false, true)));
        assert!(manager.is_displayed(status(false, false, true, true)));
        assert!(!manager.is_displayed(status(true, true, false, true)));
    }

    #[test]
    fn test_unaffordable_excludes_restricted_and_locked() {
        let manager = only(Availability::Unaffordable);
        assert!(manager.is_displayed(status(false, false, false, false)));
        assert!(!manager.is_displayed(status(false, false, true, false)));
        assert!(!manager.is_displayed(status(false, false, false, true)));
        assert!(!manager.is_displayed(status(true, false, false, false)));
    }

    #[test]
    fn test_restricted_filter_ignores_affordability() {
        let manager = only(Availability::Restricted);
        assert!(manager.is_displayed(status(false, true, true, false)));
        assert!(manager.is_displayed(status(false, false, true, false)));
        assert!(!manager.is_displayed(status(false, false, true, true)));
    }

    #[test]
    fn test_adopted_filter_alone() {
        let manager = only(Availability::Adopted);
        assert!(manager.is_displayed(status(true, false, true, true)));
        assert!(!manager.is_displayed(status(false, true, false, false)));
    }

    #[test]
    fn test_all_filters_off_hides_everything() {
        let manager = AvailabilityManager::new(false, false, false, false, false);
        for bits in 0..16u8 {
            let s = status(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0);
            assert!(!manager.is_displayed(s));
        }
    }

    #[test]
    fn test_toggle_and_invalid_index() {
        let mut manager = AvailabilityManager::default();
        manager.toggle(Availability::Locked);
        assert!(manager.get(Availability::Locked));
        manager.toggle(Availability::Locked);
        assert!(!manager.get(Availability::Locked));

        let before = manager.flags();
        manager.set_by_index(5, true);
        assert_eq!(manager.flags(), before);
        manager.set_by_index(3, true);
        assert!(manager.get(Availability::Restricted));
    }
}
