//! Government policy screens.
//!
//! The screens are views over a [`GovernmentContext`]. They never change
//! policies themselves; every adoption or revocation goes out as a
//! [`PolicyCommand`] and the views are rebuilt from the domain afterwards.
//!
//! - [`PolicyControl`]: one draggable policy card
//! - [`PolicySlotControl`]: a slot holding at most one adopted policy
//! - [`PoliciesListBox`] and [`PolicyPalette`]: the filtered catalog
//! - [`MainPanel`]: every slot the government has
//! - [`GovernmentWnd`]: palette and slots together, with drag and drop
//!
//! [`InMemoryGovernment`] implements the domain services for headless use.

pub mod availability;
pub mod control;
pub mod domain;
pub mod government;
pub mod list_box;
pub mod main_panel;
pub mod memory;
pub mod palette;
pub mod slot;

pub use availability::{Availability, AvailabilityManager};
pub use control::{POLICY_CONTROL_DROP_TYPE, PolicyBrowseInfo, PolicyControl};
pub use domain::{
    CommandSink, EligibilityOracle, GovernmentContext, Policy, PolicyCatalog, PolicyCommand,
    PolicyRef, PolicyStatus, SlotInventory,
};
pub use government::{DragOrigin, DropZone, GovernmentRequest, GovernmentWnd};
pub use list_box::{ALL_FILTERS_BLOCKING_PROMPT, PoliciesListBox};
pub use main_panel::{MainPanel, PanelRequest};
pub use memory::InMemoryGovernment;
pub use palette::{PaletteRequest, PolicyPalette};
pub use slot::PolicySlotControl;
