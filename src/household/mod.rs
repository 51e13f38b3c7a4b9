//! Household-sector Jacobians: storage, validation and the splurge adjustment.
pub mod splurge;
pub mod store;

pub use splurge::{apply_splurge, splurge_adjust, DEFAULT_SHARE, SPLURGE_INPUTS};
pub use store::{EducGroup, HouseholdJacobians, InputJacobians, RealizedUi};
