//! Membrane construction and checking
//!
//! The membrane of a definition is the set of controllers that implement
//! its external interfaces (besides its own sources) and, for composites,
//! the internal interfaces its sub-components bind to.
//!
//! - [`CompositeInternalInterfaceLoader`]: gives each delegated external
//!   interface of a composite a role-flipped internal twin and an
//!   interface delegator controller
//! - [`MembraneCheckerLoader`]: checks controller consistency and that
//!   every external interface is implemented

mod checker;
pub mod controllers;
mod internal;

pub use checker::MembraneCheckerLoader;
pub use controllers::add_controller_interface;
pub use internal::CompositeInternalInterfaceLoader;
