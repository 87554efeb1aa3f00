//! Criteria and terminators: the two unit types of query modification.
//!
//! # Criteria vs terminators
//!
//! - A **criteria** is a pure transform: model handle in, modified handle
//!   out. Registered criteria are replayed in order on every read/write.
//! - A **terminator** both transforms and *executes*: it returns concrete
//!   data instead of a handle, is applied one-off, and bypasses the
//!   registered pipeline entirely.
//!
//! Both are constructed fresh per application by the [`CriteriaFactory`] from
//! an identifier plus constructor arguments, so the only state they carry is
//! what those arguments captured.

mod basic_criteria;
mod criteria;
mod factory;
mod terminator;

pub use basic_criteria::*;
pub use criteria::*;
pub use factory::*;
pub use terminator::*;
