//! Thin re-export of the shared status view (`boxedin_core::status`) —
//! the CLI `status` command and the HTTP `/api/status` route serve the
//! same shape, spec.md §6.

pub use boxedin_core::status::{snapshot as build, StatusSnapshot};
