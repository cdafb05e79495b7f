//! Question entities and generation-side choice handling.

pub mod entities;
pub mod sanitize;
