//! Command implementations for glone.

pub mod clone;
pub mod factory;

#[cfg(test)]
pub mod test_helpers;
