//! AI Baby library exports for testing

pub mod api;
pub mod core;
pub mod tui;

#[cfg(test)]
mod test_support;
