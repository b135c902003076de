//! Shared helpers used by the binary, the examples and the tests.

/// Console logger setup on top of `simplelog`.
pub mod logging;
