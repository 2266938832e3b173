/// Audit domain - dependency resolution, risk classification and ignore-file rules
///
/// Pure logic with no I/O; infrastructure is reached only through ports.
pub mod domain;
pub mod services;
