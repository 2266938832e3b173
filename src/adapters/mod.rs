/// Adapters layer - Infrastructure implementations
///
/// This layer contains concrete implementations of the outbound ports,
/// providing the actual integration with the file system, registries
/// and the terminal.
pub mod outbound;
