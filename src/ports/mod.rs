/// Ports module defining interfaces for hexagonal architecture
///
/// Outbound ports are the driven interfaces the application core uses
/// to reach infrastructure.
pub mod outbound;
