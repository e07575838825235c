//! Bridge coordinator.
//!
//! The single writer of the withdrawal ledger. Exposes the mutating bridge
//! operations (request, advance, finalize, bond deposit/withdraw) and the
//! read-only queries clients build their views from, and keeps the ledger,
//! the bond registry and custody consistent with each other.

pub mod bridge;
pub mod error;
pub mod snapshot;

pub use bridge::{Advance, BridgeCoordinator, Finalization};
pub use error::{BridgeError, ErrorKind};
pub use snapshot::{BridgeSnapshot, SnapshotError};

pub type Result<T, E = BridgeError> = std::result::Result<T, E>;
