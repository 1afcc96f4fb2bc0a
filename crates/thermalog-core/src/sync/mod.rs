//! Device-to-device synchronization.
//!
//! Two message classes flow between the primary device and the
//! companion wearable: durable at-least-once session-creation events,
//! and best-effort replace-semantics context snapshots.

pub mod coordinator;
pub mod outbox;
pub mod types;

pub use coordinator::{Mailbox, NullTransport, SyncCoordinator, SyncTransport};
pub use outbox::Outbox;
pub use types::{
    ConnectivityState, ContextSnapshot, SessionEnvelope, SyncError, SyncMessage,
};
