//! Command pipeline
//!
//! Turns player input into replicated commands:
//! InputAction -> InputResolver -> Command -> CommandExecutor (local) -> Transport -> peer

pub mod executor;
pub mod protocol;
pub mod resolver;
pub mod session;
pub mod transport;

pub use executor::{ApplyOutcome, CommandExecutor};
pub use protocol::{Command, CommandRecord};
pub use resolver::{InputAction, InputResolver, Intent};
pub use session::{FrameInput, Session};
pub use transport::{pump, NullTransport, QueueTransport, Transport};
