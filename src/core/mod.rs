pub mod config;
pub mod error;
pub mod types;

pub use config::{MatchConfig, RetaliationRule, Seat};
pub use error::{Result, TacticsError};
pub use types::{Player, TileKindId, UnitId, UnitKindId};
