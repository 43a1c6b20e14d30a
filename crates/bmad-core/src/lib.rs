pub mod actions;
pub mod config;
pub mod entitlement;
pub mod error;
pub mod files;
pub mod gate;
pub mod panels;
pub mod persistence;
pub mod reducer;
pub mod session;
pub mod state;
pub mod tier;

pub use actions::*;
pub use entitlement::*;
pub use error::*;
pub use gate::*;
pub use panels::*;
pub use reducer::*;
pub use session::*;
pub use state::*;
pub use tier::*;

pub use persistence::*;
