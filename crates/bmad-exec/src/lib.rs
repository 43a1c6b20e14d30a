pub mod api;
pub mod error;
pub mod pipeline;
pub mod responses;
pub mod runtime;

pub use api::*;
pub use error::*;
pub use pipeline::*;
pub use responses::*;
pub use runtime::*;
