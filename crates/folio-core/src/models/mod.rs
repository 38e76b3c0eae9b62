//! Data models for Folio
//!
//! Upload tracking, galleries, content records, sessions and operation statuses.

mod gallery;
mod project;
mod session;
mod status;
mod upload;

pub use gallery::*;
pub use project::*;
pub use session::*;
pub use status::*;
pub use upload::*;
