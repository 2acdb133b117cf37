//! Data models

mod act;
mod invoice;
mod organization;
mod quote;
mod user;

pub use act::*;
pub use invoice::*;
pub use organization::*;
pub use quote::*;
pub use user::*;
