//! Data models for Encrypto

mod folder;
mod user;

pub use folder::*;
pub use user::*;
