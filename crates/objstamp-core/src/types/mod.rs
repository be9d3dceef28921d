//! Core types for Objstamp

mod notification;
mod object;

pub use notification::*;
pub use object::*;
