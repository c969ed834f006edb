//! Auth-domain credential pair and token models.

pub mod credential;
pub mod token;

pub use credential::*;
pub use token::*;
