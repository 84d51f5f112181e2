//! Small, side-effect free helpers shared by the SRI core and the CLI.

pub mod hash;
pub mod html;
pub mod path;
pub mod plural;
