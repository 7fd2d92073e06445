//! Domain logic - pure release rules independent of forge and file access

pub mod platform;
pub mod release_letter;
pub mod user_input;
pub mod version;

pub use platform::PlatformName;
pub use release_letter::{ReleaseLetter, ReleaseLetterBuilder};
pub use user_input::{Goal, UserInput, UserInputBuilder};
pub use version::{ReleaseHistory, Version, VersionBump};
