//! Configuration for the nupack provider.
//!
//! Configuration is read once per operation into a [`Settings`] snapshot
//! and passed explicitly through every component; nothing below this
//! crate consults the environment or the filesystem for settings.

pub mod error;
mod settings;
mod source;

pub use error::{ConfigError, Result};
pub use settings::Settings;
pub use source::{PackageSource, ProtocolVersion, SourceRegistry};
