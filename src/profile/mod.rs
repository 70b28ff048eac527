//! User-profile data model: configuration, attribute groups and display text.

pub mod config;
pub mod display_text;
pub mod group;

pub use config::UserProfileConfig;
pub use display_text::DisplayText;
pub use group::{AttributeGroup, DESCRIPTION_KEY_PREFIX, HEADER_KEY_PREFIX};
