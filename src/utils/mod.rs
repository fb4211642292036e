pub mod comments;
pub mod config;
pub mod error;
pub mod fs;
pub mod locate;
pub mod logger;
pub mod path;
pub mod semver;
pub mod spinner;
