pub mod constant;
pub mod manifest;
pub mod run;
