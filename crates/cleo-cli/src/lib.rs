//! Cleo command-line front end: import, report, validate.

pub mod commands;
pub mod validate;
