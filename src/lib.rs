//! Library entry point for the mailsift CLI.

pub mod clipboard;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod input;
pub mod model;
pub mod pattern;
pub mod scanners;
pub mod session;
pub mod utils;
