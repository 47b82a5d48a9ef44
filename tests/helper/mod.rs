//! Shared integration test utilities

#![allow(dead_code)]

mod workspace;

pub use workspace::*;
