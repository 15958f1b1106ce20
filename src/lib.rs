//! Library for commit-id
//!
//! Reads commit metadata from a git checkout and writes the generated
//! `commit.h` header and its depfile. The binary is a thin wrapper around
//! [`app::CommitIdApp`].

pub mod app;
pub mod config;
pub mod emit;
pub mod git;
pub mod metadata;
pub mod provider;
pub mod refs;
