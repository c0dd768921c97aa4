//! Artifact persistence - one file per iteration, never overwritten

pub mod store;

pub use store::{ArtifactStore, FileArtifactStore};
