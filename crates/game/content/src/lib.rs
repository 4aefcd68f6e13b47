//! Data-driven tower content and its loaders.
//!
//! This crate reads the files a host needs before it can run towers:
//! - Tower configuration (TOML)
//! - Effect definitions (RON)
//! - The prefab catalog (RON)
//!
//! All loaders deserialize tower-core types directly with serde.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, EffectLoader, LoadResult, PrefabLoader};
