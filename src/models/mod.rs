//! Data models for the playground core.
//!
//! This module contains the configuration structures shared by every layer:
//! - [`ConfigModel`]: the canonical playground state (tool versions, editor
//!   documents, parse settings, detail view)
//! - [`ConfigPatch`]: a partial overlay where absent fields mean "keep the
//!   current value", the common currency of URL decoding, stored-state
//!   loading, and UI mutations
//! - [`FileType`], [`SourceType`], [`AstView`]: token enums with lenient
//!   parsers matching the historical URL grammar
//!
//! # Architecture Note
//!
//! The models are designed to be:
//! - **Serializable**: `ConfigModel` derives `Serialize`/`Deserialize` with
//!   the wire field names (`fileType`, `sourceType`, `showAST`)
//! - **Cloneable**: the model is wrapped in `Arc<RwLock<>>` by
//!   [`StateStore`](crate::state::StateStore) for thread-safe access
//! - **Immutable in place**: mutations go through `StateStore::update()` as
//!   patches so every change is diffed, broadcast, and republished

pub mod config;

pub use config::{AstView, ConfigModel, ConfigPatch, FileType, SourceType};
pub use config::{
    DEFAULT_CODE, DEFAULT_ESLINTRC, DEFAULT_TSCONFIG, DEFAULT_TSE_VERSION, DEFAULT_TS_VERSION,
};
