//! Bundle file trees and signal extraction
//!
//! A bundle is an extracted modpack or server-pack directory. [`FileTree`] gives
//! an immutable, ordered view over it and [`BundleInspector`] turns that view into
//! the raw [`BundleSignals`] the loader resolver works from.

pub mod inspector;
pub mod manifest;
pub mod tree;

pub use inspector::{BundleInspector, BundleSignals};
pub use manifest::{MinecraftSection, ModLoaderEntry, PackManifest};
pub use tree::{FileTree, ScanConfig};
