//! # Document Tree diffing and patching
//!
//! ```text
//!             diff(old, new)
//!   Node ─────────────────────▶ [EditOperation]
//!                                    │
//!            ┌───────────────────────┼────────────────────────┐
//!            ▼                       ▼                        ▼
//!     apply(&mut Node)     VisualPatcher (live)     text / AST patchers
//!                                                   (dragndrop-editor)
//! ```
//!
//! The live canvas is read back with the [`Adapter`], which yields the same
//! tree shape as the markup parser.

pub mod adapter;
pub mod apply;
pub mod differ;
pub mod error;
pub mod live;
pub mod operations;
pub mod visual;

pub use adapter::{adapt, Adapter, ArtifactFilter};
pub use apply::{apply, PatchTarget};
pub use differ::diff;
pub use error::{DiffError, PatchError};
pub use live::{HeadlessDom, LiveKind, LiveTree, LiveTreeMut, NodeId};
pub use operations::{AttributeDelta, EditOperation, NodePath};
pub use visual::{patch_visual, render_full, significant_children, VisualPatcher};
