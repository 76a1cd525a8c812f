//! # Dragndrop Editor
//!
//! Bidirectional sync between a source file and the live canvas.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: source text → Document Tree + spans │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ vdom: diff, visual patcher, live adapter    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: sync sessions                       │
//! │  - Dialect registry and formatter           │
//! │  - Text strategies (HTML, JSX/TSX, Vue)     │
//! │  - Source writer with backups               │
//! │  - Debounced, loop-free sync cycles         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Minimal edits**: both directions apply a diff, never a full rewrite
//! 2. **Untouched bytes stay untouched**: text strategies only rewrite what changed
//! 3. **No feedback loops**: after a cycle both trees are equal, so the echo diffs empty
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dragndrop_editor::{Document, SyncEnvironment, SyncSession};
//! use dragndrop_vdom::HeadlessDom;
//!
//! let env = Arc::new(SyncEnvironment::default());
//! let document = Document::load("src/index.html", &env.registry).await?;
//! let live = Arc::new(Mutex::new(HeadlessDom::new()));
//! let (handle, mut events) = SyncSession::open(document, live, env).await?;
//!
//! // the canvas was edited
//! handle.on_visual_changed()?;
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! ```

mod debounce;
mod dialect;
mod document;
mod errors;
mod formatter;
mod jsx_ast;
mod metrics;
mod pipeline;
mod session;
mod text_patch;
mod vue;
mod writer;

pub use debounce::{Debouncer, Direction, Ready, DEFAULT_DEBOUNCE};
pub use dialect::{
    DialectRegistry, DialectSyntax, FormatOptions, HtmlSyntax, JsxSyntax, QuoteStyle, VueSyntax,
};
pub use document::Document;
pub use errors::SyncError;
pub use formatter::{format_checked, FormatError, Formatter, MarkupFormatter};
pub use jsx_ast::{
    patch_jsx, JsxAttribute, JsxChild, JsxElement, JsxModule, JsxModuleParser, ScriptParser,
    ScriptProgram,
};
pub use metrics::{SyncMetrics, DEFAULT_LATENCY_BUDGET};
pub use pipeline::{patch_source, PatchOutput, Pipeline};
pub use session::{
    SessionSnapshot, SyncEnvironment, SyncEvent, SyncEvents, SyncHandle, SyncSession, SyncState,
};
pub use text_patch::{apply_edits, patch_text, text_edits, TextEdit};
pub use vue::{patch_vue, VuePatch};
pub use writer::{backup_path, SourceWriter, WriteError, WriteOptions};
