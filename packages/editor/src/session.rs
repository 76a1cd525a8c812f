//! # Sync Session
//!
//! Keeps one document's source text and the live canvas consistent.
//!
//! Each session is a tokio task owning all sync state. Handles send change
//! notifications over a channel and never block; the task debounces them
//! and runs one cycle at a time:
//!
//! ```text
//!   on_source_changed ─┐                     ┌→ ToVisual: parse → diff → patch canvas
//!                      ├→ Debouncer → Idle ──┤
//!   on_visual_changed ─┘                     └→ ToCode: adapt → diff → patch text → write
//! ```
//!
//! After every completed cycle the last synced source tree and visual tree
//! are equal, which is what makes the opposite direction's next diff empty.

use crate::debounce::{Debouncer, Direction, Ready, DEFAULT_DEBOUNCE};
use crate::dialect::{DialectRegistry, FormatOptions};
use crate::document::Document;
use crate::formatter::{Formatter, MarkupFormatter};
use crate::jsx_ast::{JsxModuleParser, ScriptParser};
use crate::metrics::{SyncMetrics, DEFAULT_LATENCY_BUDGET};
use crate::pipeline::Pipeline;
use crate::writer::{SourceWriter, WriteError, WriteOptions};
use crate::SyncError;
use dragndrop_parser::{parse, split_sections, Dialect, Node};
use dragndrop_vdom::{
    diff, patch_visual, render_full, Adapter, ArtifactFilter, DiffError, EditOperation, LiveTreeMut,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncState {
    #[default]
    Idle,
    ToVisual,
    ToCode,
}

impl From<Direction> for SyncState {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::ToVisual => SyncState::ToVisual,
            Direction::ToCode => SyncState::ToCode,
        }
    }
}

#[derive(Debug)]
pub enum SyncEvent {
    /// The canvas was patched to the new source tree
    VisualUpdated { operations: Vec<EditOperation> },
    /// The source text was patched to the canvas tree
    CodeUpdated {
        text: String,
        operations: Vec<EditOperation>,
    },
    CycleAborted {
        direction: Direction,
        error: SyncError,
    },
    /// The canvas is kept; the file on disk is stale
    WriteFailed { path: PathBuf, error: WriteError },
    /// Source and visual trees still differ after a cycle
    EngineFault { error: DiffError },
}

/// Read-only configuration shared by every session
pub struct SyncEnvironment {
    pub registry: DialectRegistry,
    pub formatter: Arc<dyn Formatter>,
    pub writer: Arc<SourceWriter>,
    pub scripts: Arc<dyn ScriptParser>,
    pub format: FormatOptions,
    pub filter: ArtifactFilter,
    pub write: WriteOptions,
    pub debounce: Duration,
    pub latency_budget: Duration,
}

impl SyncEnvironment {
    pub fn new(format: FormatOptions) -> Self {
        let registry = DialectRegistry::with_defaults();
        let formatter: Arc<dyn Formatter> = Arc::new(MarkupFormatter);
        let writer = Arc::new(SourceWriter::new(
            registry.clone(),
            Arc::clone(&formatter),
            format.clone(),
        ));
        Self {
            registry,
            formatter,
            writer,
            scripts: Arc::new(JsxModuleParser),
            format,
            filter: ArtifactFilter::default(),
            write: WriteOptions::default(),
            debounce: DEFAULT_DEBOUNCE,
            latency_budget: DEFAULT_LATENCY_BUDGET,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_latency_budget(mut self, budget: Duration) -> Self {
        self.latency_budget = budget;
        self
    }

    pub fn with_filter(mut self, filter: ArtifactFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_write_options(mut self, write: WriteOptions) -> Self {
        self.write = write;
        self
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_scripts(mut self, scripts: Arc<dyn ScriptParser>) -> Self {
        self.scripts = scripts;
        self
    }
}

impl Default for SyncEnvironment {
    fn default() -> Self {
        Self::new(FormatOptions::default())
    }
}

impl std::fmt::Debug for SyncEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEnvironment")
            .field("registry", &self.registry)
            .field("format", &self.format)
            .field("write", &self.write)
            .field("debounce", &self.debounce)
            .field("latency_budget", &self.latency_budget)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SyncState,
    pub source_text: String,
    pub source_tree: Node,
    pub visual_tree: Node,
    pub metrics: SyncMetrics,
}

enum Command {
    SourceChanged(String),
    VisualChanged,
    Flush(oneshot::Sender<()>),
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Close,
}

/// Cheap, cloneable handle to a running session
#[derive(Clone)]
pub struct SyncHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<SyncState>,
}

impl SyncHandle {
    /// The source text was edited
    pub fn on_source_changed(&self, text: impl Into<String>) -> Result<(), SyncError> {
        self.send(Command::SourceChanged(text.into()))
    }

    /// The live canvas was edited
    pub fn on_visual_changed(&self) -> Result<(), SyncError> {
        self.send(Command::VisualChanged)
    }

    /// Run pending debounced work now; resolves once the session is idle
    pub async fn flush(&self) -> Result<(), SyncError> {
        let (reply, done) = oneshot::channel();
        self.send(Command::Flush(reply))?;
        done.await.map_err(|_| SyncError::SessionClosed)
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SyncError> {
        let (reply, snapshot) = oneshot::channel();
        self.send(Command::Snapshot(reply))?;
        snapshot.await.map_err(|_| SyncError::SessionClosed)
    }

    pub fn close(&self) {
        let _ = self.commands.send(Command::Close);
    }

    pub fn state(&self) -> SyncState {
        *self.state.borrow()
    }

    /// Watch state transitions
    pub fn subscribe_state(&self) -> watch::Receiver<SyncState> {
        self.state.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    fn send(&self, command: Command) -> Result<(), SyncError> {
        self.commands
            .send(command)
            .map_err(|_| SyncError::SessionClosed)
    }
}

impl std::fmt::Debug for SyncHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncHandle")
            .field("state", &self.state())
            .finish()
    }
}

/// Events emitted by a session; ends when the session closes
#[derive(Debug)]
pub struct SyncEvents {
    events: mpsc::UnboundedReceiver<SyncEvent>,
}

impl SyncEvents {
    pub async fn recv(&mut self) -> Option<SyncEvent> {
        self.events.recv().await
    }

    pub fn try_recv(&mut self) -> Option<SyncEvent> {
        self.events.try_recv().ok()
    }

    /// Events already emitted
    pub fn drain(&mut self) -> Vec<SyncEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

pub struct SyncSession<L> {
    document: Document,
    live: Arc<Mutex<L>>,
    env: Arc<SyncEnvironment>,
    adapter: Adapter,
    debouncer: Debouncer,
    source_tree: Node,
    visual_tree: Node,
    /// Template section text of a sectioned document at the last sync
    template: Option<String>,
    metrics: SyncMetrics,
    state: watch::Sender<SyncState>,
    events: mpsc::UnboundedSender<SyncEvent>,
}

impl<L> SyncSession<L>
where
    L: LiveTreeMut + Send + 'static,
{
    /// Parse the document, render it into `live` and start the session task
    pub async fn open(
        document: Document,
        live: Arc<Mutex<L>>,
        env: Arc<SyncEnvironment>,
    ) -> Result<(SyncHandle, SyncEvents), SyncError> {
        let tree = parse(&document.source, document.dialect)?;
        render_full(&mut *live.lock().await, &env.filter, &tree)?;

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SyncState::Idle);

        let session = Self {
            template: template_text(document.dialect, &document.source),
            adapter: Adapter::new(env.filter.clone(), document.dialect.flavor()),
            debouncer: Debouncer::new(env.debounce),
            source_tree: tree.clone(),
            visual_tree: tree,
            metrics: SyncMetrics::default(),
            state: state_tx,
            events: events_tx,
            document,
            live,
            env,
        };
        debug!(dialect = %session.document.dialect, path = ?session.document.path, "Opened sync session");
        tokio::spawn(session.run(commands_rx));

        Ok((
            SyncHandle {
                commands: commands_tx,
                state: state_rx,
            },
            SyncEvents { events: events_rx },
        ))
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            let deadline = self.debouncer.next_deadline();
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::SourceChanged(text)) => self.debouncer.push_source(text, Instant::now()),
                    Some(Command::VisualChanged) => self.debouncer.push_visual(Instant::now()),
                    Some(Command::Flush(reply)) => {
                        for ready in self.debouncer.drain() {
                            self.cycle(ready).await;
                        }
                        let _ = reply.send(());
                    }
                    Some(Command::Snapshot(reply)) => {
                        let _ = reply.send(self.snapshot());
                    }
                    Some(Command::Close) | None => break,
                },
                _ = sleep_until(deadline) => {
                    while let Some(ready) = self.debouncer.take_ready(Instant::now()) {
                        self.cycle(ready).await;
                    }
                }
            }
        }
        debug!(path = ?self.document.path, "Closed sync session");
    }

    async fn cycle(&mut self, ready: Ready) {
        let direction = ready.direction();
        let started = Instant::now();
        self.state.send_replace(direction.into());

        let result = match ready {
            Ready::Source(text) => self.to_visual(text).await,
            Ready::Visual => self.to_code().await,
        };
        match result {
            Ok(true) => {
                self.metrics
                    .record_cycle(direction, started.elapsed(), self.env.latency_budget);
            }
            Ok(false) => {}
            Err(error) => {
                warn!(%direction, %error, "Sync cycle aborted");
                self.metrics.record_abort();
                self.emit(SyncEvent::CycleAborted { direction, error });
            }
        }
        self.state.send_replace(SyncState::Idle);
    }

    /// Returns whether a cycle ran
    #[instrument(skip_all, fields(dialect = %self.document.dialect))]
    async fn to_visual(&mut self, text: String) -> Result<bool, SyncError> {
        if text == self.document.source {
            debug!("Skipping echo of synced source");
            self.metrics.record_echo();
            return Ok(false);
        }

        let template = template_text(self.document.dialect, &text);
        if template.is_some() && template == self.template {
            debug!("Template unchanged, refreshing section text only");
            self.document.source = text;
            return Ok(false);
        }

        let tree = parse(&text, self.document.dialect)?;
        let operations = diff(&self.visual_tree, &tree);

        if !operations.is_empty() {
            let mut live = self.live.lock().await;
            if let Err(error) = patch_visual(&mut *live, &self.env.filter, &self.visual_tree, &operations) {
                warn!(%error, "Visual patch failed, re-rendering canvas");
                render_full(&mut *live, &self.env.filter, &tree)?;
            }
        }

        debug!(operations = operations.len(), "Synced source to canvas");
        self.document.source = text;
        self.template = template;
        self.source_tree = tree.clone();
        self.visual_tree = tree;
        self.emit(SyncEvent::VisualUpdated { operations });
        Ok(true)
    }

    #[instrument(skip_all, fields(dialect = %self.document.dialect))]
    async fn to_code(&mut self) -> Result<bool, SyncError> {
        let adapted = {
            let live = self.live.lock().await;
            self.adapter.adapt(&*live)
        };
        let operations = diff(&self.source_tree, &adapted);
        if operations.is_empty() {
            debug!("Canvas matches source, nothing to write");
            self.visual_tree = adapted;
            return Ok(false);
        }

        let text = Pipeline {
            dialect: self.document.dialect,
            options: &self.env.format,
            scripts: self.env.scripts.as_ref(),
            formatter: self.env.write.format.then_some(self.env.formatter.as_ref()),
        }
        .run(&self.document.source, &operations)?
        .text;

        if let Some(path) = self.document.path.clone() {
            if let Err(error) = self.env.writer.write_text(&path, &text, self.env.write).await {
                warn!(%error, path = %path.display(), "Write failed, keeping canvas");
                self.visual_tree = adapted;
                self.emit(SyncEvent::WriteFailed { path, error });
                return Ok(true);
            }
        }

        let written = parse(&text, self.document.dialect)?;
        let remaining = diff(&written, &adapted);
        if !remaining.is_empty() {
            let error = DiffError::Diverged {
                operations: remaining.len(),
            };
            warn!(%error, "Patched source does not match canvas");
            self.emit(SyncEvent::EngineFault { error });
        }

        debug!(operations = operations.len(), bytes = text.len(), "Synced canvas to source");
        self.template = template_text(self.document.dialect, &text);
        self.document.source = text.clone();
        self.source_tree = written;
        self.visual_tree = adapted;
        self.emit(SyncEvent::CodeUpdated { text, operations });
        Ok(true)
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: *self.state.borrow(),
            source_text: self.document.source.clone(),
            source_tree: self.source_tree.clone(),
            visual_tree: self.visual_tree.clone(),
            metrics: self.metrics.clone(),
        }
    }

    fn emit(&self, event: SyncEvent) {
        // nobody listening is fine
        let _ = self.events.send(event);
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Template section text of a sectioned document
fn template_text(dialect: Dialect, text: &str) -> Option<String> {
    if !dialect.is_sectioned() {
        return None;
    }
    let sections = split_sections(text).ok()?;
    Some(
        sections
            .template
            .map(|template| template.text(text).to_string())
            .unwrap_or_default(),
    )
}
