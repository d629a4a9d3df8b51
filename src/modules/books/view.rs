//! The book list view: state, the one-shot catalog load, and rendering.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use bookstore_kernel::settings::CatalogSettings;
use tokio::task::JoinHandle;

use super::models::{sanitize, Book};
use super::render::{RenderError, Renderer};
use super::source::{BookSource, FetchFailure, HttpBookSource};

/// Everything the view renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    books: Vec<Book>,
}

impl ViewState {
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

/// How the catalog load started by [`BookListView::mount`] ended.
#[derive(Debug)]
pub enum MountOutcome {
    /// State now holds `count` sanitized books.
    Loaded { count: usize },
    /// The request failed; state was left as it was.
    Failed(FetchFailure),
    /// The view was torn down before the response arrived.
    Detached,
}

struct Shared {
    alive: AtomicBool,
    state: RwLock<ViewState>,
}

/// Shows the catalog as a table, loading it once when mounted.
///
/// Loading, a failed load, and an empty catalog all render the same
/// "No books found." message.
pub struct BookListView {
    shared: Arc<Shared>,
    source: Arc<dyn BookSource>,
    renderer: Renderer,
    mounted: AtomicBool,
}

impl BookListView {
    pub fn new(source: Arc<dyn BookSource>) -> Result<Self, RenderError> {
        Ok(Self {
            shared: Arc::new(Shared {
                alive: AtomicBool::new(true),
                state: RwLock::new(ViewState::default()),
            }),
            source,
            renderer: Renderer::new()?,
            mounted: AtomicBool::new(false),
        })
    }

    /// A view reading from the configured HTTP endpoint.
    pub fn from_settings(settings: &CatalogSettings) -> anyhow::Result<Self> {
        let source = HttpBookSource::new(settings)?;
        Ok(Self::new(Arc::new(source))?)
    }

    /// Start the one catalog load for this view's lifetime.
    ///
    /// The load runs on the tokio runtime and nothing needs to wait for it;
    /// the returned handle is only there for callers that want the outcome.
    /// Every call after the first returns `None` without fetching again.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn mount(&self) -> Option<JoinHandle<MountOutcome>> {
        if self.mounted.swap(true, Ordering::AcqRel) {
            tracing::debug!(source = self.source.describe(), "book list already mounted");
            return None;
        }

        tracing::info!(source = self.source.describe(), "loading book list");
        let source = self.source.clone();
        let shared = Arc::downgrade(&self.shared);
        Some(tokio::spawn(load(source, shared)))
    }

    /// Tear the view down. A load still in flight will not touch state.
    pub fn unmount(&self) {
        // Flip under the write lock so no load can be mid-write once this returns
        let _state = self
            .shared
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if self.shared.alive.swap(false, Ordering::AcqRel) {
            tracing::debug!(source = self.source.describe(), "book list unmounted");
        }
    }

    pub fn is_alive(&self) -> bool {
        self.shared.alive.load(Ordering::Acquire)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ViewState {
        self.shared
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The heading plus the table or empty message for the current state.
    pub fn render(&self) -> Result<String, RenderError> {
        let state = self
            .shared
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        self.renderer.fragment(state.books())
    }

    /// [`render`](Self::render) wrapped in a full HTML document.
    pub fn render_page(&self) -> Result<String, RenderError> {
        let state = self
            .shared
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        self.renderer.page(state.books())
    }
}

impl Drop for BookListView {
    fn drop(&mut self) {
        self.unmount();
    }
}

async fn load(source: Arc<dyn BookSource>, shared: Weak<Shared>) -> MountOutcome {
    let records = match source.fetch().await {
        Ok(records) => records,
        Err(failure) => {
            tracing::error!(
                source = source.describe(),
                error = %failure,
                cause = ?std::error::Error::source(&failure),
                "error fetching books"
            );
            return MountOutcome::Failed(failure);
        }
    };

    let received = records.len();
    let books = sanitize(records);
    let count = books.len();

    let applied = shared.upgrade().is_some_and(|shared| {
        let mut state = shared
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // Checked under the lock: `unmount` flips the flag while holding it
        let alive = shared.alive.load(Ordering::Acquire);
        if alive {
            state.books = books;
        }
        alive
    });
    if !applied {
        tracing::debug!(
            source = source.describe(),
            "book list torn down before the catalog arrived"
        );
        return MountOutcome::Detached;
    }

    tracing::info!(
        source = source.describe(),
        received,
        dropped = received - count,
        count,
        "book list loaded"
    );
    MountOutcome::Loaded { count }
}
