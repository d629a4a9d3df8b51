//! Application bootstrap shared by `bookstore-app` and `bookstore-cli`.

use anyhow::Context;
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules::{self, books::view::BookListView};

/// Run the module lifecycle around the HTTP server until Ctrl-C.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &settings).context("failed to register modules")?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = bookstore_http::start_server(&registry, &settings, shutdown_signal()).await;

    // Stop modules even when the server failed, then report the first error
    let stopped = registry.stop_modules().await;
    served.and(stopped)
}

/// Mount a book list once, wait for its load to settle, and return the HTML.
///
/// A failed load is not an error here: it is logged and the empty message is
/// rendered, exactly as the served page would show it.
pub async fn render_once(settings: &Settings, full_page: bool) -> anyhow::Result<String> {
    let view = BookListView::from_settings(&settings.catalog)
        .context("failed to build the book list view")?;

    if let Some(load) = view.mount() {
        let outcome = load.await.context("book list load task panicked")?;
        tracing::debug!(?outcome, "book list load settled");
    }

    let html = if full_page {
        view.render_page()
    } else {
        view.render()
    };
    html.context("failed to render the book list")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler the server runs until killed
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
