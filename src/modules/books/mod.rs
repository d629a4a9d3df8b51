pub mod models;
pub mod render;
pub mod source;
pub mod view;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, response::Html, routing::get, Json, Router};
use bookstore_http::error::AppError;
use bookstore_kernel::{settings::Settings, InitCtx, Module};

use view::BookListView;

/// Hosts the book list view and exposes it as a page and a JSON route
pub struct BooksModule {
    view: Arc<BookListView>,
}

impl BooksModule {
    pub fn new(view: Arc<BookListView>) -> Self {
        Self { view }
    }

    pub fn view(&self) -> &Arc<BookListView> {
        &self.view
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            endpoint = %ctx.settings.catalog.endpoint,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_books))
            .route("/health", get(health_check))
            .with_state(self.view.clone())
    }

    fn pages(&self) -> Router {
        Router::new()
            .route("/", get(book_page))
            .with_state(self.view.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "pages": {
                "/": {
                    "get": {
                        "summary": "Book list page",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Rendered book table, or the empty-state message",
                                "content": { "text/html": { "schema": { "type": "string" } } }
                            },
                            "500": {
                                "description": "Internal server error",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "paths": {
                "/": {
                    "get": {
                        "summary": "List loaded books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Books currently shown by the view",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Books health check",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": { "text/plain": { "schema": { "type": "string" } } }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "description": "Book record passed through from the catalog API",
                        "properties": {
                            "id": { "description": "Row key" },
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "isbn": { "type": "string" },
                            "price": { "description": "Number or text, shown as-is" }
                        }
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        // Nobody waits on the load; the page shows the empty message until it lands
        let _ = self.view.mount();
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.view.unmount();
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

/// Books currently held by the view
async fn list_books(State(view): State<Arc<BookListView>>) -> Json<Vec<models::Book>> {
    Json(view.state().books().to_vec())
}

/// The rendered book list page
async fn book_page(State(view): State<Arc<BookListView>>) -> Result<Html<String>, AppError> {
    let html = view.render_page().map_err(anyhow::Error::from)?;
    Ok(Html(html))
}

/// Create the books module reading from the configured catalog endpoint
pub fn create_module(settings: &Settings) -> anyhow::Result<Arc<dyn Module>> {
    let view = BookListView::from_settings(&settings.catalog)?;
    Ok(Arc::new(BooksModule::new(Arc::new(view))))
}
