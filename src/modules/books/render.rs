//! HTML rendering for the book list.
//!
//! Templates are compiled once with [`upon`]; every interpolated value goes
//! through the `escape` formatter so record contents can never inject markup.

use serde::Serialize;
use thiserror::Error;
use upon::{Engine, Template};

use super::models::{Book, Column};

const HEADING: &str = "📚 Book List";
const EMPTY_MESSAGE: &str = "No books found.";

const FRAGMENT_TEMPLATE: &str = r#"<div class="book-list">
  <h1>{{ heading | escape }}</h1>
{%- if is_empty %}
  <p>{{ empty_message | escape }}</p>
{%- else %}
  <table>
    <thead>
      <tr>
{%- for header in headers %}
        <th>{{ header | escape }}</th>
{%- endfor %}
      </tr>
    </thead>
    <tbody>
{%- for row in rows %}
      <tr data-key="{{ row.key | escape }}">
{%- for cell in row.cells %}
        <td>{{ cell | escape }}</td>
{%- endfor %}
      </tr>
{%- endfor %}
    </tbody>
  </table>
{%- endif %}
</div>
"#;

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{ title | escape }}</title>
  <style>
    .book-list { padding: 30px; font-family: sans-serif; }
    .book-list table { width: 100%; border-collapse: collapse; margin-top: 20px; }
    .book-list thead tr { background-color: #f0f0f0; }
    .book-list th { border: 1px solid #ccc; padding: 10px; text-align: left; }
    .book-list td { border: 1px solid #ddd; padding: 10px; }
  </style>
</head>
<body>
{{ fragment }}
</body>
</html>
"#;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to compile the {name} template")]
    Compile {
        name: &'static str,
        #[source]
        source: upon::Error,
    },

    #[error("failed to render the {name} template")]
    Render {
        name: &'static str,
        #[source]
        source: upon::Error,
    },
}

#[derive(Serialize)]
struct FragmentContext<'a> {
    heading: &'a str,
    empty_message: &'a str,
    is_empty: bool,
    headers: Vec<&'static str>,
    rows: Vec<RowContext>,
}

#[derive(Serialize)]
struct RowContext {
    key: String,
    cells: Vec<String>,
}

#[derive(Serialize)]
struct PageContext<'a> {
    title: &'a str,
    fragment: &'a str,
}

/// Compiled book list templates.
pub struct Renderer {
    engine: Engine<'static>,
    fragment: Template<'static>,
    page: Template<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut engine = Engine::new();
        engine.add_formatter("escape", addons::escape_formatter);

        let fragment = engine
            .compile(FRAGMENT_TEMPLATE)
            .map_err(|source| RenderError::Compile {
                name: "fragment",
                source,
            })?;
        let page = engine
            .compile(PAGE_TEMPLATE)
            .map_err(|source| RenderError::Compile {
                name: "page",
                source,
            })?;

        Ok(Self {
            engine,
            fragment,
            page,
        })
    }

    /// Heading plus either the empty message or the table of `books`.
    pub fn fragment(&self, books: &[Book]) -> Result<String, RenderError> {
        let rows = books
            .iter()
            .map(|book| RowContext {
                key: book.cell(Column::Id),
                cells: Column::ALL.iter().map(|column| book.cell(*column)).collect(),
            })
            .collect();
        let context = FragmentContext {
            heading: HEADING,
            empty_message: EMPTY_MESSAGE,
            is_empty: books.is_empty(),
            headers: Column::ALL.iter().map(|column| column.header()).collect(),
            rows,
        };

        self.fragment
            .render(&self.engine, &context)
            .to_string()
            .map_err(|source| RenderError::Render {
                name: "fragment",
                source,
            })
    }

    /// The fragment wrapped in a standalone HTML document.
    pub fn page(&self, books: &[Book]) -> Result<String, RenderError> {
        let fragment = self.fragment(books)?;
        let context = PageContext {
            title: "Book List",
            fragment: &fragment,
        };

        self.page
            .render(&self.engine, &context)
            .to_string()
            .map_err(|source| RenderError::Render {
                name: "page",
                source,
            })
    }
}

mod addons {
    use std::fmt::Write;
    use upon::{fmt as upon_fmt, Value};

    /// Writes strings with the five HTML-significant characters replaced.
    pub(super) fn escape_formatter(
        f: &mut upon_fmt::Formatter<'_>,
        value: &Value,
    ) -> upon_fmt::Result {
        match value {
            Value::String(s) => {
                for c in s.chars() {
                    match c {
                        '&' => f.write_str("&amp;")?,
                        '<' => f.write_str("&lt;")?,
                        '>' => f.write_str("&gt;")?,
                        '"' => f.write_str("&quot;")?,
                        '\'' => f.write_str("&#39;")?,
                        c => f.write_char(c)?,
                    }
                }
            }
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }
}
