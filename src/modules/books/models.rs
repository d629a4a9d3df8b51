use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A book record exactly as the catalog API sent it.
///
/// Fields are never validated or rewritten: whatever the API sent for `id`,
/// `title`, `author`, `isbn` and `price` is what gets displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Book(Value);

impl Book {
    /// Raw value of a named field, if the record is an object that has it.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Text shown in the table cell for `column`.
    pub fn cell(&self, column: Column) -> String {
        cell_text(self.field(column.key()))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Table columns in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Title,
    Author,
    Isbn,
    Price,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Id,
        Column::Title,
        Column::Author,
        Column::Isbn,
        Column::Price,
    ];

    /// Record field this column reads.
    pub fn key(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Title => "title",
            Column::Author => "author",
            Column::Isbn => "isbn",
            Column::Price => "price",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Title => "Title",
            Column::Author => "Author",
            Column::Isbn => "ISBN",
            Column::Price => "Price (₹)",
        }
    }
}

/// Whether a fetched element is worth a table row: it must be truthy and,
/// seen as a mapping, own at least one key.
///
/// Strings own one key per character and arrays one per element, so a
/// non-empty string or array passes even though it has no book fields.
/// Numbers and booleans never own keys.
pub fn is_displayable(record: &Value) -> bool {
    match record {
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Drop every record that fails [`is_displayable`], keeping the order of
/// the rest.
pub fn sanitize(records: Vec<Value>) -> Vec<Book> {
    records
        .into_iter()
        .filter(is_displayable)
        .map(Book)
        .collect()
}

/// Display text for a raw field value.
///
/// Missing fields, `null` and booleans show nothing; arrays show their
/// elements run together; objects show their compact JSON.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(_)) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => number_text(n),
        Some(Value::Array(items)) => items.iter().map(|item| cell_text(Some(item))).collect(),
        Some(object @ Value::Object(_)) => object.to_string(),
    }
}

/// Largest magnitude at which every integer is exactly representable in an `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Numbers print the way a browser prints them: integral floats lose their
/// trailing `.0`.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(input: Value) -> Vec<Value> {
        match input {
            Value::Array(items) => items,
            other => panic!("expected array, got {other}"),
        }
    }

    #[test]
    fn sanitize_drops_empty_and_null_records_in_order() {
        let input = values(json!([{}, {"id": 1, "title": "T"}, null, {"id": 2}]));

        let books = sanitize(input);

        assert_eq!(
            books.into_iter().map(Book::into_value).collect::<Vec<_>>(),
            vec![json!({"id": 1, "title": "T"}), json!({"id": 2})]
        );
    }

    #[test]
    fn sanitize_follows_truthy_and_own_key_rules() {
        let input = values(json!([
            false, true, 0, 7, 1.5, "", "x", [], [1], {}, {"k": null}
        ]));

        let kept: Vec<Value> = sanitize(input).into_iter().map(Book::into_value).collect();

        assert_eq!(kept, vec![json!("x"), json!([1]), json!({"k": null})]);
    }

    #[test]
    fn sanitize_of_only_empty_objects_is_empty() {
        assert!(sanitize(values(json!([{}, {}, {}]))).is_empty());
        assert!(sanitize(Vec::new()).is_empty());
    }

    #[test]
    fn cells_pass_values_through() {
        let book = Book(json!({
            "id": 5,
            "title": "Dune",
            "author": "Frank Herbert",
            "isbn": "123",
            "price": 499
        }));

        let cells: Vec<String> = Column::ALL.iter().map(|c| book.cell(*c)).collect();

        assert_eq!(cells, vec!["5", "Dune", "Frank Herbert", "123", "499"]);
    }

    #[test]
    fn cell_text_matches_rendered_form() {
        assert_eq!(cell_text(None), "");
        assert_eq!(cell_text(Some(&json!(null))), "");
        assert_eq!(cell_text(Some(&json!(true))), "");
        assert_eq!(cell_text(Some(&json!(12.5))), "12.5");
        assert_eq!(cell_text(Some(&json!(-7))), "-7");
        assert_eq!(cell_text(Some(&json!(["a", 1, null]))), "a1");
        assert_eq!(cell_text(Some(&json!({"amount": 3}))), r#"{"amount":3}"#);
    }

    #[test]
    fn integral_floats_print_without_fraction() {
        let book: Book = serde_json::from_str(r#"{"id": 1.0, "price": 499.0}"#).unwrap();
        assert_eq!(book.cell(Column::Id), "1");
        assert_eq!(book.cell(Column::Price), "499");

        let book: Book = serde_json::from_str(r#"{"price": 1.5e3}"#).unwrap();
        assert_eq!(book.cell(Column::Price), "1500");

        let book: Book = serde_json::from_str(r#"{"price": -0.0}"#).unwrap();
        assert_eq!(book.cell(Column::Price), "0");
    }

    #[test]
    fn non_object_records_have_no_fields() {
        let book = Book(json!("loose string"));
        assert_eq!(book.field("id"), None);
        assert_eq!(book.cell(Column::Title), "");
    }

    #[test]
    fn headers_in_display_order() {
        let headers: Vec<&str> = Column::ALL.iter().map(|c| c.header()).collect();
        assert_eq!(headers, vec!["ID", "Title", "Author", "ISBN", "Price (₹)"]);
    }
}
