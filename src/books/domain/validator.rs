use serde_json::Value;

pub const MIN_YEAR: i64 = 1900;

pub const ISBN_REQUIRED: &str = "ISBN is required";
pub const TITLE_REQUIRED: &str = "Title is required";
pub const AUTHOR_REQUIRED: &str = "Author is required";
pub const CATEGORY_REQUIRED: &str = "Category is required";
pub const INVALID_YEAR: &str = "Year must be an integer ≥ 1900";

/// Checks an untrusted book payload and returns the message of the first failing rule.
///
/// Rules run in a fixed order: isbn, title, author, category, year. The four text fields
/// only need to be present and truthy (not null, `false`, `0` or `""`), the year must be
/// an integral number no lower than 1900.
pub fn validate_book(candidate: &Value) -> Result<(), String> {
    let rules: [(&str, &str); 4] = [
        ("isbn", ISBN_REQUIRED),
        ("title", TITLE_REQUIRED),
        ("author", AUTHOR_REQUIRED),
        ("category", CATEGORY_REQUIRED),
    ];
    for (field, message) in rules {
        if !is_truthy(candidate.get(field)) {
            return Err(message.to_string());
        }
    }
    match candidate.get("year").and_then(integer_value) {
        Some(year) if year >= MIN_YEAR => Ok(()),
        _ => Err(INVALID_YEAR.to_string()),
    }
}

pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

// integral JSON numbers, including floats such as 2001.0
pub(crate) fn integer_value(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        return Some(f as i64);
    }
    None
}
