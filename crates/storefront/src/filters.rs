//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Spanish item count label: "1 producto", "3 productos".
///
/// Usage in templates: `{{ cart.item_count|items_label }}`
#[askama::filter_fn]
pub fn items_label(count: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(pluralize_items(&count.to_string()))
}

fn pluralize_items(count: &str) -> String {
    if count == "1" {
        "1 producto".to_string()
    } else {
        format!("{count} productos")
    }
}
