//! Shared test setup and fixtures

use std::sync::Once;

use serde_json::Value;
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

use crate::domain::{FieldNames, Item};

static TRACING: Once = Once::new();

/// Route the crate's tracing output through the test harness, once per binary.
///
/// Defaults to `treedit=trace` so dropped items and refusals show up in
/// failing test output; `RUST_LOG` overrides it.
pub fn init_test_setup() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("treedit=trace"));
        let layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(filter);

        if let Err(e) = tracing_subscriber::registry().with(layer).try_init() {
            eprintln!("test tracing already installed: {e}");
        }
        tracing::debug!("test tracing ready");
    });
}

/// Flat item with integer ids; parent 0 marks a root.
pub fn item(id: i64, parent: i64, name: &str) -> Item {
    let names = FieldNames::default();
    Item::new()
        .with(names.id, id)
        .with(names.parent_id, parent)
        .with(names.name, name)
}

/// Flat item with string ids; `None` leaves the parent field out.
pub fn str_item(id: &str, parent: Option<&str>, name: &str) -> Item {
    let names = FieldNames::default();
    let item = Item::new().with(names.id, id).with(names.name, name);
    match parent {
        Some(parent) => item.with(names.parent_id, Value::from(parent)),
        None => item,
    }
}

/// Seven items, three roots:
///
/// ```text
/// 1 ─┬─ 2 ── 4 ── 7
///    └─ 3
/// 5
/// 6
/// ```
///
/// Children are listed after their parents are needed, so unflatten has to
/// look ahead (7 arrives before 4).
pub fn sample_items() -> Vec<Item> {
    vec![
        item(1, 0, "one"),
        item(2, 1, "two"),
        item(7, 4, "seven"),
        item(3, 1, "three"),
        item(4, 2, "four"),
        item(5, 0, "five"),
        item(6, 0, "six"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_repeated_setup_when_called_then_is_idempotent() {
        init_test_setup();
        init_test_setup();
    }

    #[test]
    fn given_sample_items_when_counted_then_seven() {
        assert_eq!(sample_items().len(), 7);
    }
}
