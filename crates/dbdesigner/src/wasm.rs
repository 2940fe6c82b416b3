//! WebAssembly bindings
//!
//! Browser-facing wrappers that build diagrams and hand them back as JSON.

use wasm_bindgen::prelude::*;

use crate::core::logging::init_logging;
use crate::export;
use crate::grid::GridBuilder;
use crate::Diagram;

/// Sets up the panic hook and routes tracing output to the browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = init_logging(Some("info"), None);
}

/// Build an R x C grid of linked tables and return the diagram as JSON
///
/// Throws a JavaScript error for an empty grid.
#[wasm_bindgen]
pub fn build_grid_json(rows: usize, columns: usize, spacing: Option<f64>) -> Result<String, JsValue> {
    let mut builder = GridBuilder::new(rows, columns);
    if let Some(spacing) = spacing {
        builder = builder.spacing(spacing);
    }

    let mut diagram = Diagram::new();
    builder
        .build(&mut diagram)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    export::to_json(&diagram, false).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Grid build summary as JSON: table, link and skipped-cell counts
#[wasm_bindgen]
pub fn grid_stats(rows: usize, columns: usize) -> Result<String, JsValue> {
    let mut diagram = Diagram::new();
    let report = GridBuilder::new(rows, columns)
        .build(&mut diagram)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let stats = serde_json::json!({
        "tables": report.table_count(),
        "links": report.links.len(),
        "skipped": report.skipped,
    });
    Ok(stats.to_string())
}
