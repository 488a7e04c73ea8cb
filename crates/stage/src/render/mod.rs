//! Render Stage - Cycle-safe JSON serialization
//!
//! Turns each record into exactly one JSON text chunk followed by a
//! configurable separator. The defining guarantee is that rendering never
//! fails, whatever the record contains:
//!
//! - a container reached a second time along the current path renders as
//!   the string `"[Circular]"` instead of recursing forever
//! - byte buffers render as `{"type":"Buffer","data":[…]}`
//! - structured errors render their code/message/cause form
//! - values plain JSON cannot express degrade to a placeholder (`null`
//!   inside containers, the literal text `undefined` at the top level)
//!
//! Only the current recursion path is tracked, not every container ever
//! visited: the same container appearing in two sibling branches is
//! sharing, not a cycle, and renders normally both times.
//!
//! # Configuration
//!
//! | Option | Type | Default | Description |
//! |--------|------|---------|-------------|
//! | `separator` | string | `"\n"` | Appended after every chunk |
//! | `space` | integer or string | none | Pretty-print indent per level |
//!
//! # Example
//!
//! ```ignore
//! let render = SafeJson::new(RenderConfig::new().with_separator("#"));
//! let chunk = render.render(record.value());
//! // => "{\"event\":\"log\"}#"
//! ```

mod config;

pub use config::{Indent, RenderConfig};

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use sift_record::{ErrorValue, EventRecord, Value};

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

/// Metrics for the serializer stage
#[derive(Debug, Default)]
pub struct RenderMetrics {
    /// Records rendered
    pub records_rendered: AtomicU64,
    /// Bytes of chunk text emitted, separators included
    pub bytes_emitted: AtomicU64,
}

/// Cycle-safe JSON serializer
///
/// Stateless across records; one chunk out per record in, in input order.
pub struct SafeJson {
    config: RenderConfig,
    metrics: RenderMetrics,
}

impl SafeJson {
    /// Create a new serializer
    pub fn new(config: RenderConfig) -> Self {
        tracing::debug!(
            separator = ?config.separator,
            compact = config.indent.is_compact(),
            "serializer configured"
        );
        Self {
            config,
            metrics: RenderMetrics::default(),
        }
    }

    /// Get the active configuration
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Get stage metrics
    pub fn metrics(&self) -> &RenderMetrics {
        &self.metrics
    }

    /// Render one value to a JSON chunk plus separator
    ///
    /// Never fails and never mutates the input.
    pub fn render(&self, value: &Value) -> String {
        let mut out = String::new();

        if value.is_undefined() {
            // The JSON layer has no output for this value at all; emit the
            // best-effort placeholder rather than an empty chunk.
            out.push_str("undefined");
        } else {
            let mut path = Vec::new();
            write_value(&mut out, value, &self.config.indent, 0, &mut path);
        }

        out.push_str(&self.config.separator);

        self.metrics.records_rendered.fetch_add(1, Ordering::Relaxed);
        self.metrics
            .bytes_emitted
            .fetch_add(out.len() as u64, Ordering::Relaxed);

        out
    }

    /// Render one record
    pub fn render_record(&self, record: &EventRecord) -> String {
        self.render(record.value())
    }
}

impl Default for SafeJson {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl std::fmt::Debug for SafeJson {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeJson")
            .field("config", &self.config)
            .field("metrics", &self.metrics)
            .finish()
    }
}

/// Token substituted for a container re-encountered on the current path
const CIRCULAR_TOKEN: &str = "[Circular]";

fn write_value(out: &mut String, value: &Value, indent: &Indent, depth: usize, path: &mut Vec<usize>) {
    match value {
        Value::Null => out.push_str("null"),
        // Undefined reaches here only in array position, where JSON's
        // closest representation is null; maps skip these members entirely
        Value::Undefined => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Int(i) => out.push_str(&i.to_string()),
        Value::Float(f) => {
            if f.is_finite() {
                out.push_str(&f.to_string());
            } else {
                out.push_str("null");
            }
        }
        Value::String(s) => write_string(out, s),
        Value::Bytes(bytes) => write_bytes(out, bytes, indent, depth),
        Value::Error(error) => write_error(out, error, indent, depth),
        Value::Array(_) => write_array(out, value, indent, depth, path),
        Value::Map(_) => write_map(out, value, indent, depth, path),
    }
}

fn write_array(out: &mut String, value: &Value, indent: &Indent, depth: usize, path: &mut Vec<usize>) {
    let id = value.container_id().unwrap_or_default();
    if path.contains(&id) {
        write_string(out, CIRCULAR_TOKEN);
        return;
    }

    let elements = value.elements().unwrap_or_default();
    if elements.is_empty() {
        out.push_str("[]");
        return;
    }

    path.push(id);
    out.push('[');
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        newline_indent(out, indent, depth + 1);
        write_value(out, element, indent, depth + 1, path);
    }
    newline_indent(out, indent, depth);
    out.push(']');
    path.pop();
}

fn write_map(out: &mut String, value: &Value, indent: &Indent, depth: usize, path: &mut Vec<usize>) {
    let id = value.container_id().unwrap_or_default();
    if path.contains(&id) {
        write_string(out, CIRCULAR_TOKEN);
        return;
    }

    let entries: Vec<(String, Value)> = value
        .entries()
        .unwrap_or_default()
        .into_iter()
        .filter(|(_, member)| !member.is_undefined())
        .collect();
    if entries.is_empty() {
        out.push_str("{}");
        return;
    }

    path.push(id);
    out.push('{');
    for (i, (key, member)) in entries.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        newline_indent(out, indent, depth + 1);
        write_key(out, key, indent);
        write_value(out, member, indent, depth + 1, path);
    }
    newline_indent(out, indent, depth);
    out.push('}');
    path.pop();
}

fn write_bytes(out: &mut String, bytes: &Bytes, indent: &Indent, depth: usize) {
    out.push('{');
    newline_indent(out, indent, depth + 1);
    write_key(out, "type", indent);
    write_string(out, "Buffer");
    out.push(',');
    newline_indent(out, indent, depth + 1);
    write_key(out, "data", indent);
    if bytes.is_empty() {
        out.push_str("[]");
    } else {
        out.push('[');
        for (i, byte) in bytes.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            newline_indent(out, indent, depth + 2);
            out.push_str(&byte.to_string());
        }
        newline_indent(out, indent, depth + 1);
        out.push(']');
    }
    newline_indent(out, indent, depth);
    out.push('}');
}

fn write_error(out: &mut String, error: &ErrorValue, indent: &Indent, depth: usize) {
    out.push('{');
    if let Some(code) = error.code() {
        newline_indent(out, indent, depth + 1);
        write_key(out, "code", indent);
        write_string(out, code);
        out.push(',');
    }
    newline_indent(out, indent, depth + 1);
    write_key(out, "message", indent);
    write_string(out, error.message());
    if let Some(cause) = error.cause() {
        out.push(',');
        newline_indent(out, indent, depth + 1);
        write_key(out, "cause", indent);
        write_error(out, cause, indent, depth + 1);
    }
    newline_indent(out, indent, depth);
    out.push('}');
}

fn write_key(out: &mut String, key: &str, indent: &Indent) {
    write_string(out, key);
    out.push(':');
    if !indent.is_compact() {
        out.push(' ');
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn newline_indent(out: &mut String, indent: &Indent, depth: usize) {
    match indent {
        Indent::None => {}
        Indent::Spaces(width) => {
            if *width == 0 {
                return;
            }
            out.push('\n');
            for _ in 0..(width * depth) {
                out.push(' ');
            }
        }
        Indent::Literal(unit) => {
            if unit.is_empty() {
                return;
            }
            out.push('\n');
            for _ in 0..depth {
                out.push_str(unit);
            }
        }
    }
}
