use crate::types::Px;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// JSON-lines diagnostics sink for pagination decisions. One logger is
/// shared by an export run; events are line-buffered and counters are
/// drained into a summary record when the run finishes.
#[derive(Clone, Debug)]
pub(crate) struct DebugLogger {
    inner: Arc<Mutex<DebugState>>,
}

#[derive(Debug)]
struct DebugState {
    writer: BufWriter<File>,
    counters: HashMap<String, u64>,
}

impl DebugLogger {
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(DebugState {
                writer: BufWriter::new(file),
                counters: HashMap::new(),
            })),
        })
    }

    pub fn log_page_break(&self, from_page: usize, to_page: usize, reason: &str, block_id: &str) {
        let json = format!(
            "{{\"type\":\"split.page_break\",\"reason\":\"{}\",\"from_page\":{},\"to_page\":{},\"block\":\"{}\"}}",
            json_escape(reason),
            from_page,
            to_page,
            json_escape(block_id)
        );
        self.log_json(&json);
        self.increment("split.page_break", 1);
    }

    pub fn log_overflow(&self, page: usize, block_id: &str, height: Px, page_height: Px) {
        let json = format!(
            "{{\"type\":\"split.overflow\",\"page\":{},\"block\":\"{}\",\"height_milli_px\":{},\"page_height_milli_px\":{}}}",
            page,
            json_escape(block_id),
            height.to_milli_i64(),
            page_height.to_milli_i64()
        );
        self.log_json(&json);
        self.increment("split.overflow", 1);
    }

    pub fn log_measure_gap(&self, block_id: &str, substituted: Px) {
        let json = format!(
            "{{\"type\":\"measure.gap\",\"block\":\"{}\",\"substituted_milli_px\":{}}}",
            json_escape(block_id),
            substituted.to_milli_i64()
        );
        self.log_json(&json);
        self.increment("measure.gap", 1);
    }

    pub fn log_plan_mismatch(&self, detail: &str) {
        let json = format!(
            "{{\"type\":\"plan.mismatch\",\"detail\":\"{}\"}}",
            json_escape(detail)
        );
        self.log_json(&json);
        self.increment("plan.mismatch", 1);
    }

    pub fn log_json(&self, json: &str) {
        if let Ok(mut state) = self.inner.lock() {
            let _ = writeln!(state.writer, "{json}");
        }
    }

    pub fn increment(&self, key: &str, amount: u64) {
        if let Ok(mut state) = self.inner.lock() {
            let entry = state.counters.entry(key.to_string()).or_insert(0);
            *entry = entry.saturating_add(amount);
        }
    }

    pub fn emit_summary(&self, context: &str) {
        if let Ok(mut state) = self.inner.lock() {
            let mut counters: Vec<(String, u64)> = state.counters.drain().collect();
            counters.sort_by(|a, b| a.0.cmp(&b.0));
            let counts_json = if counters.is_empty() {
                "{}".to_string()
            } else {
                let mut out = String::from("{");
                for (idx, (key, value)) in counters.iter().enumerate() {
                    if idx > 0 {
                        out.push(',');
                    }
                    out.push_str(&format!("\"{}\":{}", json_escape(key), value));
                }
                out.push('}');
                out
            };
            let json = format!(
                "{{\"type\":\"debug.summary\",\"context\":\"{}\",\"counts\":{}}}",
                json_escape(context),
                counts_json
            );
            let _ = writeln!(state.writer, "{json}");
        }
    }

    pub fn flush(&self) {
        if let Ok(mut state) = self.inner.lock() {
            let _ = state.writer.flush();
        }
    }
}

pub(crate) fn json_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_and_summary_are_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pagebound_debug.log");
        let logger = DebugLogger::new(&path).unwrap();
        logger.log_page_break(1, 2, "boundary", "blk-7");
        logger.log_overflow(2, "blk-8", Px::from_i32(1500), Px::from_i32(1125));
        logger.log_measure_gap("blk-9", Px::from_i32(120));
        logger.emit_summary("export");
        logger.flush();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("\"type\":\"split.page_break\""));
        assert!(lines[0].contains("\"reason\":\"boundary\""));
        assert!(lines[1].contains("\"height_milli_px\":1500000"));
        assert!(lines[3].contains("\"split.overflow\":1"));
        assert!(lines[3].contains("\"measure.gap\":1"));
    }

    #[test]
    fn escapes_quotes_in_block_ids() {
        assert_eq!(json_escape("a\"b\\c"), "a\\\"b\\\\c");
    }
}
