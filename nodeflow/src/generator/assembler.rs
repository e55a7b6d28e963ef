//! Incremental record extraction from streamed JSON text.
//!
//! Model output arrives as text deltas of a document shaped `{"nodes": [{...}, {...}]}`
//! (a bare `[{...}]` array is accepted too). [`RecordAssembler`] scans the deltas and emits
//! each record as soon as its closing brace arrives, so validation never waits for the
//! whole document. Braces inside string literals (including escaped quotes) are ignored,
//! and anything outside the top-level container (such as a Markdown code fence) is skipped.

use serde_json::Value;

#[derive(Debug, Default)]
pub struct RecordAssembler {
    depth: usize,
    /// Depth at which record objects open: 2 inside `{"nodes": [...]}`, 1 inside `[...]`.
    record_depth: Option<usize>,
    in_string: bool,
    escaped: bool,
    capturing: bool,
    buf: String,
}

impl RecordAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one text delta; returns the records completed by it.
    ///
    /// A record that is balanced but not valid JSON is returned as a JSON string holding the
    /// raw text, so schema validation rejects it instead of it vanishing silently.
    pub fn push(&mut self, chunk: &str) -> Vec<Value> {
        let mut out = Vec::new();
        for ch in chunk.chars() {
            if self.in_string {
                if self.capturing {
                    self.buf.push(ch);
                }
                if self.escaped {
                    self.escaped = false;
                } else if ch == '\\' {
                    self.escaped = true;
                } else if ch == '"' {
                    self.in_string = false;
                }
                continue;
            }

            match ch {
                '"' => {
                    self.in_string = true;
                    if self.capturing {
                        self.buf.push(ch);
                    }
                }
                '{' | '[' => {
                    if self.depth == 0 {
                        self.record_depth = Some(if ch == '{' { 2 } else { 1 });
                    }
                    if !self.capturing && ch == '{' && Some(self.depth) == self.record_depth {
                        self.capturing = true;
                        self.buf.clear();
                    }
                    if self.capturing {
                        self.buf.push(ch);
                    }
                    self.depth += 1;
                }
                '}' | ']' => {
                    if self.capturing {
                        self.buf.push(ch);
                    }
                    self.depth = self.depth.saturating_sub(1);
                    if self.capturing && ch == '}' && Some(self.depth) == self.record_depth {
                        self.capturing = false;
                        let raw = std::mem::take(&mut self.buf);
                        out.push(serde_json::from_str(&raw).unwrap_or(Value::String(raw)));
                    }
                    if self.depth == 0 {
                        self.record_depth = None;
                    }
                }
                _ => {
                    if self.capturing {
                        self.buf.push(ch);
                    }
                }
            }
        }
        out
    }

    /// True when no container is open (the document, if any, has been fully read).
    pub fn is_idle(&self) -> bool {
        self.depth == 0 && !self.in_string
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DOC: &str = r#"{"nodes": [
        {"type": "task", "data": {"name": "a {b}", "description": "say \"}\"", "difficulty": "easy"}},
        {"type": "code", "data": {"explanation": "e", "code": "fn x() { [1] }"}}
    ]}"#;

    /// **Scenario**: Fed one char at a time, records come out as each closes; braces in strings are ignored.
    #[test]
    fn emits_records_across_arbitrary_chunks() {
        let mut asm = RecordAssembler::new();
        let mut records = Vec::new();
        for ch in DOC.chars() {
            records.extend(asm.push(&ch.to_string()));
        }
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["data"]["name"], "a {b}");
        assert_eq!(records[0]["data"]["description"], "say \"}\"");
        assert_eq!(records[1]["data"]["code"], "fn x() { [1] }");
        assert!(asm.is_idle());
    }

    /// **Scenario**: The first record is emitted before the document is finished.
    #[test]
    fn emits_record_before_document_ends() {
        let mut asm = RecordAssembler::new();
        let (head, _) = DOC.split_at(DOC.find("},\n").map(|i| i + 2).unwrap());
        let first = asm.push(head);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0]["type"], "task");
        assert!(!asm.is_idle());
    }

    /// **Scenario**: A code fence around the document and a bare array are both handled.
    #[test]
    fn tolerates_code_fence_and_bare_array() {
        let mut asm = RecordAssembler::new();
        let fenced = "```json\n{\"nodes\": [{\"type\": \"error\", \"data\": {}}]}\n```";
        assert_eq!(asm.push(fenced), vec![json!({"type": "error", "data": {}})]);

        let mut asm = RecordAssembler::new();
        let bare = "[{\"type\": \"task\"}, {\"type\": \"code\"}]";
        assert_eq!(asm.push(bare).len(), 2);
    }

    /// **Scenario**: A balanced but malformed record is surfaced as its raw text.
    #[test]
    fn malformed_record_becomes_raw_string() {
        let mut asm = RecordAssembler::new();
        let out = asm.push("{\"nodes\": [{\"type\": task}]}");
        assert_eq!(out, vec![Value::String("{\"type\": task}".into())]);
    }
}
