//! Scripted offline expansion used by `--mock`.

use std::time::Duration;

use nodeflow::MockGenerator;
use serde_json::json;

/// Delay between streamed records, so the run looks like a live stream in debug logs.
const RECORD_DELAY: Duration = Duration::from_millis(40);

/// A plausible plan for `prompt`: overview, a decision, two tasks and a code sketch.
pub fn demo_generator(prompt: &str) -> MockGenerator {
    let topic = prompt.trim();
    MockGenerator::with_records(vec![
        json!({
            "type": "information",
            "data": {
                "content": format!("Scope and constraints for: {}", topic),
                "references": [],
                "tags": ["overview"]
            }
        }),
        json!({
            "type": "decision",
            "data": {
                "question": "How should the work be delivered?",
                "options": ["Incremental releases", "Single release"]
            }
        }),
        json!({
            "type": "task",
            "data": {
                "name": "Break down requirements",
                "description": format!("List the concrete requirements behind \"{}\".", topic),
                "difficulty": "easy"
            }
        }),
        json!({
            "type": "task",
            "data": {
                "name": "Build a first version",
                "description": "Implement the smallest version that can be shown to users.",
                "difficulty": "medium"
            }
        }),
        json!({
            "type": "code",
            "data": {
                "explanation": "Skeleton entry point",
                "code": "fn main() {\n    println!(\"hello\");\n}"
            }
        }),
    ])
    .with_delay(RECORD_DELAY)
}
