//! Flattening of `recipeInstructions` into ordered steps.

use serde_json::Value;

/// Flatten any of the instruction shapes publishers use into a list of steps.
///
/// Handles plain strings, `HowToStep` objects (`text`, falling back to
/// `name`), and `HowToSection` objects whose `itemListElement` is either a
/// single step or a list. Section contents are spliced in place.
pub fn flatten_instructions(instructions: Option<&Value>) -> Vec<String> {
    let mut steps = Vec::new();
    if let Some(value) = instructions {
        push_steps(value, &mut steps);
    }
    steps
}

fn push_steps(value: &Value, steps: &mut Vec<String>) {
    match value {
        Value::String(s) => push_text(s, steps),
        Value::Array(items) => {
            for item in items {
                push_steps(item, steps);
            }
        }
        Value::Object(obj) => {
            if let Some(text) = obj.get("text").and_then(Value::as_str) {
                push_text(text, steps);
            } else if let Some(children) = obj.get("itemListElement") {
                match children {
                    Value::Object(_) => {
                        if let Some(text) = step_text(children) {
                            push_text(text, steps);
                        }
                    }
                    _ => push_steps(children, steps),
                }
            } else if let Some(name) = obj.get("name").and_then(Value::as_str) {
                push_text(name, steps);
            }
        }
        _ => {}
    }
}

fn step_text(step: &Value) -> Option<&str> {
    step.get("text")
        .and_then(Value::as_str)
        .or_else(|| step.get("name").and_then(Value::as_str))
}

fn push_text(text: &str, steps: &mut Vec<String>) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        steps.push(trimmed.to_string());
    }
}
