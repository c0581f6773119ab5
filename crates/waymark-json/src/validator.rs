//! Structural validation of untrusted guide JSON.
//!
//! `parse_and_validate_guide` walks the raw JSON value before any typed
//! deserialization, so every finding can carry a position-qualified,
//! human-readable message (`Block 3 (interactive): ...`, `Block 2 >
//! Block 1 (markdown): ...`). Findings are data, not errors: the caller
//! gets a report with itemized errors and warnings, and a typed `Guide`
//! only when the error list is empty.
//!
//! Top-level structural failures (wrong root shape, missing id/title/
//! blocks) short-circuit without descending into blocks. Container
//! nesting is validated recursively but not depth-limited: imported
//! documents may nest containers deeper than the editor's own operations
//! would ever produce.

use serde_json::Value;

use waymark_api::{BlockKind, Guide, InteractiveAction};

/// Result of parsing and validating guide JSON.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// The typed guide, present iff `errors` is empty.
    pub guide: Option<Guide>,
}

impl ValidationReport {
    /// A failed report carrying only errors.
    pub fn failure(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
            warnings: Vec::new(),
            guide: None,
        }
    }
}

/// Parse raw JSON text into a validated guide, or a list of findings.
pub fn parse_and_validate_guide(json: &str) -> ValidationReport {
    let value: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(_) => {
            return ValidationReport::failure(vec![
                "Invalid JSON: the content is not well-formed JSON".to_string(),
            ]);
        }
    };

    let Some(root) = value.as_object() else {
        return ValidationReport::failure(vec![
            "Guide must be a JSON object with id, title and blocks".to_string(),
        ]);
    };

    // Top-level shape gates everything else: wrong required fields
    // short-circuit without descending into blocks.
    let mut errors = Vec::new();
    match root.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => {}
        Some(_) => errors.push("Guide 'id' must be a non-empty string".to_string()),
        None => errors.push("Guide is missing required string field 'id'".to_string()),
    }
    match root.get("title").and_then(Value::as_str) {
        Some(title) if !title.is_empty() => {}
        Some(_) => errors.push("Guide 'title' must be a non-empty string".to_string()),
        None => errors.push("Guide is missing required string field 'title'".to_string()),
    }
    let blocks = match root.get("blocks") {
        Some(Value::Array(blocks)) => Some(blocks),
        Some(_) => {
            errors.push("Guide 'blocks' must be an array".to_string());
            None
        }
        None => {
            errors.push("Guide is missing required array field 'blocks'".to_string());
            None
        }
    };
    if !errors.is_empty() {
        return ValidationReport::failure(errors);
    }
    let blocks = blocks.expect("checked above");

    let mut warnings = Vec::new();
    if blocks.is_empty() {
        warnings.push("Guide has no blocks".to_string());
    }

    validate_match_rules(root.get("match"), &mut errors);
    for (index, block) in blocks.iter().enumerate() {
        validate_block(block, &[index + 1], &mut errors);
    }

    if !errors.is_empty() {
        return ValidationReport {
            is_valid: false,
            errors,
            warnings,
            guide: None,
        };
    }

    match serde_json::from_value::<Guide>(value) {
        Ok(guide) => ValidationReport {
            is_valid: true,
            errors,
            warnings,
            guide: Some(guide),
        },
        // The structural walk should have caught anything serde rejects;
        // funnel the residue into one generic finding.
        Err(err) => ValidationReport::failure(vec![format!("Guide failed to deserialize: {err}")]),
    }
}

fn validate_match_rules(match_rules: Option<&Value>, errors: &mut Vec<String>) {
    let Some(match_rules) = match_rules else {
        return;
    };
    let Some(object) = match_rules.as_object() else {
        errors.push("Guide 'match' must be an object".to_string());
        return;
    };
    for key in ["urlPrefix", "tags"] {
        if let Some(field) = object.get(key) {
            if !field.is_array() {
                errors.push(format!("Guide 'match.{key}' must be an array"));
            }
        }
    }
}

/// Position label for a block: ancestors as `Block i`, the block itself
/// as `Block i (type)`.
fn block_label(path: &[usize], kind: Option<&str>) -> String {
    let mut label = String::new();
    for (depth, index) in path.iter().enumerate() {
        if depth > 0 {
            label.push_str(" > ");
        }
        label.push_str(&format!("Block {index}"));
    }
    if let Some(kind) = kind {
        label.push_str(&format!(" ({kind})"));
    }
    label
}

fn validate_block(block: &Value, path: &[usize], errors: &mut Vec<String>) {
    let Some(object) = block.as_object() else {
        errors.push(format!("{}: block must be a JSON object", block_label(path, None)));
        return;
    };
    let Some(kind_name) = object.get("type").and_then(Value::as_str) else {
        errors.push(format!(
            "{}: block is missing the 'type' field",
            block_label(path, None)
        ));
        return;
    };
    let Some(kind) = BlockKind::parse(kind_name) else {
        errors.push(format!(
            "{}: unknown block type '{kind_name}'",
            block_label(path, None)
        ));
        return;
    };

    let label = block_label(path, Some(kind_name));
    match kind {
        BlockKind::Markdown | BlockKind::Html => {
            require_string(object, "content", &label, errors);
        }
        BlockKind::Image | BlockKind::Video => {
            require_string(object, "src", &label, errors);
        }
        BlockKind::Section => {
            if let Some(title) = object.get("title") {
                if !title.is_string() {
                    errors.push(format!("{label}: 'title' must be a string"));
                }
            }
            match object.get("blocks") {
                Some(Value::Array(children)) => {
                    for (index, child) in children.iter().enumerate() {
                        let mut child_path = path.to_vec();
                        child_path.push(index + 1);
                        validate_block(child, &child_path, errors);
                    }
                }
                Some(_) => errors.push(format!("{label}: 'blocks' must be an array")),
                None => errors.push(format!("{label}: missing required array field 'blocks'")),
            }
        }
        BlockKind::Conditional => {
            match object.get("conditions") {
                Some(Value::Array(conditions)) => {
                    if conditions.is_empty() {
                        errors.push(format!("{label}: 'conditions' must not be empty"));
                    }
                    if !conditions.iter().all(Value::is_string) {
                        errors.push(format!("{label}: 'conditions' must contain only strings"));
                    }
                }
                Some(_) => errors.push(format!("{label}: 'conditions' must be an array")),
                None => {
                    errors.push(format!("{label}: missing required array field 'conditions'"))
                }
            }
            for branch in ["whenTrue", "whenFalse"] {
                match object.get(branch) {
                    None => {}
                    Some(Value::Array(children)) => {
                        for (index, child) in children.iter().enumerate() {
                            let mut child_path = path.to_vec();
                            child_path.push(index + 1);
                            validate_block(child, &child_path, errors);
                        }
                    }
                    Some(_) => errors.push(format!("{label}: '{branch}' must be an array")),
                }
            }
        }
        BlockKind::Interactive => {
            validate_action_fields(object, &label, errors);
        }
        BlockKind::Multistep | BlockKind::Guided => {
            match object.get("steps") {
                Some(Value::Array(steps)) => {
                    for (index, step) in steps.iter().enumerate() {
                        validate_step(step, index + 1, &label, errors);
                    }
                }
                Some(_) => errors.push(format!("{label}: 'steps' must be an array")),
                None => errors.push(format!("{label}: missing required array field 'steps'")),
            }
        }
        BlockKind::Quiz => {
            require_string(object, "question", &label, errors);
            let option_count = match object.get("options") {
                Some(Value::Array(options)) => {
                    if options.is_empty() {
                        errors.push(format!("{label}: 'options' must not be empty"));
                    }
                    if !options.iter().all(Value::is_string) {
                        errors.push(format!("{label}: 'options' must contain only strings"));
                    }
                    Some(options.len())
                }
                Some(_) => {
                    errors.push(format!("{label}: 'options' must be an array"));
                    None
                }
                None => {
                    errors.push(format!("{label}: missing required array field 'options'"));
                    None
                }
            };
            match object.get("correctAnswer").and_then(Value::as_u64) {
                Some(answer) => {
                    if let Some(count) = option_count {
                        if answer as usize >= count {
                            errors.push(format!(
                                "{label}: 'correctAnswer' {answer} is out of range for {count} option(s)"
                            ));
                        }
                    }
                }
                None => errors.push(format!(
                    "{label}: missing required non-negative integer field 'correctAnswer'"
                )),
            }
        }
        BlockKind::Input => {
            require_string(object, "prompt", &label, errors);
            if let Some(input_type) = object.get("inputType") {
                match input_type.as_str() {
                    Some(name) if waymark_api::InputType::parse(name).is_some() => {}
                    Some(name) => {
                        errors.push(format!("{label}: unknown input type '{name}'"));
                    }
                    None => errors.push(format!("{label}: 'inputType' must be a string")),
                }
            }
        }
    }
}

/// Shared rules for action-bearing shapes: the action must be a known
/// enum member; every action but `noop` needs a `reftarget`; `formfill`
/// also needs a `targetvalue`.
fn validate_action_fields(
    object: &serde_json::Map<String, Value>,
    label: &str,
    errors: &mut Vec<String>,
) -> Option<InteractiveAction> {
    let action = match object.get("action").and_then(Value::as_str) {
        Some(name) => match InteractiveAction::parse(name) {
            Some(action) => action,
            None => {
                errors.push(format!("{label}: unknown action '{name}'"));
                return None;
            }
        },
        None => {
            errors.push(format!("{label}: missing required string field 'action'"));
            return None;
        }
    };
    if action.requires_reftarget() && object.get("reftarget").and_then(Value::as_str).is_none() {
        errors.push(format!(
            "{label}: action '{action}' requires a string 'reftarget'"
        ));
    }
    if action.requires_value() && object.get("targetvalue").and_then(Value::as_str).is_none() {
        errors.push(format!(
            "{label}: action 'formfill' requires a string 'targetvalue'"
        ));
    }
    Some(action)
}

fn validate_step(step: &Value, step_number: usize, label: &str, errors: &mut Vec<String>) {
    let Some(object) = step.as_object() else {
        errors.push(format!("{label}: step {step_number} must be a JSON object"));
        return;
    };
    let step_label = format!("{label}: step {step_number}");
    validate_action_fields(object, &step_label, errors);
}

fn require_string(
    object: &serde_json::Map<String, Value>,
    key: &str,
    label: &str,
    errors: &mut Vec<String>,
) {
    if object.get(key).and_then(Value::as_str).is_none() {
        errors.push(format!("{label}: missing required string field '{key}'"));
    }
}
