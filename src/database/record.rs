use serde_json::{Map, Value};

/// Errors raised while turning client input into a storable record
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Field '{0}' cannot be modified")]
    ImmutableField(&'static str),
    #[error("No updatable fields supplied")]
    NoUpdatableFields,
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),
    #[error("Invalid value for field '{field}': expected {expected}")]
    InvalidFieldType { field: String, expected: &'static str },
    #[error("Invalid question type '{0}'")]
    InvalidQuestionType(String),
}

/// Mutability rules for one resource type.
///
/// `mutable` is the allow-list a partial update is filtered against.
/// `immutable` names server-controlled fields; submitting one of them is an
/// error rather than a silent drop.
#[derive(Debug, Clone, Copy)]
pub struct FieldPolicy {
    pub mutable: &'static [&'static str],
    pub immutable: &'static [&'static str],
}

impl FieldPolicy {
    /// Validate a submitted patch: reject server-controlled keys, then keep
    /// only allow-listed ones.
    pub fn apply(&self, submitted: &Map<String, Value>) -> Result<Map<String, Value>, RecordError> {
        reject_immutable(submitted, self.immutable)?;
        filter_update(submitted, self.mutable)
    }
}

pub const SURVEY_FIELDS: FieldPolicy = FieldPolicy {
    mutable: &["title", "description", "category", "published"],
    immutable: &["_id", "id", "author", "date_posted", "anonymous"],
};

/// Keep only the keys present in `allowed`, values untouched.
///
/// Fails with [`RecordError::NoUpdatableFields`] when nothing survives.
pub fn filter_update(
    submitted: &Map<String, Value>,
    allowed: &[&str],
) -> Result<Map<String, Value>, RecordError> {
    let filtered: Map<String, Value> = submitted
        .iter()
        .filter(|(key, _)| allowed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    if filtered.is_empty() {
        return Err(RecordError::NoUpdatableFields);
    }
    Ok(filtered)
}

fn reject_immutable(submitted: &Map<String, Value>, immutable: &'static [&'static str]) -> Result<(), RecordError> {
    match immutable.iter().find(|field| submitted.contains_key(**field)) {
        Some(field) => Err(RecordError::ImmutableField(*field)),
        None => Ok(()),
    }
}

/// Interpret a request body as a JSON object. An empty body is an empty object.
pub fn object_from_bytes(bytes: &[u8]) -> Result<Map<String, Value>, RecordError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(RecordError::InvalidJson("Expected JSON object".to_string())),
        Err(e) => Err(RecordError::InvalidJson(e.to_string())),
    }
}

/// Required, non-empty string field.
pub fn required_string(fields: &Map<String, Value>, key: &str) -> Result<String, RecordError> {
    match optional_string(fields, key)? {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(RecordError::MissingRequiredField(key.to_string())),
    }
}

/// Optional string field; `null` counts as absent.
pub fn optional_string(fields: &Map<String, Value>, key: &str) -> Result<Option<String>, RecordError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(RecordError::InvalidFieldType {
            field: key.to_string(),
            expected: "string",
        }),
    }
}

pub fn optional_bool(fields: &Map<String, Value>, key: &str) -> Result<Option<bool>, RecordError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(RecordError::InvalidFieldType {
            field: key.to_string(),
            expected: "boolean",
        }),
    }
}
