//! Turns `key=value` command-line input into a create or update payload for
//! one resource, checking it against the resource's field catalog first.

use crate::core::mutation::MutationPayload;
use crate::domain::http::FormPayload;
use crate::domain::resources::{FieldKind, FormField, ResourceSpec, UPLOAD_EXTENSIONS};
use crate::utils::error::{AdminError, Result};
use crate::utils::validation::{validate_email, validate_file_extensions, validate_non_empty_string};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub fields: BTreeMap<String, String>,
    pub files: BTreeMap<String, PathBuf>,
}

impl FormInput {
    /// Parses `--field key=value` and `--file key=path` arguments.
    pub fn parse(fields: &[String], files: &[String]) -> Result<Self> {
        let mut input = FormInput::default();
        for raw in fields {
            let (key, value) = split_pair(raw)?;
            input.fields.insert(key, value);
        }
        for raw in files {
            let (key, path) = split_pair(raw)?;
            input.files.insert(key, PathBuf::from(path));
        }
        Ok(input)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }
}

fn split_pair(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| AdminError::validation(format!("expected key=value, got '{}'", raw)))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(AdminError::validation(format!("missing field name in '{}'", raw)));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Validates `input` for `spec` and encodes it the way the resource expects.
///
/// Adding requires every required field; editing sends only what was given.
pub fn build_payload(
    spec: &ResourceSpec,
    input: &FormInput,
    mode: FormMode,
) -> Result<MutationPayload> {
    if mode == FormMode::Edit && input.is_empty() {
        return Err(AdminError::validation(format!(
            "nothing to update for {}, pass at least one --field or --file",
            spec.name
        )));
    }

    check_known_keys(spec, input)?;

    let form_fields = spec.form_fields();
    if mode == FormMode::Add {
        for field in form_fields.iter().filter(|f| f.spec.required) {
            let present = if field.spec.is_upload() {
                input.files.contains_key(&field.key)
            } else {
                input.fields.contains_key(&field.key)
            };
            if !present {
                return Err(AdminError::field(&field.key, format!("{} is required", field.label)));
            }
        }
    }

    let mut values: Vec<(&FormField, Value)> = Vec::new();
    let mut files: Vec<(&FormField, &Path)> = Vec::new();
    for field in &form_fields {
        if let Some(raw) = input.fields.get(&field.key) {
            values.push((field, parse_value(field, raw)?));
        }
        if let Some(path) = input.files.get(&field.key) {
            check_upload(field, path)?;
            files.push((field, path.as_path()));
        }
    }

    if spec.is_multipart() {
        let mut form = FormPayload::new();
        for (field, value) in values {
            form = form.text(field.key.clone(), form_text(&value));
        }
        for (field, path) in files {
            form = form.file(field.key.clone(), path);
        }
        Ok(MutationPayload::Form(form))
    } else {
        let body: Map<String, Value> = values
            .into_iter()
            .map(|(field, value)| (field.key.clone(), value))
            .collect();
        Ok(MutationPayload::Json(Value::Object(body)))
    }
}

fn check_known_keys(spec: &ResourceSpec, input: &FormInput) -> Result<()> {
    let known = spec.form_fields();
    let available = || {
        known
            .iter()
            .map(|f| f.key.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    for key in input.fields.keys() {
        match known.iter().find(|f| &f.key == key) {
            None => {
                return Err(AdminError::field(
                    key,
                    format!("unknown field for {} (fields: {})", spec.name, available()),
                ))
            }
            Some(field) if field.spec.is_upload() => {
                return Err(AdminError::field(key, "is a file field, pass it with --file"))
            }
            Some(_) => {}
        }
    }
    for key in input.files.keys() {
        match known.iter().find(|f| &f.key == key) {
            None => {
                return Err(AdminError::field(
                    key,
                    format!("unknown field for {} (fields: {})", spec.name, available()),
                ))
            }
            Some(field) if !field.spec.is_upload() => {
                return Err(AdminError::field(key, "is not a file field, pass it with --field"))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn parse_value(field: &FormField, raw: &str) -> Result<Value> {
    let key = field.key.as_str();
    let trimmed = raw.trim();
    match field.spec.kind {
        FieldKind::Text | FieldKind::LongText | FieldKind::Reference(_) => {
            validate_non_empty_string(key, trimmed)?;
            Ok(Value::String(trimmed.to_string()))
        }
        FieldKind::Email => {
            validate_email(key, trimmed)?;
            Ok(Value::String(trimmed.to_string()))
        }
        FieldKind::Number => parse_number(key, trimmed),
        FieldKind::Rating => match trimmed.parse::<u8>() {
            Ok(rate @ 1..=5) => Ok(Value::from(rate)),
            _ => Err(AdminError::field(key, "must be a whole number from 1 to 5")),
        },
        FieldKind::IdList(_) => parse_id_list(key, trimmed),
        FieldKind::Upload => Err(AdminError::field(key, "is a file field, pass it with --file")),
    }
}

fn parse_number(key: &str, raw: &str) -> Result<Value> {
    if let Ok(whole) = raw.parse::<i64>() {
        return Ok(Value::from(whole));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| AdminError::field(key, format!("'{}' is not a number", raw)))
}

/// Accepts either `a,b,c` or a JSON array such as `["a","b"]`.
fn parse_id_list(key: &str, raw: &str) -> Result<Value> {
    if raw.starts_with('[') {
        let ids: Vec<Value> = serde_json::from_str(raw)
            .map_err(|e| AdminError::field(key, format!("invalid id list: {}", e)))?;
        return Ok(Value::Array(ids));
    }
    let ids: Vec<Value> = raw
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| Value::String(id.to_string()))
        .collect();
    Ok(Value::Array(ids))
}

fn check_upload(field: &FormField, path: &Path) -> Result<()> {
    validate_file_extensions(&field.key, &[path], UPLOAD_EXTENSIONS)?;
    if !path.is_file() {
        return Err(AdminError::field(
            &field.key,
            format!("file not found: {}", path.display()),
        ));
    }
    Ok(())
}

/// Multipart text: strings as-is, everything else as JSON text.
fn form_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resources::find;
    use serde_json::json;
    use tempfile::TempDir;

    fn input(fields: &[&str], files: &[&str]) -> FormInput {
        let fields: Vec<String> = fields.iter().map(|s| s.to_string()).collect();
        let files: Vec<String> = files.iter().map(|s| s.to_string()).collect();
        FormInput::parse(&fields, &files).unwrap()
    }

    #[test]
    fn test_parse_pairs() {
        let parsed = input(&["title=Silk Road", "price=1200=net"], &["file=/tmp/a.png"]);
        assert_eq!(parsed.fields["title"], "Silk Road");
        assert_eq!(parsed.fields["price"], "1200=net");
        assert_eq!(parsed.files["file"], PathBuf::from("/tmp/a.png"));

        let err = FormInput::parse(&["title".to_string()], &[]).unwrap_err();
        assert!(matches!(err, AdminError::ValidationError { .. }));
        assert!(FormInput::parse(&["=x".to_string()], &[]).is_err());
    }

    #[test]
    fn test_json_resource_payload() {
        let operators = find("operators").unwrap();
        let payload = build_payload(
            operators,
            &input(
                &["phone=+998901234567", "email=ops@example.com", "workTime=9-18"],
                &[],
            ),
            FormMode::Add,
        )
        .unwrap();

        assert_eq!(
            payload,
            MutationPayload::Json(json!({
                "phone": "+998901234567",
                "email": "ops@example.com",
                "workTime": "9-18"
            }))
        );
    }

    #[test]
    fn test_add_requires_required_fields() {
        let services = find("services").unwrap();
        let err = build_payload(services, &input(&["title=Guide"], &[]), FormMode::Add)
            .unwrap_err();
        match err {
            AdminError::FieldValidationError { field, .. } => assert_eq!(field, "levelId"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_edit_sends_only_given_fields() {
        let services = find("services").unwrap();
        let payload =
            build_payload(services, &input(&["title=Transfer"], &[]), FormMode::Edit).unwrap();
        assert_eq!(payload, MutationPayload::Json(json!({"title": "Transfer"})));

        let err = build_payload(services, &FormInput::default(), FormMode::Edit).unwrap_err();
        assert!(err.to_string().contains("nothing to update"));
    }

    #[test]
    fn test_field_kind_checks() {
        let designers = find("travel-designers").unwrap();
        let err = build_payload(designers, &input(&["email=not-an-email"], &[]), FormMode::Edit)
            .unwrap_err();
        assert!(matches!(err, AdminError::FieldValidationError { .. }));

        let reviews = find("reviews").unwrap();
        assert!(build_payload(reviews, &input(&["rate=6"], &[]), FormMode::Edit).is_err());
        assert!(build_payload(reviews, &input(&["rate=4"], &[]), FormMode::Edit).is_ok());

        let days = find("days").unwrap();
        assert!(build_payload(days, &input(&["lat=north"], &[]), FormMode::Edit).is_err());
        assert!(build_payload(days, &input(&["bogus=1"], &[]), FormMode::Edit).is_err());
        assert!(build_payload(days, &input(&["image=a.png"], &[]), FormMode::Edit).is_err());
    }

    #[test]
    fn test_multipart_payload_with_upload() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("registan.JPG");
        std::fs::write(&image, b"jpeg").unwrap();
        let image_arg = format!("image={}", image.display());

        let days = find("days").unwrap();
        let payload = build_payload(
            days,
            &input(
                &[
                    "title=Samarkand",
                    "destination=Samarkand",
                    "text=Registan square",
                    "travelId=t1",
                    "lat=39.65",
                    "long=66.97",
                ],
                &[&image_arg],
            ),
            FormMode::Add,
        )
        .unwrap();

        let MutationPayload::Form(form) = payload else {
            panic!("expected multipart payload");
        };
        assert_eq!(form.get("lat"), Some("39.65"));
        assert_eq!(form.get("travelId"), Some("t1"));
        assert_eq!(form.files.len(), 1);
        assert_eq!(form.files[0].name, "image");
    }

    #[test]
    fn test_upload_extension_and_existence() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("notes.pdf");
        std::fs::write(&doc, b"pdf").unwrap();

        let sub_travels = find("sub-travels").unwrap();
        let wrong_ext = format!("image={}", doc.display());
        assert!(build_payload(sub_travels, &input(&[], &[&wrong_ext]), FormMode::Edit).is_err());

        let missing = format!("image={}", dir.path().join("gone.png").display());
        let err = build_payload(sub_travels, &input(&[], &[&missing]), FormMode::Edit).unwrap_err();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_id_list_is_sent_as_json_array_text() {
        let travels = find("travels").unwrap();
        let payload = build_payload(
            travels,
            &input(&["subTravelIds=s1, s2"], &[]),
            FormMode::Edit,
        )
        .unwrap();
        let MutationPayload::Form(form) = payload else {
            panic!("expected multipart payload");
        };
        assert_eq!(form.get("subTravelIds"), Some(r#"["s1","s2"]"#));

        let payload = build_payload(
            travels,
            &input(&[r#"subTravelIds=["s3"]"#], &[]),
            FormMode::Edit,
        )
        .unwrap();
        let MutationPayload::Form(form) = payload else {
            panic!("expected multipart payload");
        };
        assert_eq!(form.get("subTravelIds"), Some(r#"["s3"]"#));
    }
}
