use crate::domain::model::EmitKind;
use crate::utils::error::{OstaError, Result};
use std::collections::HashSet;

/// Extension every osta source file must carry.
pub const SOURCE_EXTENSION: &str = "osta";

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(OstaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(OstaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OstaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_file_extensions(field_name: &str, files: &[String], allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        validate_path(field_name, file)?;
        match std::path::Path::new(file).extension().and_then(|ext| ext.to_str()) {
            Some(extension) if allowed_set.contains(extension) => {}
            Some(extension) => {
                return Err(OstaError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(OstaError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_sources(field_name: &str, sources: &[String]) -> Result<()> {
    if sources.is_empty() {
        return Err(OstaError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    validate_file_extensions(field_name, sources, &[SOURCE_EXTENSION])
}

/// Parses emit kind names, rejecting unknown ones.
pub fn parse_emit_kinds(field_name: &str, names: &[String]) -> Result<Vec<EmitKind>> {
    let mut kinds = Vec::with_capacity(names.len());
    for name in names {
        let kind = EmitKind::from_name(name).ok_or_else(|| OstaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.clone(),
            reason: format!(
                "Unsupported emit kind. Valid kinds: {}",
                EmitKind::ALL.iter().map(|k| k.name()).collect::<Vec<_>>().join(", ")
            ),
        })?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}
