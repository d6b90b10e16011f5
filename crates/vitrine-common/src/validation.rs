//! Input validation utilities.
//!
//! Centralized validation helpers used across API routes.

use validator::Validate;

use crate::error::VitrineError;

/// Validate a request body, returning a VitrineError::Validation on failure.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), VitrineError> {
    body.validate().map_err(|e| VitrineError::Validation {
        message: format_validation_errors(e),
    })
}

/// Format validation errors into a human-readable string.
fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// File extensions accepted for uploaded model binaries.
pub const ALLOWED_MODEL_EXTENSIONS: &[&str] = &["glb", "gltf", "usdz"];

/// Validate an uploaded filename against the allowed model extensions.
pub fn validate_model_extension(filename: &str) -> Result<(), VitrineError> {
    let ext = filename
        .rsplit('.')
        .next()
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if filename.contains('.') && ALLOWED_MODEL_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(VitrineError::Validation {
            message: format!(
                "File extension '.{ext}' is not a supported model format (glb, gltf, usdz)"
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_supported_extensions() {
        assert!(validate_model_extension("chair.glb").is_ok());
        assert!(validate_model_extension("scene.GLTF").is_ok());
        assert!(validate_model_extension("statue.usdz").is_ok());
    }

    #[test]
    fn rejects_unsupported_extensions() {
        assert!(validate_model_extension("malware.exe").is_err());
        assert!(validate_model_extension("model.obj").is_err());
        assert!(validate_model_extension("noextension").is_err());
    }
}
