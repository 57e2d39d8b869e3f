use std::ffi::OsStr;
use std::path::Path;

use mime::Mime;
use serde::{Deserialize, Serialize};

/// Accepted license document formats. Anything else is rejected before the
/// vault is contacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseFormat {
    Pdf,
    Png,
    Jpeg,
    Webp,
}

impl LicenseFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension
            .trim_start_matches('.')
            .to_ascii_lowercase()
            .as_str()
        {
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn from_content_type(raw: &str) -> Option<Self> {
        let mime: Mime = raw.trim().parse().ok()?;
        match mime.essence_str() {
            "application/pdf" => Some(Self::Pdf),
            "image/png" => Some(Self::Png),
            "image/jpeg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LicenseError {
    #[error("license document is empty")]
    EmptyDocument,
    #[error("unsupported license type '{0}': allowed types are .pdf, .png, .jpg, .jpeg, .webp")]
    UnsupportedType(String),
}

/// Raw upload as received from the caller, described either by an HTTP
/// content type or by the picked file's name.
#[derive(Debug, Clone)]
pub struct LicenseUpload {
    detected: Option<LicenseFormat>,
    declared: String,
    payload: Vec<u8>,
}

impl LicenseUpload {
    pub fn from_content_type(content_type: &str, payload: Vec<u8>) -> Self {
        Self {
            detected: LicenseFormat::from_content_type(content_type),
            declared: content_type.to_string(),
            payload,
        }
    }

    pub fn from_file_name(file_name: &str, payload: Vec<u8>) -> Self {
        let detected = Path::new(file_name)
            .extension()
            .and_then(OsStr::to_str)
            .and_then(LicenseFormat::from_extension);
        Self {
            detected,
            declared: file_name.to_string(),
            payload,
        }
    }

    /// Runs the allow-list and payload checks. This is the gate the
    /// verification transition relies on to fail before any network call.
    pub fn validate(self) -> Result<ValidatedLicense, LicenseError> {
        if self.payload.is_empty() {
            return Err(LicenseError::EmptyDocument);
        }

        let format = self
            .detected
            .ok_or(LicenseError::UnsupportedType(self.declared))?;

        Ok(ValidatedLicense {
            format,
            payload: self.payload,
        })
    }
}

/// Upload that passed validation and may be handed to the document vault.
#[derive(Debug, Clone)]
pub struct ValidatedLicense {
    pub format: LicenseFormat,
    pub payload: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_listed_extensions_resolve() {
        assert_eq!(LicenseFormat::from_extension("PDF"), Some(LicenseFormat::Pdf));
        assert_eq!(LicenseFormat::from_extension(".jpg"), Some(LicenseFormat::Jpeg));
        assert_eq!(LicenseFormat::from_extension("jpeg"), Some(LicenseFormat::Jpeg));
        assert_eq!(LicenseFormat::from_extension("webp"), Some(LicenseFormat::Webp));
        assert_eq!(LicenseFormat::from_extension("gif"), None);
    }

    #[test]
    fn content_types_resolve() {
        assert_eq!(
            LicenseFormat::from_content_type("application/pdf"),
            Some(LicenseFormat::Pdf)
        );
        assert_eq!(
            LicenseFormat::from_content_type("image/png; charset=binary"),
            Some(LicenseFormat::Png)
        );
        assert_eq!(LicenseFormat::from_content_type("text/html"), None);
        assert_eq!(LicenseFormat::from_content_type("not a mime"), None);
    }

    #[test]
    fn empty_payload_rejected_before_type_check() {
        let upload = LicenseUpload::from_content_type("application/pdf", Vec::new());
        assert!(matches!(upload.validate(), Err(LicenseError::EmptyDocument)));
    }

    #[test]
    fn disallowed_type_carries_the_declared_name() {
        let upload = LicenseUpload::from_file_name("license.gif", vec![1, 2, 3]);
        match upload.validate() {
            Err(LicenseError::UnsupportedType(declared)) => {
                assert_eq!(declared, "license.gif");
            }
            other => panic!("expected unsupported type, got {other:?}"),
        }
    }

    #[test]
    fn valid_upload_passes_through() {
        let upload = LicenseUpload::from_file_name("license.pdf", vec![0x25, 0x50, 0x44, 0x46]);
        let license = upload.validate().expect("valid upload");
        assert_eq!(license.format, LicenseFormat::Pdf);
        assert_eq!(license.payload.len(), 4);
    }
}
