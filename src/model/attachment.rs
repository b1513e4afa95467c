//! Attachment metadata consumed by the bubble layout.
//!
//! Descriptors reference attachments that are already stored locally.
//! The bytes themselves are never touched here.

use serde::{Deserialize, Serialize};

use crate::error::{ChatCellError, Result};

/// Broad content category, used to pick the bubble icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentKind {
    Image,
    Video,
    Audio,
    Document,
    Archive,
    Other,
}

impl AttachmentKind {
    /// Classify a MIME content type (`"image/png"`, `"application/zip"`, …).
    pub fn from_content_type(content_type: &str) -> Self {
        let lower = content_type.trim().to_ascii_lowercase();
        let (top, sub) = lower.split_once('/').unwrap_or((lower.as_str(), ""));
        match top {
            "image" => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            "text" => Self::Document,
            "application" => match sub {
                "pdf" | "msword" | "rtf" | "json" | "xml" => Self::Document,
                s if s.starts_with("vnd.openxmlformats")
                    || s.starts_with("vnd.oasis.opendocument")
                    || s.starts_with("vnd.ms-") =>
                {
                    Self::Document
                }
                "zip" | "gzip" | "x-tar" | "x-7z-compressed" | "x-rar-compressed"
                | "x-bzip2" | "x-xz" => Self::Archive,
                _ => Self::Other,
            },
            _ => Self::Other,
        }
    }

    /// Short glyph drawn in the icon slot of the bubble.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Image => "IMG",
            Self::Video => "VID",
            Self::Audio => "AUD",
            Self::Document => "DOC",
            Self::Archive => "ZIP",
            Self::Other => "BIN",
        }
    }

    /// Label used when the attachment carries no filename.
    pub fn fallback_label(self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Document => "Document",
            Self::Archive => "Archive",
            Self::Other => "Attachment",
        }
    }
}

/// A resolved attachment, as handed over by the attachment store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentDescriptor {
    /// MIME content type (e.g. `"image/jpeg"`, `"application/pdf"`).
    pub content_type: String,

    /// Original filename, if the sender provided one.
    #[serde(default)]
    pub filename: Option<String>,

    /// Size in bytes of the stored attachment.
    pub size: u64,
}

impl AttachmentDescriptor {
    pub fn new(content_type: impl Into<String>, filename: Option<String>, size: u64) -> Self {
        Self {
            content_type: content_type.into(),
            filename,
            size,
        }
    }

    /// Reject descriptors that cannot be rendered.
    ///
    /// The content type must have the `type/subtype` shape with both halves
    /// present; everything else about the descriptor has a usable fallback.
    pub fn validate(&self) -> Result<()> {
        let ct = self.content_type.trim();
        if ct.is_empty() {
            return Err(ChatCellError::InvalidAttachment(
                "missing content type".to_string(),
            ));
        }
        match ct.split_once('/') {
            Some((top, sub)) if !top.is_empty() && !sub.is_empty() && !sub.contains('/') => Ok(()),
            _ => Err(ChatCellError::InvalidAttachment(format!(
                "malformed content type '{ct}'"
            ))),
        }
    }

    pub fn kind(&self) -> AttachmentKind {
        AttachmentKind::from_content_type(&self.content_type)
    }

    /// Name shown in the bubble: the filename, or a label derived from the kind.
    pub fn display_name(&self) -> &str {
        match self.filename.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => self.kind().fallback_label(),
        }
    }

    /// Human-readable size (`"1.5 MiB"`).
    pub fn display_size(&self) -> String {
        humansize::format_size(self.size, humansize::BINARY)
    }
}
