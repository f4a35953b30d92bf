//! Wire models for the translation service
//!
//! JSON property names are wire-stable (`sourceUrl`, `targetUrl`,
//! `storageSource`, `glossaries`, ...) and must not change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Options for a single-text translate call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateOptions {
    /// Target language code (required)
    pub to: String,
    /// Source language code; the service auto-detects when absent
    pub from: Option<String>,
    /// Custom translation category
    pub category: Option<String>,
    /// Whether the input is plain text or HTML
    pub text_type: Option<TextType>,
    /// How profanity should be handled
    pub profanity_action: Option<ProfanityAction>,
    /// Request word alignment information
    pub include_alignment: Option<bool>,
    /// Request sentence boundary lengths
    pub include_sentence_length: Option<bool>,
}

impl TranslateOptions {
    /// Create options targeting the given language
    pub fn new(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            from: None,
            category: None,
            text_type: None,
            profanity_action: None,
            include_alignment: None,
            include_sentence_length: None,
        }
    }

    /// Set the source language instead of auto-detection
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Set the translation category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the input text type
    pub fn with_text_type(mut self, text_type: TextType) -> Self {
        self.text_type = Some(text_type);
        self
    }

    /// Set the profanity handling mode
    pub fn with_profanity_action(mut self, action: ProfanityAction) -> Self {
        self.profanity_action = Some(action);
        self
    }

    /// Request word alignment information
    pub fn with_alignment(mut self) -> Self {
        self.include_alignment = Some(true);
        self
    }

    /// Request sentence boundary lengths
    pub fn with_sentence_length(mut self) -> Self {
        self.include_sentence_length = Some(true);
        self
    }
}

/// Input text type for translate calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextType {
    /// Plain text input
    Plain,
    /// HTML input; markup is preserved
    Html,
}

impl fmt::Display for TextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextType::Plain => write!(f, "plain"),
            TextType::Html => write!(f, "html"),
        }
    }
}

/// Profanity handling mode for translate calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfanityAction {
    /// Pass profanity through untouched
    NoAction,
    /// Replace profanity with a marker
    Marked,
    /// Remove profanity from the output
    Deleted,
}

impl fmt::Display for ProfanityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfanityAction::NoAction => write!(f, "NoAction"),
            ProfanityAction::Marked => write!(f, "Marked"),
            ProfanityAction::Deleted => write!(f, "Deleted"),
        }
    }
}

/// Result for one input text of a translate call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResult {
    /// Detected source language, when the service guessed one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<DetectedLanguage>,
    /// One translation per requested target language
    pub translations: Vec<Translation>,
}

/// A detected-language guess
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedLanguage {
    /// Detected language code
    pub language: String,
    /// Confidence score, 0.0 to 1.0
    pub score: f64,
}

/// A single translated string
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Translation {
    /// Translated text
    pub text: String,
    /// Target language code
    pub to: String,
}

/// A batch translation submission: one or more inputs, each mapping a
/// source container to one or more target containers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSubmissionRequest {
    /// Input descriptors, each with one source and one-or-more targets
    pub inputs: Vec<BatchInput>,
}

impl BatchSubmissionRequest {
    /// Create a submission from input descriptors
    pub fn new(inputs: Vec<BatchInput>) -> Self {
        Self { inputs }
    }
}

/// One source-to-targets unit of a batch submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchInput {
    /// Where the input documents live
    pub source: SourceInput,
    /// Where translated documents are written, one entry per target language
    pub targets: Vec<TargetInput>,
    /// Whether the source URL points at a folder or a single file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<StorageType>,
}

impl BatchInput {
    /// Create an input from a source and its targets
    pub fn new(source: SourceInput, targets: Vec<TargetInput>) -> Self {
        Self {
            source,
            targets,
            storage_type: None,
        }
    }

    /// Set the storage type of the source URL
    pub fn with_storage_type(mut self, storage_type: StorageType) -> Self {
        self.storage_type = Some(storage_type);
        self
    }
}

/// Source of the input documents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInput {
    /// Location of the folder / container or single file with the documents
    pub source_url: String,
    /// Optional filename filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<DocumentFilter>,
    /// Language code; the service auto-detects per document when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Storage backend holding the documents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_source: Option<StorageSource>,
}

impl SourceInput {
    /// Create a source pointing at the given URL
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            filter: None,
            language: None,
            storage_source: None,
        }
    }

    /// Set the source language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Restrict the input documents by filename prefix/suffix
    pub fn with_filter(mut self, filter: DocumentFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the storage backend
    pub fn with_storage_source(mut self, storage_source: StorageSource) -> Self {
        self.storage_source = Some(storage_source);
        self
    }
}

/// Filename filter applied to the source documents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentFilter {
    /// Only documents whose name starts with this prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Only documents whose name ends with this suffix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

/// Destination for translated documents in one target language
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInput {
    /// Location of the folder / container the translations are written to
    pub target_url: String,
    /// Custom translation category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Target language code
    pub language: String,
    /// Glossaries applied during translation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glossaries: Option<Vec<Glossary>>,
    /// Storage backend the translations are written to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_source: Option<StorageSource>,
}

impl TargetInput {
    /// Create a target for the given URL and language
    pub fn new(target_url: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            category: None,
            language: language.into(),
            glossaries: None,
            storage_source: None,
        }
    }

    /// Set the translation category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Attach a glossary to this target
    pub fn with_glossary(mut self, glossary: Glossary) -> Self {
        self.glossaries.get_or_insert_with(Vec::new).push(glossary);
        self
    }

    /// Set the storage backend
    pub fn with_storage_source(mut self, storage_source: StorageSource) -> Self {
        self.storage_source = Some(storage_source);
        self
    }
}

/// A user-supplied term-mapping resource applied during batch translation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Glossary {
    /// Location of the glossary file
    pub glossary_url: String,
    /// Glossary file format, e.g. "TSV"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Format version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Storage backend holding the glossary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_source: Option<StorageSource>,
}

impl Glossary {
    /// Create a glossary reference for the given URL
    pub fn new(glossary_url: impl Into<String>) -> Self {
        Self {
            glossary_url: glossary_url.into(),
            format: None,
            version: None,
            storage_source: None,
        }
    }

    /// Set the glossary file format
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// Whether a storage URL points at a folder or a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageType {
    /// The URL is a folder / container of documents
    Folder,
    /// The URL is a single document
    File,
}

/// Storage backend kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageSource {
    /// Azure Blob Storage container
    AzureBlob,
}

/// Status of a batch job or of a single document within it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Queued, no work started yet
    NotStarted,
    /// Documents are being translated
    Running,
    /// All documents translated
    Succeeded,
    /// The job finished with failures
    Failed,
    /// The job was cancelled
    Cancelled,
    /// The submission did not pass validation
    ValidationFailed,
}

impl JobStatus {
    /// Whether this status is final; a terminal job never changes state again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded
                | JobStatus::Failed
                | JobStatus::Cancelled
                | JobStatus::ValidationFailed
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::NotStarted => write!(f, "NotStarted"),
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Succeeded => write!(f, "Succeeded"),
            JobStatus::Failed => write!(f, "Failed"),
            JobStatus::Cancelled => write!(f, "Cancelled"),
            JobStatus::ValidationFailed => write!(f, "ValidationFailed"),
        }
    }
}

/// State of a submitted batch job as reported by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchJobState {
    /// Server-assigned job identifier
    pub id: String,
    /// When the job was created
    pub created_date_time_utc: DateTime<Utc>,
    /// When the job last changed state
    pub last_action_date_time_utc: DateTime<Utc>,
    /// Current job status
    pub status: JobStatus,
    /// Per-document progress counts
    pub summary: StatusSummary,
}

/// Per-document progress counts for a batch job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    /// Total number of documents in the job
    pub total: u64,
    /// Documents that failed
    pub failed: u64,
    /// Documents translated successfully
    pub success: u64,
    /// Documents currently being translated
    pub in_progress: u64,
    /// Documents not picked up yet
    pub not_yet_started: u64,
    /// Documents cancelled before translation
    pub cancelled: u64,
}

/// Status of one document within a batch job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatus {
    /// Server-assigned document identifier
    pub id: String,
    /// Location of the translated document
    pub path: String,
    /// When translation of this document was created
    pub created_date_time_utc: DateTime<Utc>,
    /// When this document last changed state
    pub last_action_date_time_utc: DateTime<Utc>,
    /// Current document status
    pub status: JobStatus,
    /// Target language of this document
    pub to: String,
    /// Translation progress, 0.0 to 1.0
    pub progress: f64,
}
