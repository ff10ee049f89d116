//! Request options and response helpers

use std::fmt;
use std::path::PathBuf;

use crate::core::decoder::DecodedNode;

/// Upper bound on `custom0`..`custom9` parameters
pub const MAX_CUSTOM_FIELDS: usize = 10;

/// Query parameters as sent on the wire
pub type Params = Vec<(String, String)>;

/// Service type for quotes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Translation only
    Translation,
    /// Proofreading only
    Proofreading,
    /// Translation followed by proofreading
    Transproof,
    /// Transcription of audio or video
    Transcription,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Translation => write!(f, "translation"),
            Service::Proofreading => write!(f, "proofreading"),
            Service::Transproof => write!(f, "transproof"),
            Service::Transcription => write!(f, "transcription"),
        }
    }
}

/// Quote currency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    /// US dollars
    Usd,
    /// Euros
    Eur,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Usd => write!(f, "USD"),
            Currency::Eur => write!(f, "EUR"),
        }
    }
}

/// Who a project rating is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingType {
    /// Rating of the customer
    Customer,
    /// Rating of the delivered service
    Service,
}

impl fmt::Display for RatingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatingType::Customer => write!(f, "Customer"),
            RatingType::Service => write!(f, "Service"),
        }
    }
}

/// Content fetch mode for resource details
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceFetch {
    /// Metadata only
    False,
    /// Include content, base64 encoded
    Base64,
}

impl fmt::Display for ResourceFetch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceFetch::False => write!(f, "false"),
            ResourceFetch::Base64 => write!(f, "base64"),
        }
    }
}

/// Source of a new file resource
#[derive(Debug, Clone)]
pub enum FileResource {
    /// Upload a local file as multipart form data
    Upload {
        /// Local file to read
        path: PathBuf,
        /// Name stored on the server; the local name when unset
        file_name: Option<String>,
        /// Mime type override
        file_mime: Option<String>,
    },
    /// Create the file from inline text
    Content {
        /// Name stored on the server
        file_name: String,
        /// File body
        content: String,
        /// Mime type override
        file_mime: Option<String>,
    },
}

impl FileResource {
    /// Resource read from a local file
    pub fn upload(path: impl Into<PathBuf>) -> Self {
        FileResource::Upload {
            path: path.into(),
            file_name: None,
            file_mime: None,
        }
    }

    /// Resource created from inline text
    pub fn content(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        FileResource::Content {
            file_name: file_name.into(),
            content: content.into(),
            file_mime: None,
        }
    }

    /// Set the mime type
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        match &mut self {
            FileResource::Upload { file_mime, .. } | FileResource::Content { file_mime, .. } => {
                *file_mime = Some(mime.into());
            }
        }
        self
    }

    /// Override the stored name of an uploaded file
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        match &mut self {
            FileResource::Upload { file_name, .. } => *file_name = Some(name.into()),
            FileResource::Content { file_name, .. } => *file_name = name.into(),
        }
        self
    }

    /// Query parameters describing the resource
    pub fn params(&self) -> Params {
        let mut params = Params::new();
        match self {
            FileResource::Upload {
                file_name,
                file_mime,
                ..
            } => {
                push_opt(&mut params, "file_name", file_name.as_deref());
                push_opt(&mut params, "file_mime", file_mime.as_deref());
            }
            FileResource::Content {
                file_name,
                content,
                file_mime,
            } => {
                push(&mut params, "file_name", file_name);
                push_opt(&mut params, "file_mime", file_mime.as_deref());
                push(&mut params, "file_content", content);
            }
        }
        params
    }
}

/// Optional settings shared by project creation calls
#[derive(Debug, Clone, Default)]
pub struct ProjectOptions {
    /// Overrides automatic word counting
    pub word_count: Option<u64>,
    /// Note for the linguist
    pub notes: Option<String>,
    /// Expertise code, see [`OhtClient::expertises`](crate::OhtClient::expertises)
    pub expertise: Option<String>,
    /// URL notified when the project changes state
    pub callback_url: Option<String>,
    /// Sent as `custom0`..`custom9`; extra items are dropped
    pub custom: Vec<String>,
    /// Project name shown in the dashboard
    pub name: Option<String>,
}

impl ProjectOptions {
    /// Options with nothing set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `word_count`
    pub fn with_word_count(mut self, word_count: u64) -> Self {
        self.word_count = Some(word_count);
        self
    }

    /// Set `notes`
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Set `expertise`
    pub fn with_expertise(mut self, expertise: impl Into<String>) -> Self {
        self.expertise = Some(expertise.into());
        self
    }

    /// Set `callback_url`
    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    /// Append one custom value
    pub fn with_custom(mut self, custom: impl Into<String>) -> Self {
        self.custom.push(custom.into());
        self
    }

    /// Set `name`
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Query parameters for the set options
    pub fn params(&self) -> Params {
        let mut params = Params::new();
        if let Some(word_count) = self.word_count {
            push(&mut params, "wordCount", &word_count.to_string());
        }
        push_opt(&mut params, "notes", self.notes.as_deref());
        push_opt(&mut params, "expertise", self.expertise.as_deref());
        push_opt(&mut params, "callbackUrl", self.callback_url.as_deref());
        push_custom(&mut params, &self.custom);
        push_opt(&mut params, "name", self.name.as_deref());
        params
    }
}

/// Optional settings for transcription projects
#[derive(Debug, Clone, Default)]
pub struct TranscriptionOptions {
    /// Media length in seconds; counted automatically when unset
    pub length: Option<u64>,
    /// Note for the transcriber
    pub notes: Option<String>,
    /// URL notified when the project changes state
    pub callback_url: Option<String>,
    /// Sent as `custom0`..`custom9`
    pub custom: Vec<String>,
    /// Project name
    pub name: Option<String>,
}

impl TranscriptionOptions {
    /// Options with nothing set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `length`
    pub fn with_length(mut self, seconds: u64) -> Self {
        self.length = Some(seconds);
        self
    }

    /// Set `notes`
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Set `callback_url`
    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    /// Append one custom value
    pub fn with_custom(mut self, custom: impl Into<String>) -> Self {
        self.custom.push(custom.into());
        self
    }

    /// Set `name`
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Query parameters for the set options
    pub fn params(&self) -> Params {
        let mut params = Params::new();
        if let Some(length) = self.length {
            push(&mut params, "length", &length.to_string());
        }
        push_opt(&mut params, "notes", self.notes.as_deref());
        push_opt(&mut params, "callbackUrl", self.callback_url.as_deref());
        push_custom(&mut params, &self.custom);
        push_opt(&mut params, "name", self.name.as_deref());
        params
    }
}

/// Optional settings for quotes
#[derive(Debug, Clone, Default)]
pub struct QuoteOptions {
    /// Overrides the real word count; 0 means count each resource
    pub word_count: u64,
    /// Service to price
    pub service: Option<Service>,
    /// Expertise code
    pub expertise: Option<String>,
    /// Add proofreading to the quote
    pub proofreading: Option<bool>,
    /// Currency of the quoted price
    pub currency: Option<Currency>,
}

impl QuoteOptions {
    /// Options with nothing set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `word_count`
    pub fn with_word_count(mut self, word_count: u64) -> Self {
        self.word_count = word_count;
        self
    }

    /// Set `service`
    pub fn with_service(mut self, service: Service) -> Self {
        self.service = Some(service);
        self
    }

    /// Set `expertise`
    pub fn with_expertise(mut self, expertise: impl Into<String>) -> Self {
        self.expertise = Some(expertise.into());
        self
    }

    /// Set `proofreading`
    pub fn with_proofreading(mut self, proofreading: bool) -> Self {
        self.proofreading = Some(proofreading);
        self
    }

    /// Set `currency`
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    /// Query parameters for the set options
    pub fn params(&self) -> Params {
        let mut params = Params::new();
        push(&mut params, "wordcount", &self.word_count.to_string());
        if let Some(service) = self.service {
            push(&mut params, "service", &service.to_string());
        }
        push_opt(&mut params, "expertise", self.expertise.as_deref());
        if let Some(proofreading) = self.proofreading {
            push(&mut params, "proofreading", if proofreading { "1" } else { "0" });
        }
        if let Some(currency) = self.currency {
            push(&mut params, "currency", &currency.to_string());
        }
        params
    }
}

/// The `status` block every OHT response carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiStatus {
    /// 0 on success
    pub code: i64,
    /// Human readable message
    pub msg: String,
}

impl ApiStatus {
    /// Extract the status from a decoded response envelope
    pub fn from_node(node: &DecodedNode) -> Option<Self> {
        let status = node.get("status")?;
        Some(Self {
            code: status.get("code")?.as_i64()?,
            msg: status
                .get("msg")
                .and_then(DecodedNode::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }

    /// Whether the call succeeded
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.msg, self.code)
    }
}

pub(crate) fn push(params: &mut Params, key: &str, value: &str) {
    params.push((key.to_string(), value.to_string()));
}

pub(crate) fn push_opt(params: &mut Params, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        push(params, key, value);
    }
}

fn push_custom(params: &mut Params, custom: &[String]) {
    for (index, item) in custom.iter().take(MAX_CUSTOM_FIELDS).enumerate() {
        push(params, &format!("custom{}", index), item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decoder::decode;

    fn value_of<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_project_options_wire_names() {
        let params = ProjectOptions::new()
            .with_word_count(120)
            .with_callback_url("https://example.com/cb")
            .with_name("docs")
            .params();

        assert_eq!(value_of(&params, "wordCount"), Some("120"));
        assert_eq!(value_of(&params, "callbackUrl"), Some("https://example.com/cb"));
        assert_eq!(value_of(&params, "name"), Some("docs"));
        assert_eq!(value_of(&params, "notes"), None);
    }

    #[test]
    fn test_custom_fields_are_capped() {
        let mut options = ProjectOptions::new();
        for i in 0..12 {
            options = options.with_custom(format!("value-{}", i));
        }
        let params = options.params();

        assert_eq!(value_of(&params, "custom0"), Some("value-0"));
        assert_eq!(value_of(&params, "custom9"), Some("value-9"));
        assert_eq!(value_of(&params, "custom10"), None);
        assert_eq!(params.iter().filter(|(k, _)| k.starts_with("custom")).count(), 10);
    }

    #[test]
    fn test_quote_always_sends_wordcount() {
        let params = QuoteOptions::new().params();
        assert_eq!(params, vec![("wordcount".to_string(), "0".to_string())]);

        let params = QuoteOptions::new()
            .with_service(Service::Transproof)
            .with_proofreading(true)
            .with_currency(Currency::Eur)
            .params();
        assert_eq!(value_of(&params, "service"), Some("transproof"));
        assert_eq!(value_of(&params, "proofreading"), Some("1"));
        assert_eq!(value_of(&params, "currency"), Some("EUR"));
    }

    #[test]
    fn test_file_resource_params() {
        let params = FileResource::content("greeting.txt", "The sun is shining brightly").params();
        assert_eq!(value_of(&params, "file_name"), Some("greeting.txt"));
        assert_eq!(value_of(&params, "file_content"), Some("The sun is shining brightly"));

        let params = FileResource::upload("/tmp/a.txt").with_mime("text/plain").params();
        assert_eq!(value_of(&params, "file_mime"), Some("text/plain"));
        assert_eq!(value_of(&params, "file_content"), None);
    }

    #[test]
    fn test_api_status_from_envelope() {
        let node = decode(r#"{"status":{"code":102,"msg":"Invalid credentials"},"results":[],"errors":["bad key"]}"#)
            .unwrap();
        let status = ApiStatus::from_node(&node).unwrap();

        assert_eq!(status.code, 102);
        assert!(!status.is_ok());
        assert_eq!(status.to_string(), "Invalid credentials (102)");

        assert!(ApiStatus::from_node(&decode("[]").unwrap()).is_none());
    }
}
