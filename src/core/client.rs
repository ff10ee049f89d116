//! Async client for the OHT API
//!
//! Every operation fills an endpoint template, attaches the credentials as
//! query parameters, sends one request and decodes the body with
//! [`decode`]. There is no retry or caching layer.

use reqwest::{RequestBuilder, Response, StatusCode, Url};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

use crate::core::config::OhtConfig;
use crate::core::decoder::{decode, DecodedNode};
use crate::core::endpoints::Endpoint;
use crate::core::errors::{OhtError, Result};
use crate::core::models::{
    push, push_opt, ApiStatus, FileResource, Params, ProjectOptions, QuoteOptions, RatingType,
    ResourceFetch, TranscriptionOptions,
};

/// Default buffer size for streamed downloads
pub const DEFAULT_CHUNK_SIZE: usize = 128;

/// Prepend `https://` to URLs given without a scheme
pub fn normalize_base_url(url: &str) -> String {
    let url = url.trim();
    if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

fn join<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(",")
}

/// OHT API client
#[derive(Debug, Clone)]
pub struct OhtClient {
    client: reqwest::Client,
    config: OhtConfig,
}

impl OhtClient {
    /// Create a new client; no request is sent
    pub fn new(mut config: OhtConfig) -> Result<Self> {
        config.validate().map_err(|e| OhtError::ConfigError {
            message: e.to_string(),
        })?;
        config.base_url = normalize_base_url(&config.base_url);
        config.sandbox_url = normalize_base_url(&config.sandbox_url);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        let config = OhtConfig::from_env()?;
        Self::new(config)
    }

    /// Active configuration
    pub fn config(&self) -> &OhtConfig {
        &self.config
    }

    /// Production API root
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Sandbox API root
    pub fn sandbox_url(&self) -> &str {
        &self.config.sandbox_url
    }

    /// Root URL currently receiving requests
    pub fn work_url(&self) -> &str {
        self.config.work_url()
    }

    /// Probe the work URL with a `HEAD` request
    ///
    /// Returns `Ok(false)` when the server answers with anything but 200 and
    /// an error when it cannot be reached at all.
    pub async fn check_availability(&self) -> Result<bool> {
        let url = self.work_url();
        let response = self
            .client
            .head(url)
            .timeout(Duration::from_millis(self.config.probe_timeout_ms))
            .send()
            .await
            .map_err(|e| OhtError::NetworkError {
                message: e.to_string(),
            })?;

        let available = response.status() == StatusCode::OK;
        if !available {
            warn!("{} answered availability probe with {}", url, response.status());
        }
        Ok(available)
    }

    /// Replace the production URL, then probe the work URL
    pub async fn set_base_url(&mut self, url: &str) -> Result<bool> {
        let url = normalize_base_url(url);
        if self.config.base_url == url {
            return Ok(true);
        }
        info!("Base URL changed to {}", url);
        self.config.base_url = url;
        self.check_availability().await
    }

    /// Replace the sandbox URL, then probe the work URL
    pub async fn set_sandbox_url(&mut self, url: &str) -> Result<bool> {
        let url = normalize_base_url(url);
        if self.config.sandbox_url == url {
            return Ok(true);
        }
        info!("Sandbox URL changed to {}", url);
        self.config.sandbox_url = url;
        self.check_availability().await
    }

    fn endpoint_url(&self, endpoint: Endpoint, args: &[&str]) -> Result<Url> {
        endpoint.url(self.work_url(), args)
    }

    fn auth_params(&self, endpoint: Endpoint) -> Params {
        let mut params = Params::new();
        push(&mut params, "public_key", &self.config.public_key);
        if endpoint.needs_secret() {
            push(&mut params, "secret_key", &self.config.secret_key);
        }
        params
    }

    fn request(
        &self,
        endpoint: Endpoint,
        args: &[&str],
        params: &Params,
    ) -> Result<RequestBuilder> {
        let url = self.endpoint_url(endpoint, args)?;
        debug!("{} {}", endpoint.method(), url);
        Ok(self
            .client
            .request(endpoint.method(), url)
            .query(&self.auth_params(endpoint))
            .query(params))
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        builder.send().await.map_err(|e| OhtError::NetworkError {
            message: e.to_string(),
        })
    }

    async fn decode_response(&self, endpoint: Endpoint, response: Response) -> Result<DecodedNode> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!("{} returned HTTP {}", endpoint, status);
        }

        let node = decode(&body)?;
        if let Some(api_status) = ApiStatus::from_node(&node) {
            if !api_status.is_ok() {
                debug!("{} reported status {}", endpoint, api_status);
            }
        }
        Ok(node)
    }

    async fn call(&self, endpoint: Endpoint, args: &[&str], params: Params) -> Result<DecodedNode> {
        let response = self.execute(self.request(endpoint, args, &params)?).await?;
        self.decode_response(endpoint, response).await
    }

    /// Account details and credit balance
    pub async fn account_details(&self) -> Result<DecodedNode> {
        self.call(Endpoint::AccountDetails, &[], Params::new()).await
    }

    /// Create a file resource from a local file or inline content
    pub async fn create_file_resource(&self, resource: FileResource) -> Result<DecodedNode> {
        let endpoint = Endpoint::CreateFileResource;
        let params = resource.params();
        let mut builder = self.request(endpoint, &[], &params)?;

        if let FileResource::Upload {
            path, file_mime, ..
        } = &resource
        {
            let bytes = tokio::fs::read(path).await.map_err(|e| OhtError::FileError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());

            let mut part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
            if let Some(mime) = file_mime {
                part = part.mime_str(mime)?;
            }
            builder = builder.multipart(reqwest::multipart::Form::new().part("file", part));
        }

        let response = self.execute(builder).await?;
        self.decode_response(endpoint, response).await
    }

    /// Details of a resource
    pub async fn get_resource(
        &self,
        resource_uuid: &str,
        project_id: Option<u64>,
        fetch: Option<ResourceFetch>,
    ) -> Result<DecodedNode> {
        let mut params = Params::new();
        if let Some(project_id) = project_id {
            push(&mut params, "project_id", &project_id.to_string());
        }
        if let Some(fetch) = fetch {
            push(&mut params, "fetch", &fetch.to_string());
        }
        self.call(Endpoint::GetResource, &[resource_uuid], params).await
    }

    fn download_params(project_id: Option<u64>) -> Params {
        let mut params = Params::new();
        if let Some(project_id) = project_id {
            push(&mut params, "project_id", &project_id.to_string());
        }
        params
    }

    /// Download a resource and return its content as text
    pub async fn download_resource(
        &self,
        resource_uuid: &str,
        project_id: Option<u64>,
    ) -> Result<String> {
        let params = Self::download_params(project_id);
        let builder = self.request(Endpoint::DownloadResource, &[resource_uuid], &params)?;
        let response = self.execute(builder).await?;
        Ok(response.text().await?)
    }

    /// Stream a resource to `path`
    ///
    /// Returns `None` without touching `path` when the server does not
    /// answer 200. A transfer that breaks off midway removes the partial
    /// file before the error is returned.
    pub async fn download_resource_to(
        &self,
        resource_uuid: &str,
        path: &Path,
        chunk_size: usize,
        project_id: Option<u64>,
    ) -> Result<Option<PathBuf>> {
        let params = Self::download_params(project_id);
        let builder = self.request(Endpoint::DownloadResource, &[resource_uuid], &params)?;
        let mut response = self.execute(builder).await?;

        if response.status() != StatusCode::OK {
            warn!(
                "Download of {} failed with HTTP {}",
                resource_uuid,
                response.status()
            );
            return Ok(None);
        }

        let file_error = |e: std::io::Error| OhtError::FileError {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let file = tokio::fs::File::create(path).await.map_err(file_error)?;
        let mut writer = BufWriter::with_capacity(chunk_size.max(1), file);

        let copied: Result<usize> = async {
            let mut written = 0usize;
            while let Some(chunk) = response.chunk().await? {
                writer.write_all(&chunk).await.map_err(file_error)?;
                written += chunk.len();
            }
            writer.flush().await.map_err(file_error)?;
            Ok(written)
        }
        .await;

        match copied {
            Ok(written) => {
                debug!("Saved {} bytes of {} to {}", written, resource_uuid, path.display());
                Ok(Some(path.to_path_buf()))
            }
            Err(e) => {
                drop(writer);
                if let Err(remove_err) = tokio::fs::remove_file(path).await {
                    warn!("Could not remove partial download {}: {}", path.display(), remove_err);
                }
                Err(e)
            }
        }
    }

    /// Price summary for an order
    pub async fn quote<S: AsRef<str>>(
        &self,
        resources: &[S],
        source_lang: &str,
        target_lang: &str,
        options: &QuoteOptions,
    ) -> Result<DecodedNode> {
        let mut params = Params::new();
        push(&mut params, "resources", &join(resources));
        push(&mut params, "source_language", source_lang);
        push(&mut params, "target_language", target_lang);
        params.extend(options.params());
        self.call(Endpoint::Quote, &[], params).await
    }

    /// Word count of resources
    pub async fn word_count<S: AsRef<str>>(&self, resources: &[S]) -> Result<DecodedNode> {
        let mut params = Params::new();
        push(&mut params, "resources", &join(resources));
        self.call(Endpoint::WordCount, &[], params).await
    }

    /// Open a translation project
    pub async fn create_translation_project<S: AsRef<str>>(
        &self,
        source_lang: &str,
        target_lang: &str,
        sources: &[S],
        options: &ProjectOptions,
    ) -> Result<DecodedNode> {
        let mut params = Params::new();
        push(&mut params, "source_language", source_lang);
        push(&mut params, "target_language", target_lang);
        push(&mut params, "sources", &join(sources));
        params.extend(options.params());
        self.call(Endpoint::NewTranslationProject, &[], params).await
    }

    /// Open a same-language proofreading project
    pub async fn create_proofreading_project<S: AsRef<str>>(
        &self,
        source_lang: &str,
        sources: &[S],
        options: &ProjectOptions,
    ) -> Result<DecodedNode> {
        let mut params = Params::new();
        push(&mut params, "source_language", source_lang);
        push(&mut params, "sources", &join(sources));
        params.extend(options.params());
        self.call(Endpoint::NewProofreadingProject, &[], params).await
    }

    /// Open a proofreading project over an existing translation
    pub async fn create_proof_translated_project<S: AsRef<str>, T: AsRef<str>>(
        &self,
        source_lang: &str,
        target_lang: &str,
        sources: &[S],
        translations: &[T],
        options: &ProjectOptions,
    ) -> Result<DecodedNode> {
        let mut params = Params::new();
        push(&mut params, "source_language", source_lang);
        push(&mut params, "target_language", target_lang);
        push(&mut params, "sources", &join(sources));
        push(&mut params, "translations", &join(translations));
        params.extend(options.params());
        self.call(Endpoint::NewProofTranslatedProject, &[], params).await
    }

    /// Open a transcription project
    pub async fn create_transcription_project<S: AsRef<str>>(
        &self,
        source_lang: &str,
        sources: &[S],
        options: &TranscriptionOptions,
    ) -> Result<DecodedNode> {
        let mut params = Params::new();
        push(&mut params, "source_language", source_lang);
        push(&mut params, "sources", &join(sources));
        params.extend(options.params());
        self.call(Endpoint::NewTranscriptionProject, &[], params).await
    }

    /// Project details and status
    pub async fn project_details(&self, project_id: u64) -> Result<DecodedNode> {
        let id = project_id.to_string();
        self.call(Endpoint::ProjectDetails, &[id.as_str()], Params::new()).await
    }

    /// Cancel a project; only possible before work starts
    pub async fn cancel_project(&self, project_id: u64) -> Result<DecodedNode> {
        let id = project_id.to_string();
        self.call(Endpoint::CancelProject, &[id.as_str()], Params::new()).await
    }

    /// Comments on a project
    pub async fn project_comments(&self, project_id: u64) -> Result<DecodedNode> {
        let id = project_id.to_string();
        self.call(Endpoint::ProjectComments, &[id.as_str()], Params::new()).await
    }

    /// Add a comment to a project
    pub async fn post_comment(&self, project_id: u64, text: &str) -> Result<DecodedNode> {
        let id = project_id.to_string();
        let mut params = Params::new();
        push(&mut params, "content", text);
        self.call(Endpoint::NewComment, &[id.as_str()], params).await
    }

    /// Customer and service ratings of a project
    pub async fn project_ratings(&self, project_id: u64) -> Result<DecodedNode> {
        let id = project_id.to_string();
        let mut params = Params::new();
        push(&mut params, "project_id", &id);
        self.call(Endpoint::ProjectRatings, &[id.as_str()], params).await
    }

    /// Rate a project, 1 (lowest) to 10 (highest)
    pub async fn post_project_rating(
        &self,
        project_id: u64,
        rating_type: RatingType,
        rate: u8,
        remarks: Option<&str>,
    ) -> Result<DecodedNode> {
        let id = project_id.to_string();
        let mut params = Params::new();
        push(&mut params, "project_id", &id);
        push(&mut params, "type", &rating_type.to_string());
        push(&mut params, "rate", &rate.to_string());
        push_opt(&mut params, "remarks", remarks.filter(|r| !r.is_empty()));
        self.call(Endpoint::PostProjectRating, &[id.as_str()], params).await
    }

    /// Machine-translate a text
    pub async fn machine_translate(
        &self,
        source_lang: &str,
        target_lang: &str,
        text: &str,
    ) -> Result<DecodedNode> {
        let mut params = Params::new();
        push(&mut params, "source_language", source_lang);
        push(&mut params, "target_language", target_lang);
        push(&mut params, "source_content", text);
        self.call(Endpoint::MachineTranslate, &[], params).await
    }

    /// Detect the language of a text
    pub async fn machine_detect_language(&self, text: &str) -> Result<DecodedNode> {
        let mut params = Params::new();
        push(&mut params, "source_content", text);
        self.call(Endpoint::MachineDetectLanguage, &[], params).await
    }

    /// Languages the service supports
    pub async fn supported_languages(&self) -> Result<DecodedNode> {
        self.call(Endpoint::DiscoverLanguages, &[], Params::new()).await
    }

    /// Source and target language pairs the service supports
    pub async fn supported_language_pairs(&self) -> Result<DecodedNode> {
        self.call(Endpoint::DiscoverLanguagePairs, &[], Params::new()).await
    }

    /// Supported expertise codes, optionally for one language pair
    pub async fn expertises(
        &self,
        source_lang: Option<&str>,
        target_lang: Option<&str>,
    ) -> Result<DecodedNode> {
        let mut params = Params::new();
        push_opt(&mut params, "source_language", source_lang);
        push_opt(&mut params, "target_language", target_lang);
        self.call(Endpoint::SupportedExpertises, &[], params).await
    }
}
