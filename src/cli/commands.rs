//! CLI command definitions and handlers

use clap::{Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::core::client::{OhtClient, DEFAULT_CHUNK_SIZE};
use crate::core::decoder::DecodedNode;
use crate::core::models::{
    ApiStatus, Currency, FileResource, ProjectOptions, QuoteOptions, RatingType, ResourceFetch,
    Service, TranscriptionOptions,
};

/// Project kinds that can be opened from the CLI
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ProjectKind {
    /// Translate the sources
    Translation,
    /// Proofread sources in one language
    Proofreading,
    /// Proofread existing translations against their sources
    ProofTranslated,
    /// Transcribe audio or video
    Transcription,
}

/// Commands for the OHT client
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show account details and credit balance
    Account,

    /// List supported languages
    Languages,

    /// List supported language pairs
    LanguagePairs,

    /// List expertise codes
    Expertises {
        /// Source language (requires --target-lang)
        #[arg(long, requires = "target_lang")]
        source_lang: Option<String>,

        /// Target language (requires --source-lang)
        #[arg(long, requires = "source_lang")]
        target_lang: Option<String>,
    },

    /// Machine-translate a text
    Translate {
        /// Source language code
        #[arg(short, long)]
        source_lang: String,

        /// Target language code
        #[arg(short, long)]
        target_lang: String,

        /// Text to translate
        text: String,
    },

    /// Detect the language of a text
    Detect {
        /// Text to inspect
        text: String,
    },

    /// Create a file resource from a local file or inline text
    Upload {
        /// Local file to upload
        #[arg(short, long, conflicts_with = "content")]
        file: Option<PathBuf>,

        /// Inline content (requires --name)
        #[arg(long, requires = "name")]
        content: Option<String>,

        /// File name stored on the server
        #[arg(short, long)]
        name: Option<String>,

        /// Mime type override
        #[arg(long)]
        mime: Option<String>,
    },

    /// Show resource details
    Resource {
        /// Resource UUID
        uuid: String,

        /// Project that owns the resource
        #[arg(long)]
        project_id: Option<u64>,

        /// Include base64 encoded content
        #[arg(long)]
        content: bool,
    },

    /// Download a resource
    Download {
        /// Resource UUID
        uuid: String,

        /// Save to this file instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write buffer size in bytes
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Project that owns the resource
        #[arg(long)]
        project_id: Option<u64>,
    },

    /// Count words in resources
    WordCount {
        /// Resource UUIDs
        #[arg(required = true)]
        resources: Vec<String>,
    },

    /// Get a price quote
    Quote {
        /// Resource UUIDs
        #[arg(required = true)]
        resources: Vec<String>,

        /// Source language code
        #[arg(short, long)]
        source_lang: String,

        /// Target language code
        #[arg(short, long)]
        target_lang: String,

        /// Override the counted words
        #[arg(long, default_value_t = 0)]
        word_count: u64,

        /// Service type
        #[arg(long)]
        service: Option<QuoteService>,

        /// Expertise code
        #[arg(long)]
        expertise: Option<String>,

        /// Add proofreading
        #[arg(long)]
        proofreading: bool,

        /// Currency
        #[arg(long)]
        currency: Option<QuoteCurrency>,
    },

    /// Open a new project
    NewProject {
        /// Project kind
        #[arg(value_enum)]
        kind: ProjectKind,

        /// Source resource UUIDs
        #[arg(long, required = true, value_delimiter = ',')]
        sources: Vec<String>,

        /// Translated resource UUIDs (proof-translated only)
        #[arg(long, value_delimiter = ',')]
        translations: Vec<String>,

        /// Source language code
        #[arg(short, long)]
        source_lang: String,

        /// Target language code
        #[arg(short, long)]
        target_lang: Option<String>,

        /// Word count, or length in seconds for transcription
        #[arg(long)]
        word_count: Option<u64>,

        /// Note for the linguist
        #[arg(long)]
        notes: Option<String>,

        /// Expertise code
        #[arg(long)]
        expertise: Option<String>,

        /// Callback URL
        #[arg(long)]
        callback_url: Option<String>,

        /// Custom values (up to 10)
        #[arg(long)]
        custom: Vec<String>,

        /// Project name
        #[arg(long)]
        name: Option<String>,
    },

    /// Show project details
    Project {
        /// Project ID
        id: u64,
    },

    /// Cancel a project
    Cancel {
        /// Project ID
        id: u64,
    },

    /// List project comments
    Comments {
        /// Project ID
        id: u64,
    },

    /// Post a project comment
    Comment {
        /// Project ID
        id: u64,

        /// Comment text
        text: String,
    },

    /// Show project ratings
    Ratings {
        /// Project ID
        id: u64,
    },

    /// Rate a project
    Rate {
        /// Project ID
        id: u64,

        /// Rating type
        #[arg(long, value_enum)]
        r#type: RatingKind,

        /// Rate from 1 to 10
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
        rate: u8,

        /// Remarks
        #[arg(long)]
        remarks: Option<String>,
    },

    /// Probe the API root
    Check,
}

/// `--service` values
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum QuoteService {
    /// Translation only
    Translation,
    /// Proofreading only
    Proofreading,
    /// Translation and proofreading
    Transproof,
    /// Transcription
    Transcription,
}

impl From<QuoteService> for Service {
    fn from(service: QuoteService) -> Self {
        match service {
            QuoteService::Translation => Service::Translation,
            QuoteService::Proofreading => Service::Proofreading,
            QuoteService::Transproof => Service::Transproof,
            QuoteService::Transcription => Service::Transcription,
        }
    }
}

/// `--currency` values
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum QuoteCurrency {
    /// US dollars
    Usd,
    /// Euros
    Eur,
}

impl From<QuoteCurrency> for Currency {
    fn from(currency: QuoteCurrency) -> Self {
        match currency {
            QuoteCurrency::Usd => Currency::Usd,
            QuoteCurrency::Eur => Currency::Eur,
        }
    }
}

/// `--type` values for ratings
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum RatingKind {
    /// Rate the customer
    Customer,
    /// Rate the service
    Service,
}

impl From<RatingKind> for RatingType {
    fn from(kind: RatingKind) -> Self {
        match kind {
            RatingKind::Customer => RatingType::Customer,
            RatingKind::Service => RatingType::Service,
        }
    }
}

/// Print a decoded response and report a non-zero API status
fn print_response(node: &DecodedNode) {
    println!("{:#}", node);

    match ApiStatus::from_node(node) {
        Some(status) if !status.is_ok() => warn!("API returned status {}", status),
        Some(_) => {}
        None => warn!("Response has no status block"),
    }
}

/// Dispatch a command
pub async fn handle(client: &OhtClient, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Account => print_response(&client.account_details().await?),
        Commands::Languages => print_response(&client.supported_languages().await?),
        Commands::LanguagePairs => print_response(&client.supported_language_pairs().await?),
        Commands::Expertises {
            source_lang,
            target_lang,
        } => print_response(
            &client
                .expertises(source_lang.as_deref(), target_lang.as_deref())
                .await?,
        ),
        Commands::Translate {
            source_lang,
            target_lang,
            text,
        } => print_response(
            &client
                .machine_translate(&source_lang, &target_lang, &text)
                .await?,
        ),
        Commands::Detect { text } => {
            print_response(&client.machine_detect_language(&text).await?)
        }
        Commands::Upload {
            file,
            content,
            name,
            mime,
        } => handle_upload(client, file, content, name, mime).await?,
        Commands::Resource {
            uuid,
            project_id,
            content,
        } => {
            let fetch = content.then_some(ResourceFetch::Base64);
            print_response(&client.get_resource(&uuid, project_id, fetch).await?)
        }
        Commands::Download {
            uuid,
            output,
            chunk_size,
            project_id,
        } => handle_download(client, uuid, output, chunk_size, project_id).await?,
        Commands::WordCount { resources } => {
            print_response(&client.word_count(&resources).await?)
        }
        Commands::Quote {
            resources,
            source_lang,
            target_lang,
            word_count,
            service,
            expertise,
            proofreading,
            currency,
        } => {
            let mut options = QuoteOptions::new().with_word_count(word_count);
            if let Some(service) = service {
                options = options.with_service(service.into());
            }
            if let Some(expertise) = expertise {
                options = options.with_expertise(expertise);
            }
            if proofreading {
                options = options.with_proofreading(true);
            }
            if let Some(currency) = currency {
                options = options.with_currency(currency.into());
            }
            print_response(
                &client
                    .quote(&resources, &source_lang, &target_lang, &options)
                    .await?,
            )
        }
        Commands::NewProject {
            kind,
            sources,
            translations,
            source_lang,
            target_lang,
            word_count,
            notes,
            expertise,
            callback_url,
            custom,
            name,
        } => {
            let options = ProjectOptions {
                word_count,
                notes,
                expertise,
                callback_url,
                custom,
                name,
            };
            handle_new_project(client, kind, sources, translations, source_lang, target_lang, options)
                .await?
        }
        Commands::Project { id } => print_response(&client.project_details(id).await?),
        Commands::Cancel { id } => print_response(&client.cancel_project(id).await?),
        Commands::Comments { id } => print_response(&client.project_comments(id).await?),
        Commands::Comment { id, text } => print_response(&client.post_comment(id, &text).await?),
        Commands::Ratings { id } => print_response(&client.project_ratings(id).await?),
        Commands::Rate {
            id,
            r#type,
            rate,
            remarks,
        } => print_response(
            &client
                .post_project_rating(id, r#type.into(), rate, remarks.as_deref())
                .await?,
        ),
        Commands::Check => {
            let url = client.work_url().to_string();
            if client.check_availability().await? {
                println!("✅ {} is available", url);
            } else {
                println!("❌ {} did not answer 200", url);
            }
        }
    }

    Ok(())
}

/// Handle upload command
async fn handle_upload(
    client: &OhtClient,
    file: Option<PathBuf>,
    content: Option<String>,
    name: Option<String>,
    mime: Option<String>,
) -> anyhow::Result<()> {
    let mut resource = match (file, content, name) {
        (Some(path), _, name) => {
            info!("Uploading {}", path.display());
            let resource = FileResource::upload(path);
            match name {
                Some(name) => resource.with_file_name(name),
                None => resource,
            }
        }
        (None, Some(content), Some(name)) => FileResource::content(name, content),
        _ => anyhow::bail!("Either --file or --content with --name is required"),
    };

    if let Some(mime) = mime {
        resource = resource.with_mime(mime);
    }

    print_response(&client.create_file_resource(resource).await?);
    Ok(())
}

/// Handle download command
async fn handle_download(
    client: &OhtClient,
    uuid: String,
    output: Option<PathBuf>,
    chunk_size: usize,
    project_id: Option<u64>,
) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Duration;

    let output = match output {
        Some(output) => output,
        None => {
            print!("{}", client.download_resource(&uuid, project_id).await?);
            return Ok(());
        }
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Downloading {}", uuid));
    pb.enable_steady_tick(Duration::from_millis(100));

    let saved = client
        .download_resource_to(&uuid, &output, chunk_size, project_id)
        .await?;

    match saved {
        Some(path) => {
            pb.finish_with_message("Completed");
            println!("✅ Saved to {}", path.display());
        }
        None => {
            pb.finish_with_message("Failed");
            anyhow::bail!("Server refused download of {}", uuid);
        }
    }

    Ok(())
}

/// Handle new project command
async fn handle_new_project(
    client: &OhtClient,
    kind: ProjectKind,
    sources: Vec<String>,
    translations: Vec<String>,
    source_lang: String,
    target_lang: Option<String>,
    options: ProjectOptions,
) -> anyhow::Result<()> {
    let target = || {
        target_lang
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("--target-lang is required for this project kind"))
    };

    let node = match kind {
        ProjectKind::Translation => {
            client
                .create_translation_project(&source_lang, target()?, &sources, &options)
                .await?
        }
        ProjectKind::Proofreading => {
            client
                .create_proofreading_project(&source_lang, &sources, &options)
                .await?
        }
        ProjectKind::ProofTranslated => {
            if translations.is_empty() {
                anyhow::bail!("--translations is required for proof-translated projects");
            }
            client
                .create_proof_translated_project(
                    &source_lang,
                    target()?,
                    &sources,
                    &translations,
                    &options,
                )
                .await?
        }
        ProjectKind::Transcription => {
            let transcription = TranscriptionOptions {
                length: options.word_count,
                notes: options.notes,
                callback_url: options.callback_url,
                custom: options.custom,
                name: options.name,
            };
            client
                .create_transcription_project(&source_lang, &sources, &transcription)
                .await?
        }
    };

    print_response(&node);
    Ok(())
}
