//! OHT API v2 endpoint table

use reqwest::{Method, Url};
use std::fmt;

use crate::core::errors::{OhtError, Result};

/// One call of the OHT API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `GET /account/`
    AccountDetails,
    /// `POST /resources/file`
    CreateFileResource,
    /// `GET /resources/{0}`
    GetResource,
    /// `GET /resources/{0}/download`
    DownloadResource,
    /// `GET /tools/quote`
    Quote,
    /// `GET /tools/wordcount`
    WordCount,
    /// `POST /projects/translation`
    NewTranslationProject,
    /// `POST /projects/proof-general`
    NewProofreadingProject,
    /// `POST /projects/proof-translated`
    NewProofTranslatedProject,
    /// `POST /projects/transcription`
    NewTranscriptionProject,
    /// `GET /projects/{0}`
    ProjectDetails,
    /// `DELETE /projects/{0}`
    CancelProject,
    /// `GET /projects/{0}/comments`
    ProjectComments,
    /// `POST /projects/{0}/comments`
    NewComment,
    /// `GET /projects/{0}/rating`
    ProjectRatings,
    /// `POST /projects/{0}/rating`
    PostProjectRating,
    /// `GET /mt/translate/text`
    MachineTranslate,
    /// `GET /mt/detect/text`
    MachineDetectLanguage,
    /// `GET /discover/languages`
    DiscoverLanguages,
    /// `GET /discover/language_pairs`
    DiscoverLanguagePairs,
    /// `GET /discover/expertise`
    SupportedExpertises,
}

impl Endpoint {
    /// Path template relative to the API root; `{0}` is a positional slot
    pub fn template(self) -> &'static str {
        match self {
            Endpoint::AccountDetails => "/account/",
            Endpoint::CreateFileResource => "/resources/file",
            Endpoint::GetResource => "/resources/{0}",
            Endpoint::DownloadResource => "/resources/{0}/download",
            Endpoint::Quote => "/tools/quote",
            Endpoint::WordCount => "/tools/wordcount",
            Endpoint::NewTranslationProject => "/projects/translation",
            Endpoint::NewProofreadingProject => "/projects/proof-general",
            Endpoint::NewProofTranslatedProject => "/projects/proof-translated",
            Endpoint::NewTranscriptionProject => "/projects/transcription",
            Endpoint::ProjectDetails | Endpoint::CancelProject => "/projects/{0}",
            Endpoint::ProjectComments | Endpoint::NewComment => "/projects/{0}/comments",
            Endpoint::ProjectRatings | Endpoint::PostProjectRating => "/projects/{0}/rating",
            Endpoint::MachineTranslate => "/mt/translate/text",
            Endpoint::MachineDetectLanguage => "/mt/detect/text",
            Endpoint::DiscoverLanguages => "/discover/languages",
            Endpoint::DiscoverLanguagePairs => "/discover/language_pairs",
            Endpoint::SupportedExpertises => "/discover/expertise",
        }
    }

    /// HTTP method the service expects
    pub fn method(self) -> Method {
        match self {
            Endpoint::CreateFileResource
            | Endpoint::NewTranslationProject
            | Endpoint::NewProofreadingProject
            | Endpoint::NewProofTranslatedProject
            | Endpoint::NewTranscriptionProject
            | Endpoint::NewComment
            | Endpoint::PostProjectRating => Method::POST,
            Endpoint::CancelProject => Method::DELETE,
            _ => Method::GET,
        }
    }

    /// Whether the call is authenticated with the secret key
    pub fn needs_secret(self) -> bool {
        !matches!(
            self,
            Endpoint::DiscoverLanguages
                | Endpoint::DiscoverLanguagePairs
                | Endpoint::SupportedExpertises
        )
    }

    /// Resolve the endpoint under `base`
    ///
    /// Each template segment is filled and then pushed as one path segment,
    /// so `/`, `?` or `#` inside an argument are percent-encoded.
    pub fn url(self, base: &str, args: &[&str]) -> Result<Url> {
        let mut url = Url::parse(base).map_err(|e| OhtError::ConfigError {
            message: format!("invalid API URL {}: {}", base, e),
        })?;
        {
            let mut path = url.path_segments_mut().map_err(|_| OhtError::ConfigError {
                message: format!("API URL {} cannot be a base", base),
            })?;
            path.pop_if_empty();
            for segment in self.template().trim_start_matches('/').split('/') {
                path.push(&fill_template(segment, args));
            }
        }
        Ok(url)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.template())
    }
}

/// Replace `{N}` slots with `args[N]`; slots without an argument stay as-is
pub fn fill_template(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let slot = after
            .find('}')
            .and_then(|close| after[..close].parse::<usize>().ok().map(|n| (n, close)));

        match slot {
            Some((n, close)) if n < args.len() => {
                out.push_str(args[n]);
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template() {
        assert_eq!(fill_template("/projects/{0}", &["807837"]), "/projects/807837");
        assert_eq!(
            fill_template("/resources/{0}/download", &["rsc-1"]),
            "/resources/rsc-1/download"
        );
        assert_eq!(fill_template("/{1}/{0}", &["a", "b"]), "/b/a");
        assert_eq!(fill_template("/account/", &["unused"]), "/account/");
    }

    #[test]
    fn test_fill_template_leaves_unknown_slots() {
        assert_eq!(fill_template("/projects/{0}", &[]), "/projects/{0}");
        assert_eq!(fill_template("/{x}/{0}", &["a"]), "/{x}/a");
        assert_eq!(fill_template("/open{", &["a"]), "/open{");
    }

    #[test]
    fn test_endpoint_methods() {
        assert_eq!(Endpoint::CancelProject.method(), Method::DELETE);
        assert_eq!(Endpoint::NewComment.method(), Method::POST);
        assert_eq!(Endpoint::ProjectComments.method(), Method::GET);
    }

    #[test]
    fn test_endpoint_url() {
        let base = "http://localhost:8080/api/2";
        assert_eq!(
            Endpoint::CancelProject.url(base, &["7"]).unwrap().as_str(),
            "http://localhost:8080/api/2/projects/7"
        );
        assert_eq!(
            Endpoint::AccountDetails.url(base, &[]).unwrap().as_str(),
            "http://localhost:8080/api/2/account/"
        );
        assert_eq!(
            Endpoint::DownloadResource
                .url("http://localhost:8080/api/2/", &["rsc-1"])
                .unwrap()
                .as_str(),
            "http://localhost:8080/api/2/resources/rsc-1/download"
        );
    }

    #[test]
    fn test_endpoint_url_encodes_arguments() {
        let url = Endpoint::DownloadResource
            .url("http://localhost:8080/api/2", &["a/b?c#d"])
            .unwrap();

        assert_eq!(url.path(), "/api/2/resources/a%2Fb%3Fc%23d/download");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_endpoint_url_rejects_bad_base() {
        let err = Endpoint::AccountDetails.url("not a url", &[]).unwrap_err();
        assert!(matches!(err, OhtError::ConfigError { .. }));
    }

    #[test]
    fn test_discovery_is_public() {
        assert!(!Endpoint::DiscoverLanguages.needs_secret());
        assert!(!Endpoint::SupportedExpertises.needs_secret());
        assert!(Endpoint::MachineTranslate.needs_secret());
    }
}
