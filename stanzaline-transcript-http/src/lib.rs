use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use stanzaline_core::{
    CoreError, RawTranscript, TranscriptRequest, TranscriptResult, TranscriptSource,
};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Default timeout for HTTP requests (10 seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Default number of retry attempts
const DEFAULT_MAX_RETRIES: u32 = 3;

const SOURCE_NAME: &str = "http";

/// Fetches transcript JSON from `<base_url>/<file>?track=<id>`
pub struct HttpTranscriptSource {
    client: ClientWithMiddleware,
    base_url: Url,
}

impl HttpTranscriptSource {
    /// Create a new HTTP source with default 10-second timeout and 3 retries.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot be created.
    pub fn new(base_url: &str) -> Result<Self, CoreError> {
        let base_url = parse_base_url(base_url)?;

        // Base client with timeout
        let base_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("Stanzaline/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(network_error)?;

        // Wrap with retry middleware (exponential backoff)
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(DEFAULT_MAX_RETRIES);
        let client = ClientBuilder::new(base_client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL for a transcript request
    ///
    /// # Errors
    ///
    /// Returns an error if the file name does not form a valid URL.
    pub fn transcript_url(&self, request: &TranscriptRequest) -> Result<Url, CoreError> {
        let mut url = self
            .base_url
            .join(&encode_relative_path(&request.file))
            .map_err(|e| source_failed(format!("invalid transcript URL for {}: {e}", request.file)))?;
        url.query_pairs_mut()
            .append_pair("track", request.track_id.as_str());
        Ok(url)
    }
}

/// Ensure the base URL is absolute HTTP(S) and ends with a slash so joins
/// append instead of replacing the last path segment.
fn parse_base_url(base_url: &str) -> Result<Url, CoreError> {
    let mut url = Url::parse(base_url.trim())
        .map_err(|e| source_failed(format!("invalid base URL {base_url}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(source_failed(format!(
            "unsupported URL scheme: {}",
            url.scheme()
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Percent-encode each `/`-separated segment of a catalog file path, dropping
/// empty, `.` and `..` segments so the result stays under the base URL.
fn encode_relative_path(file: &str) -> String {
    file.split('/')
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

fn network_error(e: impl std::fmt::Display) -> CoreError {
    CoreError::NetworkError {
        reason: e.to_string(),
    }
}

fn source_failed(reason: String) -> CoreError {
    CoreError::TranscriptSourceFailed {
        source_name: SOURCE_NAME.to_string(),
        reason,
    }
}

#[async_trait]
impl TranscriptSource for HttpTranscriptSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch(&self, request: &TranscriptRequest) -> Result<TranscriptResult, CoreError> {
        let url = self.transcript_url(request)?;
        info!("Fetching transcript for {}: GET {}", request.track_id, url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(network_error)?;
        debug!("Transcript response status: {}", response.status());

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            info!("No remote transcript for {}", request.track_id);
            return Ok(TranscriptResult::NotFound);
        }

        if !response.status().is_success() {
            warn!("Transcript server returned status: {}", response.status());
            return Err(source_failed(format!(
                "server returned status: {}",
                response.status()
            )));
        }

        let body = response.text().await.map_err(network_error)?;
        let transcript = RawTranscript::parse(&body)?;
        Ok(TranscriptResult::Found(transcript))
    }
}
