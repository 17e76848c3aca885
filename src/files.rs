use std::time::Duration;

use base64::Engine as _;
use tracing::{info, warn};

use crate::fetch::BROWSER_HEADERS;
use crate::messages::{fill, Locale};
use crate::model::{ContentBlock, MediaSource};
use crate::tools::ToolOutput;

/// Largest file handed to the model
pub const MAX_FILE_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Pdf,
    Office,
}

/// Supported extensions: (extension, kind, MIME type)
pub const SUPPORTED_FILES: &[(&str, FileKind, &str)] = &[
    (".jpg", FileKind::Image, "image/jpeg"),
    (".jpeg", FileKind::Image, "image/jpeg"),
    (".png", FileKind::Image, "image/png"),
    (".gif", FileKind::Image, "image/gif"),
    (".webp", FileKind::Image, "image/webp"),
    (".pdf", FileKind::Pdf, "application/pdf"),
    (
        ".docx",
        FileKind::Office,
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (
        ".pptx",
        FileKind::Office,
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
];

/// Downloads a file by URL and turns it into model input
pub trait FileAnalyzer: Send + Sync {
    /// Never fails: problems are reported as text for the model
    fn analyze(&self, url: &str) -> ToolOutput;
}

/// Lowercased extension of the URL path, including the dot ("" if none)
pub fn file_extension(url: &str) -> String {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_lowercase(),
        Err(_) => url.split(['?', '#']).next().unwrap_or("").to_lowercase(),
    };
    let name = path.rsplit('/').next().unwrap_or("");
    match name.rfind('.') {
        Some(idx) => name[idx..].to_string(),
        None => String::new(),
    }
}

/// Look up kind and MIME type for a URL
pub fn classify(url: &str) -> Option<(FileKind, &'static str)> {
    let ext = file_extension(url);
    SUPPORTED_FILES
        .iter()
        .find(|(e, _, _)| *e == ext)
        .map(|(_, kind, mime)| (*kind, *mime))
}

fn megabytes(bytes: u64) -> String {
    format!("{:.1}", bytes as f64 / 1024.0 / 1024.0)
}

/// Turn downloaded bytes into tool output
pub fn file_output(kind: FileKind, mime: &str, bytes: &[u8], url: &str, locale: Locale) -> ToolOutput {
    let m = locale.messages();
    match kind {
        FileKind::Image => ToolOutput::Blocks(vec![
            ContentBlock::text(fill(m.file_image_instruction, &[("url", url)])),
            ContentBlock::Image {
                source: MediaSource::base64(mime, base64::engine::general_purpose::STANDARD.encode(bytes)),
            },
        ]),
        FileKind::Pdf => ToolOutput::Blocks(vec![
            ContentBlock::text(fill(m.file_pdf_instruction, &[("url", url)])),
            ContentBlock::Document {
                source: MediaSource::base64(mime, base64::engine::general_purpose::STANDARD.encode(bytes)),
            },
        ]),
        FileKind::Office => ToolOutput::Text(fill(m.file_office_unsupported, &[("url", url)])),
    }
}

pub struct HttpFileAnalyzer {
    agent: ureq::Agent,
    locale: Locale,
}

impl HttpFileAnalyzer {
    pub fn new(locale: Locale, timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent, locale }
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, String> {
        let m = self.locale.messages();
        let mut request = self.agent.get(url);
        for (key, value) in BROWSER_HEADERS {
            request = request.header(*key, *value);
        }

        let response = request.call().map_err(|e| {
            warn!("File download failed: {}", e);
            m.file_download_failed.to_string()
        })?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(fill(m.file_http_status, &[("status", &status.to_string())]));
        }

        let declared = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        if let Some(len) = declared.filter(|len| *len > MAX_FILE_BYTES) {
            return Err(fill(m.file_too_large, &[("size", &megabytes(len))]));
        }

        response
            .into_body()
            .with_config()
            .limit(MAX_FILE_BYTES)
            .read_to_vec()
            .map_err(|e| match e {
                ureq::Error::BodyExceedsLimit(_) => {
                    fill(m.file_too_large, &[("size", &format!(">{}", megabytes(MAX_FILE_BYTES)))])
                }
                other => {
                    warn!("File download failed: {}", other);
                    m.file_download_failed.to_string()
                }
            })
    }
}

impl FileAnalyzer for HttpFileAnalyzer {
    fn analyze(&self, url: &str) -> ToolOutput {
        info!("Analyzing file URL: {}", url);
        let m = self.locale.messages();

        let Some((kind, mime)) = classify(url) else {
            return ToolOutput::Text(fill(m.file_unsupported, &[("ext", &file_extension(url))]));
        };

        match self.download(url) {
            Ok(bytes) => {
                info!("Downloaded file: {} bytes, type={:?}", bytes.len(), kind);
                file_output(kind, mime, &bytes, url, self.locale)
            }
            Err(message) => ToolOutput::Text(message),
        }
    }
}
