//! Multipart upload handling — the document-source provider for the HTTP surface.
//!
//! Each uploaded resume is spooled into a `NamedTempFile` under the configured
//! upload directory. The file is removed when the `UploadedFile` is dropped, so
//! cleanup happens on every exit path, including failed extraction and timeouts.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use bytes::Bytes;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::AppError;
use crate::ranking::extract::DocumentSource;
use crate::ranking::keywords::KeywordSet;

pub const FIELD_JOB_DESCRIPTION: &str = "job_description";
pub const FIELD_KEYWORDS: &str = "keywords";
pub const FIELD_RESUMES: &str = "resumes";

/// A resume spooled to disk for the lifetime of one evaluation.
#[derive(Debug)]
pub struct UploadedFile {
    file_name: Option<String>,
    file: NamedTempFile,
}

impl UploadedFile {
    /// Writes `bytes` to a fresh temp file inside `dir`. Blocking.
    pub fn spool(dir: &Path, file_name: Option<String>, bytes: &[u8]) -> io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("resume-")
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self { file_name, file })
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl DocumentSource for UploadedFile {
    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(self.file.reopen()?))
    }
}

/// Parsed `/upload` form.
#[derive(Debug)]
pub struct EvaluationForm {
    pub job_description: String,
    pub keywords: KeywordSet,
    pub resumes: Vec<UploadedFile>,
}

/// Reads the multipart form, spooling every resume into `upload_dir`.
///
/// Fails with a validation error when the job description or the resumes are
/// missing, or when more than `max_documents` resumes were sent.
pub async fn read_evaluation_form(
    mut multipart: Multipart,
    upload_dir: &Path,
    max_documents: usize,
) -> Result<EvaluationForm, AppError> {
    let mut job_description = String::new();
    let mut keyword_values = Vec::new();
    let mut resumes = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FIELD_JOB_DESCRIPTION => job_description = field.text().await?,
            FIELD_KEYWORDS => keyword_values.push(field.text().await?),
            FIELD_RESUMES => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;

                // Browsers send an empty part when no file was picked.
                if bytes.is_empty() && file_name.as_deref().unwrap_or_default().is_empty() {
                    continue;
                }
                if resumes.len() == max_documents {
                    return Err(AppError::Validation(format!(
                        "At most {max_documents} resumes can be evaluated at once"
                    )));
                }
                let upload = spool_upload(upload_dir.to_path_buf(), file_name, bytes).await?;
                debug!(
                    document_index = resumes.len(),
                    path = %upload.path().display(),
                    "Spooled resume"
                );
                resumes.push(upload);
            }
            other => debug!("Ignoring unknown form field '{other}'"),
        }
    }

    if resumes.is_empty() || job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Missing files or job description".to_string(),
        ));
    }

    Ok(EvaluationForm {
        job_description,
        keywords: KeywordSet::from_form_values(keyword_values),
        resumes,
    })
}

async fn spool_upload(
    dir: PathBuf,
    file_name: Option<String>,
    bytes: Bytes,
) -> Result<UploadedFile, AppError> {
    tokio::task::spawn_blocking(move || UploadedFile::spool(&dir, file_name, &bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed spooling upload: {e}")))?
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to store upload: {e}")))
}
