use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use reqwest::multipart::{Form, Part};

use assess_core::model::{OwaspIssue, ScoreResult, Session, resolve_owasp_issue};

use crate::config::ApiConfig;
use crate::error::{ExportError, RenderError, UploadError};

/// Static advice appended to every report, matching the dashboard tips list.
pub const TIPS: &[&str] = &[
    "Enable alerts for suspicious sign-ins on your cloud platform.",
    "Use a password manager.",
    "Review granted permissions regularly.",
    "Keep backups in a safe, separate location.",
    "Enable multi-factor authentication (MFA).",
    "Update your containers regularly.",
    "Never expose unnecessary ports.",
    "Encrypt data in transit and at rest.",
    "Secure your API keys and tokens.",
];

/// One row of the recommendation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub text: String,
    pub status: &'static str,
    pub note: String,
}

/// The structured report handed to a renderer.
///
/// Row order follows the score result's recommendation order; OWASP rows are
/// resolved through the static table with raw-key fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub score: u8,
    pub to_improve: u8,
    pub risk_label: &'static str,
    pub recommendations: Vec<ReportRow>,
    pub tips: Vec<&'static str>,
    pub owasp: Vec<OwaspIssue>,
}

/// Assemble the report document from a scored result and per-index user notes.
///
/// An explicit note for an index takes precedence over the note carried by
/// the recommendation itself; absent both, the cell is empty.
#[must_use]
pub fn build_report(
    result: &ScoreResult,
    notes: &BTreeMap<usize, String>,
    generated_at: DateTime<Utc>,
) -> ReportDocument {
    let recommendations = result
        .recommendations()
        .iter()
        .enumerate()
        .map(|(index, rec)| ReportRow {
            text: rec.text.clone(),
            status: if rec.completed { "Done" } else { "Pending" },
            note: notes
                .get(&index)
                .cloned()
                .or_else(|| rec.note.clone())
                .unwrap_or_default(),
        })
        .collect();

    let owasp = result
        .owasp_issues()
        .iter()
        .map(|key| resolve_owasp_issue(key))
        .collect();

    ReportDocument {
        title: "Cloud Security Report".to_owned(),
        generated_at,
        score: result.risk_score().value(),
        to_improve: result.risk_score().complement(),
        risk_label: result.risk_score().level().label(),
        recommendations,
        tips: TIPS.to_vec(),
        owasp,
    }
}

/// A rendered report artifact, ready for upload or manual retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Turns a report document into bytes. PDF, plain text, whatever the caller
/// wires in.
pub trait ReportRenderer: Send + Sync {
    /// # Errors
    ///
    /// Returns `RenderError` if the document cannot be rendered.
    fn render(&self, doc: &ReportDocument) -> Result<RenderedReport, RenderError>;
}

/// Receives a rendered report, typically by uploading it somewhere.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// # Errors
    ///
    /// Returns `UploadError` if the report cannot be delivered.
    async fn upload(&self, report: &RenderedReport) -> Result<(), UploadError>;
}

/// Confirmation that a rendered report reached the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub file_name: String,
    pub size_bytes: usize,
    pub uploaded_at: DateTime<Utc>,
}

/// Drives render-then-upload and keeps the rendered artifact across a failed
/// upload so the caller can retry without re-rendering.
pub struct ReportExporter {
    renderer: Arc<dyn ReportRenderer>,
    sink: Arc<dyn ReportSink>,
    last_rendered: Option<RenderedReport>,
}

impl ReportExporter {
    #[must_use]
    pub fn new(renderer: Arc<dyn ReportRenderer>, sink: Arc<dyn ReportSink>) -> Self {
        Self {
            renderer,
            sink,
            last_rendered: None,
        }
    }

    /// The artifact from the most recent render, if any.
    #[must_use]
    pub fn last_rendered(&self) -> Option<&RenderedReport> {
        self.last_rendered.as_ref()
    }

    /// Build, render and upload the report for a scored session.
    ///
    /// # Errors
    ///
    /// `ExportError::NotScored` if the session carries no result; otherwise
    /// as [`ReportExporter::export`].
    pub async fn export_session(
        &mut self,
        session: &Session,
        notes: &BTreeMap<usize, String>,
        uploaded_at: DateTime<Utc>,
    ) -> Result<ExportReceipt, ExportError> {
        let result = session.result().ok_or(ExportError::NotScored)?;
        let doc = build_report(result, notes, uploaded_at);
        self.export(&doc, uploaded_at).await
    }

    /// Render then upload.
    ///
    /// A render failure retains nothing; an upload failure retains the
    /// rendered artifact, retrievable via [`ReportExporter::last_rendered`]
    /// and re-sendable via [`ReportExporter::retry_upload`].
    ///
    /// # Errors
    ///
    /// `ExportError::Render` or `ExportError::Upload`, by stage.
    pub async fn export(
        &mut self,
        doc: &ReportDocument,
        uploaded_at: DateTime<Utc>,
    ) -> Result<ExportReceipt, ExportError> {
        let rendered = self.renderer.render(doc)?;
        self.last_rendered = Some(rendered);
        self.upload_retained(uploaded_at).await
    }

    /// Re-send the retained artifact after an upload failure.
    ///
    /// # Errors
    ///
    /// `ExportError::NothingRendered` if no artifact is retained,
    /// `ExportError::Upload` if the sink fails again.
    pub async fn retry_upload(
        &mut self,
        uploaded_at: DateTime<Utc>,
    ) -> Result<ExportReceipt, ExportError> {
        self.upload_retained(uploaded_at).await
    }

    async fn upload_retained(
        &mut self,
        uploaded_at: DateTime<Utc>,
    ) -> Result<ExportReceipt, ExportError> {
        let report = self
            .last_rendered
            .as_ref()
            .ok_or(ExportError::NothingRendered)?;
        self.sink.upload(report).await.map_err(ExportError::Upload)?;
        Ok(ExportReceipt {
            file_name: report.file_name.clone(),
            size_bytes: report.bytes.len(),
            uploaded_at,
        })
    }
}

/// Plain-text renderer; deterministic output, used as the default and in
/// tests. A PDF renderer plugs in through the same trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl ReportRenderer for TextRenderer {
    fn render(&self, doc: &ReportDocument) -> Result<RenderedReport, RenderError> {
        let mut out = String::new();
        let mut push = |line: &str| -> Result<(), RenderError> {
            writeln!(out, "{line}").map_err(|e| RenderError(e.to_string()))
        };

        push(&doc.title.to_uppercase())?;
        push(&format!("Generated: {}", doc.generated_at.to_rfc3339()))?;
        push(&format!(
            "Score: {}/100 ({}), to improve: {}",
            doc.score, doc.risk_label, doc.to_improve
        ))?;
        push("")?;

        push("RECOMMENDATIONS")?;
        for row in &doc.recommendations {
            push(&format!("- [{}] {} | {}", row.status, row.text, row.note))?;
        }
        push("")?;

        push("TIPS")?;
        for tip in &doc.tips {
            push(&format!("- {tip}"))?;
        }
        push("")?;

        push("OWASP FINDINGS")?;
        for issue in &doc.owasp {
            push(&format!(
                "- {}: {} {}",
                issue.label, issue.description, issue.link
            ))?;
        }

        Ok(RenderedReport {
            file_name: "cloud_security_report.txt".to_owned(),
            content_type: "text/plain".to_owned(),
            bytes: out.into_bytes(),
        })
    }
}

/// Uploads rendered reports to the backend as multipart form data.
#[derive(Clone)]
pub struct HttpReportSink {
    client: Client,
    config: ApiConfig,
}

impl HttpReportSink {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ReportSink for HttpReportSink {
    async fn upload(&self, report: &RenderedReport) -> Result<(), UploadError> {
        let part = Part::bytes(report.bytes.clone())
            .file_name(report.file_name.clone())
            .mime_str(&report.content_type)?;
        let form = Form::new().part("pdf", part);

        let response = self
            .client
            .post(self.config.endpoint("/api/report/upload-pdf"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UploadError::HttpStatus(response.status()));
        }
        Ok(())
    }
}
