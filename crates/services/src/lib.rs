#![forbid(unsafe_code)]

pub mod assessment_flow;
pub mod auth_service;
pub mod chat_service;
pub mod config;
pub mod dashboard_service;
pub mod error;
pub mod quiz_client;
pub mod report_service;

pub use assess_core::Clock;

pub use assessment_flow::AssessmentFlow;
pub use auth_service::{AuthService, Registration, Role};
pub use chat_service::ChatService;
pub use config::ApiConfig;
pub use dashboard_service::DashboardService;
pub use error::{
    ApiError, AssessmentError, AuthServiceError, ChatError, DashboardError, ExportError,
    ExportStage, RenderError, UploadError,
};
pub use quiz_client::{HttpQuizClient, QuizApi};
pub use report_service::{
    ExportReceipt, HttpReportSink, RenderedReport, ReportDocument, ReportExporter, ReportRenderer,
    ReportRow, ReportSink, TextRenderer, TIPS, build_report,
};
