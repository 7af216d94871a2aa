pub mod agent_service;
pub mod error;
pub mod ingestion_service;

pub use agent_service::{AgentInvoker, HttpAgentClient};
pub use error::ServiceError;
pub use ingestion_service::{
    ACCEPTED_UPLOAD_EXTENSIONS, HttpIngestionClient, KnowledgeBaseIngestor, UploadFile,
    is_accepted_upload,
};
