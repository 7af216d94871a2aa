//! Session core of the shopping assistant: normalizes agent replies into
//! product recommendations, keeps the conversation, dispatches turns and
//! uploads catalog files to the knowledge base.

pub mod controllers;
pub mod logging;
pub mod models;
pub mod services;
pub mod settings;

pub use controllers::{SessionClosed, SessionController, SessionHandle, open_session};
pub use models::{
    AgentResponse, ConversationMessage, Effect, Message, Product, ProductCard, SessionEvent,
    SessionSnapshot, SessionState,
};
pub use services::{
    AgentInvoker, HttpAgentClient, HttpIngestionClient, KnowledgeBaseIngestor, ServiceError,
    UploadFile,
};
pub use settings::{AppSettings, SettingsJsonRepository, SettingsRepository};
