use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::models::{Effect, SessionEvent, SessionSnapshot, SessionState};
use crate::services::{
    AgentInvoker, HttpAgentClient, HttpIngestionClient, KnowledgeBaseIngestor, UploadFile,
};
use crate::settings::{AppSettings, SettingsRepository};

#[derive(Debug, Error)]
#[error("Session controller has stopped")]
pub struct SessionClosed;

/// Owns one session's state and applies its events strictly in order.
///
/// Collaborator calls and the status-clear timer run as tokio tasks that post
/// their completions back into the event channel, so state is only ever
/// touched by [`SessionController::run`].
pub struct SessionController {
    state: SessionState,
    agent: Arc<dyn AgentInvoker>,
    ingestor: Arc<dyn KnowledgeBaseIngestor>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    /// Weak so the loop ends once every handle is gone
    sender: mpsc::WeakUnboundedSender<SessionEvent>,
    snapshots: watch::Sender<SessionSnapshot>,
    /// Pending upload status clear, if any
    status_clear_task: Option<JoinHandle<()>>,
}

impl SessionController {
    pub fn new(
        settings: &AppSettings,
        agent: Arc<dyn AgentInvoker>,
        ingestor: Arc<dyn KnowledgeBaseIngestor>,
    ) -> (Self, SessionHandle) {
        let state = SessionState::new(settings);
        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshots, snapshot_rx) = watch::channel(state.snapshot());

        info!(session_id = %state.session_id(), "Session created");

        let controller = Self {
            state,
            agent,
            ingestor,
            events: rx,
            sender: tx.downgrade(),
            snapshots,
            status_clear_task: None,
        };
        let handle = SessionHandle {
            sender: tx,
            snapshots: snapshot_rx,
        };
        (controller, handle)
    }

    /// Create a session and drive it on the current tokio runtime
    pub fn spawn(
        settings: &AppSettings,
        agent: Arc<dyn AgentInvoker>,
        ingestor: Arc<dyn KnowledgeBaseIngestor>,
    ) -> SessionHandle {
        let (controller, handle) = Self::new(settings, agent, ingestor);
        tokio::spawn(controller.run());
        handle
    }

    /// Process events until every [`SessionHandle`] and in-flight task is gone
    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            self.handle_event(event);
        }

        if let Some(task) = self.status_clear_task.take() {
            task.abort();
        }
        info!(session_id = %self.state.session_id(), "Session closed");
    }

    fn handle_event(&mut self, event: SessionEvent) {
        let effects = self.state.apply(event);
        for effect in effects {
            self.execute(effect);
        }
        self.snapshots.send_replace(self.state.snapshot());
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::InvokeAgent {
                turn,
                agent_id,
                message,
                history,
            } => {
                let Some(tx) = self.sender.upgrade() else {
                    debug!(turn, "No handles left, skipping agent call");
                    return;
                };
                let agent = self.agent.clone();
                tokio::spawn(async move {
                    let result = agent.invoke(&agent_id, &message, &history).await;
                    let _ = tx.send(SessionEvent::AgentReplied { turn, result });
                });
            }
            Effect::IngestFiles {
                generation,
                knowledge_base_id,
                files,
            } => {
                let Some(tx) = self.sender.upgrade() else {
                    debug!(generation, "No handles left, skipping upload");
                    return;
                };
                let ingestor = self.ingestor.clone();
                tokio::spawn(async move {
                    let file_count = files.len();
                    let result = ingestor.ingest(&knowledge_base_id, &files).await;
                    let _ = tx.send(SessionEvent::UploadFinished {
                        generation,
                        file_count,
                        result,
                    });
                });
            }
            Effect::ScheduleStatusClear { generation, delay } => {
                self.cancel_status_clear();
                let Some(tx) = self.sender.upgrade() else {
                    return;
                };
                debug!(generation, delay = ?delay, "Scheduling status clear");
                self.status_clear_task = Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(SessionEvent::UploadStatusExpired { generation });
                }));
            }
            Effect::CancelStatusClear => self.cancel_status_clear(),
        }
    }

    fn cancel_status_clear(&mut self) {
        if let Some(task) = self.status_clear_task.take() {
            if !task.is_finished() {
                debug!("Cancelling pending status clear");
            }
            task.abort();
        }
    }
}

/// Load settings, apply environment overrides and start a session backed by
/// the HTTP collaborators.
pub async fn open_session(repository: &dyn SettingsRepository) -> anyhow::Result<SessionHandle> {
    let settings = repository
        .load()
        .await
        .context("Failed to load settings")?
        .with_env_overrides();

    let agent = Arc::new(HttpAgentClient::new(&settings).context("Failed to build agent client")?);
    let ingestor = Arc::new(
        HttpIngestionClient::new(&settings).context("Failed to build ingestion client")?,
    );

    Ok(SessionController::spawn(&settings, agent, ingestor))
}

/// Cloneable front-end side of a session: sends events, reads snapshots.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::UnboundedSender<SessionEvent>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    pub fn send(&self, event: SessionEvent) -> Result<(), SessionClosed> {
        self.sender.send(event).map_err(|_| SessionClosed)
    }

    pub fn set_input(&self, value: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(SessionEvent::InputChanged(value.into()))
    }

    pub fn submit(&self) -> Result<(), SessionClosed> {
        self.send(SessionEvent::Submit)
    }

    pub fn click_suggestion(&self, suggestion: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(SessionEvent::SuggestionClicked(suggestion.into()))
    }

    pub fn select_category(&self, category: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(SessionEvent::CategorySelected(category.into()))
    }

    pub fn new_chat(&self) -> Result<(), SessionClosed> {
        self.send(SessionEvent::NewChat)
    }

    pub fn toggle_sample_data(&self, enabled: bool) -> Result<(), SessionClosed> {
        self.send(SessionEvent::SampleDataToggled(enabled))
    }

    pub fn upload(&self, files: Vec<UploadFile>) -> Result<(), SessionClosed> {
        self.send(SessionEvent::UploadRequested(files))
    }

    /// Read the selected files from disk and start an upload
    pub async fn upload_paths(&self, paths: &[PathBuf]) -> anyhow::Result<()> {
        let files = UploadFile::from_paths(paths).await?;
        if files.is_empty() {
            warn!(selected = paths.len(), "No supported files selected");
        }
        self.upload(files)?;
        Ok(())
    }

    /// Latest published state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified after every processed event
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }
}
