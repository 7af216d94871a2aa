use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::agent_response::AgentResponse;
use super::composer::Composer;
use super::conversation_store::ConversationStore;
use super::message::{ConversationMessage, Message, now_millis};
use super::sample_data::sample_conversation;
use super::upload_state::{UploadState, UploadStatus};
use crate::services::{ServiceError, UploadFile, is_accepted_upload};
use crate::settings::AppSettings;

/// Shortcuts offered on the welcome screen and in the quick-actions panel
pub const CATEGORY_SHORTCUTS: [&str; 4] = [
    "Electronics",
    "Home & Garden",
    "Budget-friendly options",
    "Premium products",
];

pub const ERROR_TURN_PREFIX: &str = "Sorry, I encountered an error: ";
pub const LOADING_LABEL: &str = "Finding recommendations...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DispatchState {
    Idle,
    /// Waiting on the agent for the reply to `turn`. An abandoned turn still
    /// blocks submission, but its reply is dropped on arrival.
    Dispatching { turn: u64, abandoned: bool },
}

/// Everything that can happen to a session: user actions and collaborator
/// completions. Events are applied strictly one at a time.
#[derive(Debug)]
pub enum SessionEvent {
    InputChanged(String),
    /// Enter in the composer; with shift it inserts a line break instead
    EnterPressed { shift: bool },
    Submit,
    SuggestionClicked(String),
    CategorySelected(String),
    NewChat,
    SampleDataToggled(bool),
    AgentReplied {
        turn: u64,
        result: Result<Value, ServiceError>,
    },
    UploadRequested(Vec<UploadFile>),
    UploadFinished {
        generation: u64,
        file_count: usize,
        result: Result<(), ServiceError>,
    },
    UploadStatusExpired { generation: u64 },
}

/// Side effects requested by a transition, executed by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    InvokeAgent {
        turn: u64,
        agent_id: String,
        message: String,
        history: Vec<ConversationMessage>,
    },
    IngestFiles {
        generation: u64,
        knowledge_base_id: String,
        files: Vec<UploadFile>,
    },
    ScheduleStatusClear { generation: u64, delay: Duration },
    CancelStatusClear,
}

/// Read-only view of a session for front ends
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub messages: Vec<Message>,
    pub conversation_history: Vec<ConversationMessage>,
    pub input_value: String,
    pub is_loading: bool,
    pub sample_data_enabled: bool,
    pub upload_status: Option<UploadStatus>,
    pub is_uploading: bool,
    pub file_picker_generation: u64,
}

/// The single active conversation plus its composer and upload panel.
pub struct SessionState {
    session_id: String,
    agent_id: String,
    knowledge_base_id: String,
    status_clear_delay: Duration,
    store: ConversationStore,
    composer: Composer,
    dispatch: DispatchState,
    next_turn: u64,
    sample_data_enabled: bool,
    upload: UploadState,
}

impl SessionState {
    pub fn new(settings: &AppSettings) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            agent_id: settings.agent_id.clone(),
            knowledge_base_id: settings.knowledge_base_id.clone(),
            status_clear_delay: settings.status_clear_delay(),
            store: ConversationStore::new(),
            composer: Composer::new(),
            dispatch: DispatchState::Idle,
            next_turn: 0,
            sample_data_enabled: false,
            upload: UploadState::new(),
        }
    }

    /// Apply one event and return the effects it requires
    pub fn apply(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::InputChanged(value) => {
                if !self.is_loading() {
                    self.composer.set(&value);
                }
                Vec::new()
            }
            SessionEvent::EnterPressed { shift: true } => {
                if !self.is_loading() {
                    self.composer.insert_newline();
                }
                Vec::new()
            }
            SessionEvent::EnterPressed { shift: false } | SessionEvent::Submit => {
                let text = self.composer.value().trim().to_string();
                self.submit(text)
            }
            SessionEvent::SuggestionClicked(suggestion) => self.submit(suggestion),
            SessionEvent::CategorySelected(category) => {
                self.select_category(&category);
                Vec::new()
            }
            SessionEvent::NewChat => {
                self.new_chat();
                Vec::new()
            }
            SessionEvent::SampleDataToggled(enabled) => {
                self.toggle_sample_data(enabled);
                Vec::new()
            }
            SessionEvent::AgentReplied { turn, result } => {
                self.finish_turn(turn, result);
                Vec::new()
            }
            SessionEvent::UploadRequested(files) => self.begin_upload(files),
            SessionEvent::UploadFinished {
                generation,
                file_count,
                result,
            } => self.finish_upload(generation, file_count, result),
            SessionEvent::UploadStatusExpired { generation } => {
                self.upload.expire(generation);
                Vec::new()
            }
        }
    }

    fn submit(&mut self, text: String) -> Vec<Effect> {
        if text.trim().is_empty() {
            debug!("Ignoring blank submission");
            return Vec::new();
        }
        if let DispatchState::Dispatching { turn, .. } = self.dispatch {
            debug!(turn, "Dispatch in flight, ignoring submission");
            return Vec::new();
        }

        self.store.append_user(text.clone());
        self.composer.clear();

        let turn = self.next_turn;
        self.next_turn += 1;
        self.dispatch = DispatchState::Dispatching {
            turn,
            abandoned: false,
        };

        // The store already holds the new user turn, exactly once
        let history = self.store.history().to_vec();

        info!(
            session_id = %self.session_id,
            turn,
            history_len = history.len(),
            "Dispatching turn to agent"
        );

        vec![Effect::InvokeAgent {
            turn,
            agent_id: self.agent_id.clone(),
            message: text,
            history,
        }]
    }

    fn finish_turn(&mut self, turn: u64, result: Result<Value, ServiceError>) {
        let DispatchState::Dispatching {
            turn: current,
            abandoned,
        } = self.dispatch
        else {
            debug!(turn, "Ignoring reply with no dispatch in flight");
            return;
        };
        if current != turn {
            debug!(turn, current, "Ignoring reply for another turn");
            return;
        }
        self.dispatch = DispatchState::Idle;

        if abandoned {
            debug!(turn, "Discarding reply for abandoned turn");
            return;
        }

        match result {
            Ok(reply) => {
                let agent_data = AgentResponse::from_reply(&reply);
                info!(
                    session_id = %self.session_id,
                    turn,
                    recommendations = agent_data.recommendations.len(),
                    suggestions = agent_data.suggestions.len(),
                    "Agent replied"
                );
                self.store.append_assistant(agent_data);
            }
            Err(e) => {
                warn!(session_id = %self.session_id, turn, error = ?e, "Agent call failed");
                self.store
                    .append_error(format!("{}{}", ERROR_TURN_PREFIX, e.user_message()));
            }
        }
    }

    fn select_category(&mut self, category: &str) {
        if !self.quick_actions_enabled() {
            debug!(category = %category, "Quick actions disabled while loading");
            return;
        }
        self.composer.set(&format!("Show me {}", category));
    }

    /// Clear the conversation, composer and sample-data mode. A dispatch in
    /// flight keeps the session loading until its reply arrives, and that
    /// reply is then dropped.
    fn new_chat(&mut self) {
        self.store.reset();
        self.composer.clear();
        self.sample_data_enabled = false;
        if let DispatchState::Dispatching { turn, .. } = self.dispatch {
            self.dispatch = DispatchState::Dispatching {
                turn,
                abandoned: true,
            };
        }
        info!(session_id = %self.session_id, "Started new chat");
    }

    fn toggle_sample_data(&mut self, enabled: bool) {
        if !enabled {
            self.new_chat();
            return;
        }

        self.sample_data_enabled = true;
        if self.store.is_empty() {
            self.store.seed(sample_conversation(now_millis()));
        }
    }

    fn begin_upload(&mut self, files: Vec<UploadFile>) -> Vec<Effect> {
        let files: Vec<UploadFile> = files
            .into_iter()
            .filter(|file| is_accepted_upload(&file.file_name))
            .collect();

        let Some(generation) = self.upload.begin(files.len()) else {
            return Vec::new();
        };

        vec![
            Effect::CancelStatusClear,
            Effect::IngestFiles {
                generation,
                knowledge_base_id: self.knowledge_base_id.clone(),
                files,
            },
        ]
    }

    fn finish_upload(
        &mut self,
        generation: u64,
        file_count: usize,
        result: Result<(), ServiceError>,
    ) -> Vec<Effect> {
        match result {
            Ok(()) => {
                if !self.upload.succeed(generation, file_count) {
                    return Vec::new();
                }
                info!(generation, file_count, "Upload succeeded");
                vec![Effect::ScheduleStatusClear {
                    generation,
                    delay: self.status_clear_delay,
                }]
            }
            Err(e) => {
                if self.upload.fail(generation, &e.user_message()) {
                    warn!(generation, error = ?e, "Upload failed");
                }
                Vec::new()
            }
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn upload(&self) -> &UploadState {
        &self.upload
    }

    pub fn dispatch_state(&self) -> DispatchState {
        self.dispatch
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.dispatch, DispatchState::Dispatching { .. })
    }

    pub fn sample_data_enabled(&self) -> bool {
        self.sample_data_enabled
    }

    /// Send is offered only for non-blank input while idle
    pub fn can_submit(&self) -> bool {
        !self.composer.is_blank() && !self.is_loading()
    }

    pub fn quick_actions_enabled(&self) -> bool {
        !self.is_loading()
    }

    /// The welcome screen with category chips replaces an empty chat
    pub fn show_welcome(&self) -> bool {
        self.store.is_empty()
    }

    pub fn loading_label(&self) -> Option<&'static str> {
        self.is_loading().then_some(LOADING_LABEL)
    }

    pub fn agent_status_label(&self) -> &'static str {
        if self.is_loading() {
            "Searching catalog..."
        } else {
            "Ready to help"
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            messages: self.store.messages().to_vec(),
            conversation_history: self.store.history().to_vec(),
            input_value: self.composer.value().to_string(),
            is_loading: self.is_loading(),
            sample_data_enabled: self.sample_data_enabled,
            upload_status: self.upload.status().cloned(),
            is_uploading: self.upload.is_uploading(),
            file_picker_generation: self.upload.file_picker_generation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::Role;
    use serde_json::json;

    fn session() -> SessionState {
        SessionState::new(&AppSettings::default())
    }

    fn submit_text(state: &mut SessionState, text: &str) -> Vec<Effect> {
        state.apply(SessionEvent::InputChanged(text.to_string()));
        state.apply(SessionEvent::Submit)
    }

    fn turn_of(effects: &[Effect]) -> u64 {
        match effects {
            [Effect::InvokeAgent { turn, .. }] => *turn,
            other => panic!("expected one InvokeAgent effect, got {:?}", other),
        }
    }

    #[test]
    fn test_submit_appends_user_turn_before_reply() {
        let mut state = session();

        let effects = submit_text(&mut state, "I need a laptop");

        assert_eq!(state.store().len(), 1);
        assert_eq!(state.store().messages()[0].content(), "I need a laptop");
        assert_eq!(
            state.store().history(),
            &[ConversationMessage::user("I need a laptop")]
        );
        assert!(state.is_loading());
        assert_eq!(state.composer().value(), "");

        match &effects[..] {
            [Effect::InvokeAgent {
                agent_id,
                message,
                history,
                ..
            }] => {
                assert_eq!(agent_id, "698e12e883ad001445fb4f9a");
                assert_eq!(message, "I need a laptop");
                assert_eq!(history, &vec![ConversationMessage::user("I need a laptop")]);
            }
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    #[test]
    fn test_history_sent_contains_new_turn_exactly_once() {
        let mut state = session();
        let first = turn_of(&submit_text(&mut state, "laptops"));
        state.apply(SessionEvent::AgentReplied {
            turn: first,
            result: Ok(json!({ "response": { "result": { "message": "Here you go" } } })),
        });

        let effects = submit_text(&mut state, "cheaper");

        match &effects[..] {
            [Effect::InvokeAgent { history, .. }] => {
                assert_eq!(
                    history,
                    &vec![
                        ConversationMessage::user("laptops"),
                        ConversationMessage::assistant("Here you go"),
                        ConversationMessage::user("cheaper"),
                    ]
                );
            }
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    #[test]
    fn test_blank_submission_is_rejected() {
        let mut state = session();

        assert!(submit_text(&mut state, "   \n ").is_empty());
        assert!(state.apply(SessionEvent::SuggestionClicked(" ".into())).is_empty());
        assert!(state.store().is_empty());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_submit_while_dispatching_is_a_no_op() {
        let mut state = session();
        submit_text(&mut state, "first");

        let effects = state.apply(SessionEvent::SuggestionClicked("second".into()));

        assert!(effects.is_empty());
        assert_eq!(state.store().len(), 1);
        assert_eq!(state.store().history().len(), 1);
    }

    #[test]
    fn test_composer_is_locked_while_dispatching() {
        let mut state = session();
        submit_text(&mut state, "first");

        state.apply(SessionEvent::InputChanged("typing ahead".into()));
        state.apply(SessionEvent::EnterPressed { shift: true });

        assert_eq!(state.composer().value(), "");
        assert!(!state.can_submit());
    }

    #[test]
    fn test_successful_reply_appends_assistant_turn() {
        let mut state = session();
        let turn = turn_of(&submit_text(&mut state, "I need a laptop"));

        state.apply(SessionEvent::AgentReplied {
            turn,
            result: Ok(json!({
                "response": {
                    "result": {
                        "message": "Here are laptops",
                        "recommendations": [{ "productName": "X" }],
                        "suggestions": ["cheaper options"]
                    }
                }
            })),
        });

        assert!(!state.is_loading());
        let reply = &state.store().messages()[1];
        assert_eq!(reply.content(), "Here are laptops");
        let data = reply.agent_data().unwrap();
        assert_eq!(data.recommendations[0].display_name(), "X");
        assert_eq!(data.recommendations[0].display_price(), "N/A");
        assert_eq!(
            state.store().history()[1],
            ConversationMessage::assistant("Here are laptops")
        );
    }

    #[test]
    fn test_failed_reply_appends_error_turn_without_history() {
        let mut state = session();
        let turn = turn_of(&submit_text(&mut state, "I need a laptop"));
        let history_before = state.store().history().to_vec();

        state.apply(SessionEvent::AgentReplied {
            turn,
            result: Err(ServiceError::Failed("timeout".into())),
        });

        let error_turn = &state.store().messages()[1];
        assert_eq!(
            error_turn.content(),
            "Sorry, I encountered an error: timeout"
        );
        assert_eq!(error_turn.role(), Role::Assistant);
        assert!(error_turn.agent_data().is_none());
        assert_eq!(state.store().history(), history_before.as_slice());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_error_without_message_uses_generic_label() {
        let mut state = session();
        let turn = turn_of(&submit_text(&mut state, "hi"));

        state.apply(SessionEvent::AgentReplied {
            turn,
            result: Err(ServiceError::Failed(String::new())),
        });

        assert_eq!(
            state.store().messages()[1].content(),
            "Sorry, I encountered an error: Unknown error"
        );
    }

    #[test]
    fn test_suggestion_click_submits_immediately() {
        let mut state = session();
        state.apply(SessionEvent::InputChanged("draft".into()));

        let effects = state.apply(SessionEvent::SuggestionClicked("cheaper options".into()));

        assert_eq!(effects.len(), 1);
        assert_eq!(state.store().messages()[0].content(), "cheaper options");
        assert_eq!(state.composer().value(), "");
    }

    #[test]
    fn test_category_seeds_composer_without_submitting() {
        let mut state = session();

        let effects = state.apply(SessionEvent::CategorySelected("Electronics".into()));

        assert!(effects.is_empty());
        assert_eq!(state.composer().value(), "Show me Electronics");
        assert!(state.store().is_empty());

        let effects = state.apply(SessionEvent::EnterPressed { shift: false });
        assert_eq!(effects.len(), 1);
        assert_eq!(state.store().messages()[0].content(), "Show me Electronics");
    }

    #[test]
    fn test_category_ignored_while_loading() {
        let mut state = session();
        submit_text(&mut state, "first");

        state.apply(SessionEvent::CategorySelected("Premium products".into()));

        assert_eq!(state.composer().value(), "");
        assert!(!state.quick_actions_enabled());
    }

    #[test]
    fn test_new_chat_resets_everything() {
        let mut state = session();
        state.apply(SessionEvent::SampleDataToggled(true));
        state.apply(SessionEvent::InputChanged("draft".into()));

        state.apply(SessionEvent::NewChat);

        assert!(state.store().is_empty());
        assert!(state.store().history().is_empty());
        assert_eq!(state.composer().value(), "");
        assert!(!state.sample_data_enabled());
        assert!(state.show_welcome());
    }

    #[test]
    fn test_reply_after_new_chat_is_discarded() {
        let mut state = session();
        let turn = turn_of(&submit_text(&mut state, "first"));

        state.apply(SessionEvent::NewChat);

        assert!(state.store().is_empty());
        assert!(state.is_loading());
        assert!(
            state
                .apply(SessionEvent::SuggestionClicked("second".into()))
                .is_empty()
        );
        assert!(state.store().is_empty());

        state.apply(SessionEvent::AgentReplied {
            turn,
            result: Ok(json!({ "response": { "result": { "message": "late" } } })),
        });

        assert!(state.store().is_empty());
        assert!(state.store().history().is_empty());
        assert!(!state.is_loading());

        let effects = state.apply(SessionEvent::SuggestionClicked("second".into()));
        assert_eq!(effects.len(), 1);
        assert_eq!(state.store().messages()[0].content(), "second");
    }

    #[test]
    fn test_disabling_sample_data_keeps_dispatch_in_flight() {
        let mut state = session();
        state.apply(SessionEvent::SampleDataToggled(true));
        let turn = turn_of(
            &state.apply(SessionEvent::SuggestionClicked("Compare these models".into())),
        );

        state.apply(SessionEvent::SampleDataToggled(false));

        assert!(state.store().is_empty());
        assert!(state.is_loading());
        assert_eq!(
            state.dispatch_state(),
            DispatchState::Dispatching {
                turn,
                abandoned: true
            }
        );

        state.apply(SessionEvent::AgentReplied {
            turn,
            result: Err(ServiceError::Failed("timeout".into())),
        });

        assert!(state.store().is_empty());
        assert_eq!(state.dispatch_state(), DispatchState::Idle);
    }

    #[test]
    fn test_sample_data_seeds_empty_conversation() {
        let mut state = session();

        let effects = state.apply(SessionEvent::SampleDataToggled(true));

        assert!(effects.is_empty());
        assert!(state.sample_data_enabled());
        assert_eq!(state.store().len(), 2);
        let reply = state.store().messages()[1].agent_data().unwrap();
        assert_eq!(reply.recommendations.len(), 3);
        assert_eq!(state.store().history().len(), 2);
    }

    #[test]
    fn test_sample_data_keeps_existing_conversation() {
        let mut state = session();
        let turn = turn_of(&submit_text(&mut state, "kettles"));
        state.apply(SessionEvent::AgentReplied {
            turn,
            result: Ok(json!({})),
        });

        state.apply(SessionEvent::SampleDataToggled(true));

        assert!(state.sample_data_enabled());
        assert_eq!(state.store().messages()[0].content(), "kettles");
        assert_eq!(state.store().len(), 2);
    }

    #[test]
    fn test_disabling_sample_data_starts_new_chat() {
        let mut state = session();
        state.apply(SessionEvent::SampleDataToggled(true));
        state.apply(SessionEvent::InputChanged("draft".into()));

        state.apply(SessionEvent::SampleDataToggled(false));

        assert!(state.store().is_empty());
        assert_eq!(state.composer().value(), "");
        assert!(!state.sample_data_enabled());
    }

    #[test]
    fn test_status_labels_follow_loading() {
        let mut state = session();
        assert_eq!(state.agent_status_label(), "Ready to help");
        assert_eq!(state.loading_label(), None);

        submit_text(&mut state, "first");

        assert_eq!(state.agent_status_label(), "Searching catalog...");
        assert_eq!(state.loading_label(), Some("Finding recommendations..."));
    }

    #[test]
    fn test_upload_filters_and_dispatches() {
        let mut state = session();

        let effects = state.apply(SessionEvent::UploadRequested(vec![
            UploadFile::new("catalog.pdf", b"%PDF".to_vec()),
            UploadFile::new("photo.png", b"png".to_vec()),
        ]));

        match &effects[..] {
            [
                Effect::CancelStatusClear,
                Effect::IngestFiles {
                    generation,
                    knowledge_base_id,
                    files,
                },
            ] => {
                assert_eq!(*generation, 1);
                assert_eq!(knowledge_base_id, "698e12c19cd132f4b7b4d67e");
                assert_eq!(files.len(), 1);
                assert_eq!(files[0].file_name, "catalog.pdf");
            }
            other => panic!("unexpected effects: {:?}", other),
        }
        assert!(state.upload().is_uploading());
    }

    #[test]
    fn test_upload_with_no_accepted_files_is_a_no_op() {
        let mut state = session();

        let effects = state.apply(SessionEvent::UploadRequested(vec![UploadFile::new(
            "photo.png",
            b"png".to_vec(),
        )]));

        assert!(effects.is_empty());
        assert!(state.upload().status().is_none());
    }

    #[test]
    fn test_successful_upload_schedules_status_clear() {
        let mut state = session();
        state.apply(SessionEvent::UploadRequested(vec![
            UploadFile::new("a.pdf", b"a".to_vec()),
            UploadFile::new("b.txt", b"b".to_vec()),
        ]));

        let effects = state.apply(SessionEvent::UploadFinished {
            generation: 1,
            file_count: 2,
            result: Ok(()),
        });

        assert_eq!(
            effects,
            vec![Effect::ScheduleStatusClear {
                generation: 1,
                delay: Duration::from_secs(5),
            }]
        );
        assert!(state.upload().status().unwrap().text.contains("2 file(s)"));

        state.apply(SessionEvent::UploadStatusExpired { generation: 1 });
        assert!(state.upload().status().is_none());
    }

    #[test]
    fn test_failed_upload_has_no_timer() {
        let mut state = session();
        state.apply(SessionEvent::UploadRequested(vec![UploadFile::new(
            "a.pdf",
            b"a".to_vec(),
        )]));

        let effects = state.apply(SessionEvent::UploadFinished {
            generation: 1,
            file_count: 1,
            result: Err(ServiceError::Failed("disk full".into())),
        });

        assert!(effects.is_empty());
        assert_eq!(
            state.upload().status().unwrap().text,
            "Upload failed: disk full"
        );
    }

    #[test]
    fn test_snapshot_mirrors_state() {
        let mut state = session();
        state.apply(SessionEvent::InputChanged("hello".into()));

        let snapshot = state.snapshot();

        assert_eq!(snapshot.input_value, "hello");
        assert!(!snapshot.is_loading);
        assert!(snapshot.messages.is_empty());
        assert_eq!(snapshot.session_id, state.session_id());
    }
}
