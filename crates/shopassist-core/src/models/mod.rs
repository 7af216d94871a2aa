pub mod agent_response;
pub mod composer;
pub mod conversation_store;
pub mod message;
pub mod product;
pub mod product_card;
pub mod sample_data;
pub mod session_state;
pub mod upload_state;

pub use agent_response::AgentResponse;
pub use composer::{Composer, MAX_INPUT_CHARS};
pub use conversation_store::ConversationStore;
pub use message::{ConversationMessage, Message, Role};
pub use product::Product;
pub use product_card::ProductCard;
pub use session_state::{
    CATEGORY_SHORTCUTS, DispatchState, Effect, SessionEvent, SessionSnapshot, SessionState,
};
pub use upload_state::{StatusSeverity, UploadPhase, UploadState, UploadStatus};
