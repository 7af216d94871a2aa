pub mod session_controller;


pub use session_controller::{SessionClosed, SessionController, SessionHandle, open_session};
