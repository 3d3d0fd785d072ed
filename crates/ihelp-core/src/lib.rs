pub mod config;
pub mod document;
pub mod error;
pub mod gateway;
pub mod response;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use config::{Config, GatewaySettings, Overrides};
pub use document::{DocumentMetadata, DocumentRef};
pub use error::GatewayError;
pub use gateway::{BackendClient, ChatRequest};
pub use response::{MissingField, EMPTY_REPLY};
pub use session::{Entry, Session, GREETING};
pub use state::{Message, Role};
