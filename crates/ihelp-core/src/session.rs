//! The conversation store and the single-request send state machine
//!
//! A send moves `Idle -> Pending -> Idle`. While pending, further sends are
//! ignored rather than queued.

use tracing::{debug, info};

use crate::document::DocumentRef;
use crate::error::GatewayError;
use crate::gateway::{BackendClient, ChatRequest};
use crate::state::{Message, Role};

pub const GREETING: &str =
    "Hi! I'm here to help you with questions about your document. What would you like to know?";

/// One renderable row of the conversation
#[derive(Debug, Clone, Copy)]
pub enum Entry<'a> {
    Message(&'a Message),
    Thinking,
}

#[derive(Debug)]
pub struct Session {
    messages: Vec<Message>,
    next_id: u64,
    pending: bool,
    active_document: Option<String>,
    documents: Vec<DocumentRef>,
    revision: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh session opening with the assistant's greeting
    pub fn new() -> Self {
        let mut session = Self::empty();
        session.append_message(Role::Bot, GREETING);
        session
    }

    pub fn empty() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
            pending: false,
            active_document: None,
            documents: Vec::new(),
            revision: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn append_message(&mut self, role: Role, content: impl Into<String>) -> &Message {
        let message = Message::new(self.next_id, role, content);
        self.next_id += 1;
        self.messages.push(message);
        self.touch();
        &self.messages[self.messages.len() - 1]
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn set_pending(&mut self, pending: bool) {
        if self.pending != pending {
            self.pending = pending;
            self.touch();
        }
    }

    /// Messages in order, followed by a thinking placeholder iff a request is pending
    pub fn transcript(&self) -> impl Iterator<Item = Entry<'_>> + '_ {
        self.messages
            .iter()
            .map(Entry::Message)
            .chain(self.pending.then_some(Entry::Thinking))
    }

    /// Start a send. Returns `None` (and changes nothing) for blank input or
    /// while another request is pending.
    pub fn begin_send(&mut self, text: &str) -> Option<ChatRequest> {
        if text.trim().is_empty() {
            return None;
        }
        if self.pending {
            debug!("send ignored, a request is already pending");
            return None;
        }

        self.append_message(Role::User, text);
        self.set_pending(true);

        Some(ChatRequest::new(text, self.active_document.clone()))
    }

    /// Record the reply (or error text) and return to idle
    pub fn finish_send(&mut self, reply: impl Into<String>) {
        self.append_message(Role::Bot, reply);
        self.set_pending(false);
    }

    /// Full round-trip. Returns false when the send was not accepted.
    pub async fn send(&mut self, client: &BackendClient, text: &str) -> bool {
        let Some(request) = self.begin_send(text) else {
            return false;
        };
        let reply = client.send_chat(&request).await;
        self.finish_send(reply);
        true
    }

    pub fn active_document(&self) -> Option<&str> {
        self.active_document.as_deref()
    }

    pub fn set_active_document(&mut self, document: Option<String>) {
        info!(document = ?document, "active document changed");
        self.active_document = document;
        self.touch();
    }

    pub fn documents(&self) -> &[DocumentRef] {
        &self.documents
    }

    /// Store a fetched document list. A failure is explained in the chat and
    /// leaves the list empty.
    pub fn apply_documents(&mut self, result: Result<Vec<DocumentRef>, GatewayError>) -> &[DocumentRef] {
        match result {
            Ok(documents) => {
                self.documents = documents;
                self.touch();
            }
            Err(e) => {
                self.documents.clear();
                self.append_message(
                    Role::Bot,
                    format!("I couldn't load the document list. {}", e.user_message()),
                );
            }
        }
        &self.documents
    }

    pub async fn refresh_documents(&mut self, client: &BackendClient) -> &[DocumentRef] {
        let result = client.list_documents().await;
        self.apply_documents(result)
    }

    /// Bumped on every change; front ends compare it to decide when to scroll
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_with_greeting() {
        let session = Session::new();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role(), Role::Bot);
        assert_eq!(session.messages()[0].content(), GREETING);
        assert!(!session.is_pending());
    }

    #[test]
    fn test_append_assigns_increasing_ids() {
        let mut session = Session::empty();
        let a = session.append_message(Role::User, "a").id();
        let b = session.append_message(Role::Bot, "b").id();
        let c = session.append_message(Role::User, "c").id();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_successful_send_appends_user_then_bot() {
        let mut session = Session::empty();
        let request = session.begin_send("hello").unwrap();
        assert_eq!(request.message, "hello");
        assert!(session.is_pending());

        session.finish_send("hi there");
        assert!(!session.is_pending());

        let roles: Vec<Role> = session.messages().iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec![Role::User, Role::Bot]);
        assert_eq!(session.messages()[1].content(), "hi there");
    }

    #[test]
    fn test_send_rejected_while_pending() {
        let mut session = Session::empty();
        session.begin_send("first").unwrap();
        let before = session.messages().len();

        assert!(session.begin_send("second").is_none());
        assert_eq!(session.messages().len(), before);
        assert!(session.is_pending());
    }

    #[test]
    fn test_blank_input_is_rejected() {
        let mut session = Session::empty();
        assert!(session.begin_send("").is_none());
        assert!(session.begin_send("   \n\t").is_none());
        assert!(session.messages().is_empty());
        assert!(!session.is_pending());
    }

    #[test]
    fn test_request_carries_active_document() {
        let mut session = Session::empty();
        session.set_active_document(Some("doc123".to_string()));
        let request = session.begin_send("Summarize the document").unwrap();
        assert_eq!(request.document_name.as_deref(), Some("doc123"));

        session.finish_send("done");
        session.set_active_document(None);
        let request = session.begin_send("again").unwrap();
        assert_eq!(request.document_name, None);
    }

    #[test]
    fn test_transcript_shows_thinking_only_while_pending() {
        let mut session = Session::empty();
        session.append_message(Role::Bot, "hello");
        assert!(!session.transcript().any(|e| matches!(e, Entry::Thinking)));

        session.begin_send("question").unwrap();
        let entries: Vec<Entry<'_>> = session.transcript().collect();
        assert_eq!(entries.len(), 3);
        assert!(matches!(entries.last(), Some(Entry::Thinking)));
        // the placeholder is never stored
        assert_eq!(session.messages().len(), 2);

        session.finish_send("answer");
        assert!(!session.transcript().any(|e| matches!(e, Entry::Thinking)));
    }

    #[test]
    fn test_failed_document_fetch_explains_and_empties_list() {
        let mut session = Session::empty();
        session.apply_documents(Ok(vec![DocumentRef::new("a")]));
        assert_eq!(session.documents().len(), 1);

        let docs = session.apply_documents(Err(GatewayError::Network("refused".into())));
        assert!(docs.is_empty());
        assert_eq!(session.documents().len(), 0);

        let last = session.messages().last().unwrap();
        assert_eq!(last.role(), Role::Bot);
        assert!(last.content().contains("document list"));
    }

    #[test]
    fn test_revision_changes_on_every_mutation() {
        let mut session = Session::empty();
        let r0 = session.revision();
        session.append_message(Role::User, "x");
        let r1 = session.revision();
        session.set_pending(true);
        let r2 = session.revision();
        session.set_pending(true);
        let r3 = session.revision();

        assert!(r1 > r0);
        assert!(r2 > r1);
        assert_eq!(r3, r2);
    }
}
