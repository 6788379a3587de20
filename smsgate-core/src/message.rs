// ABOUTME: Framework-native message types exchanged with backends
// ABOUTME: Outgoing messages are validated before sending; incoming ones carry their origin backend

use crate::error::BackendError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Outgoing Message
// =============================================================================

/// A message the framework wants delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    recipient: String,
    text: String,
}

impl OutgoingMessage {
    pub fn new(recipient: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            text: text.into(),
        }
    }

    /// Destination phone number, exactly as given
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Check the recipient looks like a phone number.
    ///
    /// Accepts an optional leading `+`, digits, and the separators people
    /// usually type (space, `-`, `.`, parentheses). At least one digit is required.
    pub fn validate(&self) -> Result<(), BackendError> {
        let recipient = self.recipient.trim();
        if recipient.is_empty() {
            return Err(BackendError::InvalidArgument(
                "outgoing message has no recipient".to_string(),
            ));
        }

        let digits = recipient.strip_prefix('+').unwrap_or(recipient);
        let mut digit_count = 0;
        for c in digits.chars() {
            match c {
                '0'..='9' => digit_count += 1,
                ' ' | '-' | '.' | '(' | ')' => {}
                _ => {
                    return Err(BackendError::InvalidArgument(format!(
                        "recipient {:?} is not a phone number",
                        self.recipient
                    )))
                }
            }
        }
        if digit_count == 0 {
            return Err(BackendError::InvalidArgument(format!(
                "recipient {:?} contains no digits",
                self.recipient
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Incoming Message
// =============================================================================

/// A message received by a backend, ready for the router
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Unique id assigned on arrival
    pub id: Uuid,
    /// Id of the backend that received it; resolve through `BackendRegistry::get`
    pub origin: String,
    /// Sender's phone number
    pub sender: String,
    /// When the sender's network says it was sent
    pub sent: DateTime<Utc>,
    /// When the backend translated it
    pub received: DateTime<Utc>,
    pub text: String,
}

impl IncomingMessage {
    pub fn new(
        origin: impl Into<String>,
        sender: impl Into<String>,
        sent: DateTime<Utc>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin: origin.into(),
            sender: sender.into(),
            sent,
            received: Utc::now(),
            text: text.into(),
        }
    }

    /// Build a response addressed back to the sender
    pub fn reply(&self, text: impl Into<String>) -> OutgoingMessage {
        OutgoingMessage::new(self.sender.clone(), text)
    }
}
