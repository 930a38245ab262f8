//! Message types sent to a generative model.

use crate::Role;
use serde::{Deserialize, Serialize};

/// A single text turn in a model request.
///
/// # Examples
///
/// ```
/// use sahayak_core::{Message, Role};
///
/// let message = Message::user("Write a poem about rain");
///
/// assert_eq!(*message.role(), Role::User);
/// assert_eq!(message.text(), "Write a poem about rain");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct Message {
    /// The role of the message sender
    role: Role,
    /// The text of the message
    text: String,
}

impl Message {
    /// Creates a new message with the given role and text.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    /// Creates a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Returns a builder for constructing a Message.
    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }
}
