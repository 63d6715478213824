//! Outbound message delivery.
//!
//! Sending is a collaborator the server doesn't own: the WhatsApp
//! Business API in production, a log line in development, a recorder in
//! tests. [`MessageSender`] is the seam.

use rand::Rng;

/// A fully expanded message ready to hand to a delivery channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Recipient phone number, digits only (see [`normalize_phone`]).
    pub to: String,
    /// The catalog template this message was rendered from.
    pub template_id: String,
    /// Parameters in placeholder order, for channels that render
    /// templates themselves.
    pub params: Vec<String>,
    /// The rendered text.
    pub body: String,
}

/// Delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The channel refused the message (bad number, template not approved).
    #[error("message rejected: {0}")]
    Rejected(String),

    /// The channel couldn't be reached.
    #[error("delivery channel unavailable: {0}")]
    Unavailable(String),
}

/// Hands messages to a delivery channel.
pub trait MessageSender: Send + Sync + 'static {
    /// Sends `message`, returning the channel's message id.
    fn send(
        &self,
        message: &OutboundMessage,
    ) -> impl std::future::Future<Output = Result<String, DeliveryError>> + Send;
}

/// Development sender: logs the message and pretends it went out.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSender;

impl MessageSender for LogSender {
    async fn send(&self, message: &OutboundMessage) -> Result<String, DeliveryError> {
        let id = message_id();
        tracing::info!(
            message_id = %id,
            to = %message.to,
            template = %message.template_id,
            body = %message.body,
            "outbound message (log only)"
        );
        Ok(id)
    }
}

fn message_id() -> String {
    let bytes: [u8; 12] = rand::rng().random();
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!("local.{hex}")
}

/// Reduces a phone number to the digits WhatsApp expects.
///
/// Spaces, dashes, dots, parentheses and one leading `+` are dropped.
/// Anything else, or a result outside 8 to 15 digits (E.164 bounds), is
/// rejected with `None`.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let rest = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return None,
        }
    }

    (8..=15).contains(&digits.len()).then_some(digits)
}
