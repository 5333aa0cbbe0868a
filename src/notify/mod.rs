// src/notify/mod.rs
//! Alert delivery: message formatting, sinks (Telegram / log-only) and the dispatcher
//! that follows a single chat redirect.

pub mod format;
pub mod telegram;

use metrics::counter;
use std::fmt;

pub use format::format_alert;
pub use telegram::TelegramSink;

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// The chat moved; retry against the new recipient.
    Redirected(String),
    /// Permanent refusal (bot not in chat, bad token, ...).
    Rejected(String),
    /// Network errors, rate limits, server errors.
    TransientFailure(String),
}

impl DeliveryOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            DeliveryOutcome::Delivered => "delivered",
            DeliveryOutcome::Redirected(_) => "redirected",
            DeliveryOutcome::Rejected(_) => "rejected",
            DeliveryOutcome::TransientFailure(_) => "transient",
        }
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryOutcome::Delivered => f.write_str("delivered"),
            DeliveryOutcome::Redirected(to) => write!(f, "redirected to {to}"),
            DeliveryOutcome::Rejected(r) => write!(f, "rejected: {r}"),
            DeliveryOutcome::TransientFailure(r) => write!(f, "transient failure: {r}"),
        }
    }
}

#[async_trait::async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, recipient: &str, text: &str) -> DeliveryOutcome;
    fn name(&self) -> &'static str;
}

#[async_trait::async_trait]
impl<S: AlertSink + ?Sized> AlertSink for std::sync::Arc<S> {
    async fn deliver(&self, recipient: &str, text: &str) -> DeliveryOutcome {
        (**self).deliver(recipient, text).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Dry-run sink: logs the alert instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct LogSink;

#[async_trait::async_trait]
impl AlertSink for LogSink {
    async fn deliver(&self, recipient: &str, text: &str) -> DeliveryOutcome {
        tracing::info!(target: "alert", %recipient, "[dry-run] alert:\n{text}");
        DeliveryOutcome::Delivered
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Sends to the current recipient and follows at most one redirect per message.
/// After a redirect the new recipient is kept for the rest of the process.
pub struct Dispatcher {
    sink: Box<dyn AlertSink>,
    recipient: String,
}

impl Dispatcher {
    pub fn new(sink: Box<dyn AlertSink>, recipient: impl Into<String>) -> Self {
        Self {
            sink,
            recipient: recipient.into(),
        }
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub async fn send(&mut self, text: &str) -> DeliveryOutcome {
        let first = self.sink.deliver(&self.recipient, text).await;
        let outcome = match first {
            DeliveryOutcome::Redirected(new_recipient) => {
                tracing::warn!(
                    target: "alert",
                    old = %self.recipient,
                    new = %new_recipient,
                    "chat migrated, retrying once; update TELEGRAM_CHAT_ID to the new id"
                );
                self.recipient = new_recipient;
                self.sink.deliver(&self.recipient, text).await
            }
            other => other,
        };

        match &outcome {
            DeliveryOutcome::Delivered => {
                tracing::info!(target: "alert", sink = self.sink.name(), "alert delivered");
            }
            DeliveryOutcome::Rejected(reason) => {
                counter!("delivery_failures_total", "kind" => "rejected").increment(1);
                tracing::error!(target: "alert", sink = self.sink.name(), "alert rejected: {reason}");
            }
            failed => {
                counter!("delivery_failures_total", "kind" => failed.kind()).increment(1);
                tracing::warn!(target: "alert", sink = self.sink.name(), "alert not delivered: {failed}");
            }
        }
        outcome
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted outcomes and records every (recipient, text) call.
    pub(crate) struct ScriptedSink {
        pub outcomes: Mutex<VecDeque<DeliveryOutcome>>,
        pub calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedSink {
        pub(crate) fn new(outcomes: Vec<DeliveryOutcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait::async_trait]
    impl AlertSink for ScriptedSink {
        async fn deliver(&self, recipient: &str, text: &str) -> DeliveryOutcome {
            self.calls
                .lock()
                .unwrap()
                .push((recipient.to_string(), text.to_string()));
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(DeliveryOutcome::Delivered)
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn redirect_retries_once_and_sticks() {
        let sink = std::sync::Arc::new(ScriptedSink::new(vec![
            DeliveryOutcome::Redirected("-100777".into()),
            DeliveryOutcome::Delivered,
            DeliveryOutcome::Delivered,
        ]));
        let mut d = Dispatcher::new(Box::new(sink.clone()), "-42");

        assert_eq!(d.send("first").await, DeliveryOutcome::Delivered);
        assert_eq!(d.recipient(), "-100777");
        assert_eq!(d.send("second").await, DeliveryOutcome::Delivered);

        let calls = sink.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                ("-42".to_string(), "first".to_string()),
                ("-100777".to_string(), "first".to_string()),
                ("-100777".to_string(), "second".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn second_redirect_is_not_followed() {
        let sink = std::sync::Arc::new(ScriptedSink::new(vec![
            DeliveryOutcome::Redirected("a".into()),
            DeliveryOutcome::Redirected("b".into()),
        ]));
        let mut d = Dispatcher::new(Box::new(sink.clone()), "start");
        let out = d.send("msg").await;
        assert_eq!(out, DeliveryOutcome::Redirected("b".into()));
        assert_eq!(sink.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rejection_is_not_retried() {
        let sink = std::sync::Arc::new(ScriptedSink::new(vec![DeliveryOutcome::Rejected(
            "Forbidden: bot was kicked".into(),
        )]));
        let mut d = Dispatcher::new(Box::new(sink.clone()), "chat");
        assert!(matches!(d.send("msg").await, DeliveryOutcome::Rejected(_)));
        assert_eq!(sink.calls.lock().unwrap().len(), 1);
    }
}
