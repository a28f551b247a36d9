use std::collections::VecDeque;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{SmsMessage, SmsSender};

const OUTBOX_CAP: usize = 32;

/// Logs messages instead of sending them.
///
/// The most recent messages stay in a bounded outbox for inspection.
/// Bodies carry codes and passwords and are never logged.
#[derive(Default)]
pub struct LogSmsSender {
    outbox: Mutex<VecDeque<SmsMessage>>,
}

impl LogSmsSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recent messages, oldest first.
    pub async fn sent(&self) -> Vec<SmsMessage> {
        self.outbox.lock().await.iter().cloned().collect()
    }
}

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send(&self, message: SmsMessage) -> Result<()> {
        tracing::info!(to = %message.to, chars = message.text.chars().count(), "SMS not delivered (no gateway)");

        let mut outbox = self.outbox.lock().await;
        if outbox.len() == OUTBOX_CAP {
            outbox.pop_front();
        }
        outbox.push_back(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(n: usize) -> SmsMessage {
        SmsMessage {
            to: "01012345678".into(),
            from: "Galleria".into(),
            text: format!("message {n}"),
        }
    }

    #[tokio::test]
    async fn outbox_keeps_only_recent_messages() {
        let sender = LogSmsSender::new();
        for n in 0..50 {
            sender.send(message(n)).await.unwrap();
        }

        let sent = sender.sent().await;
        assert_eq!(sent.len(), OUTBOX_CAP);
        assert_eq!(sent[0].text, format!("message {}", 50 - OUTBOX_CAP));
        assert_eq!(sent.last().unwrap().text, "message 49");
    }
}
