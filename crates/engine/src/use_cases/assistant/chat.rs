//! Conversational assistant over provider threads.

use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::ports::{AssistantPort, MessageRole, RunStatus};

use super::AiError;

pub struct ChatOps {
    assistant: Arc<dyn AssistantPort>,
    poll_interval: Duration,
}

impl ChatOps {
    pub fn new(assistant: Arc<dyn AssistantPort>, poll_interval: Duration) -> Self {
        Self {
            assistant,
            poll_interval,
        }
    }

    pub async fn create_thread(&self) -> Result<String, AiError> {
        let thread_id = self.assistant.create_thread().await?;
        tracing::debug!(thread_id = %thread_id, "Opened assistant thread");
        Ok(thread_id)
    }

    /// Send `message`, wait for the run to settle, return the reply text.
    ///
    /// The wait is unbounded: the run is polled every `poll_interval` until
    /// it completes or reaches a failed terminal status.
    pub async fn post_message(&self, thread_id: &str, message: &str) -> Result<String, AiError> {
        self.assistant.add_user_message(thread_id, message).await?;
        let mut run = self.assistant.start_run(thread_id).await?;

        loop {
            match run.status {
                RunStatus::Completed => break,
                status if status.is_failure() => {
                    tracing::warn!(
                        thread_id = %thread_id,
                        run_id = %run.id,
                        status = status.as_str(),
                        "Assistant run failed"
                    );
                    return Err(AiError::RunFailed(status));
                }
                _ => {
                    tokio::time::sleep(self.poll_interval).await;
                    run = self.assistant.get_run(thread_id, &run.id).await?;
                }
            }
        }

        let messages = self.assistant.list_messages(thread_id).await?;
        messages
            .into_iter()
            .find(|m| m.role == MessageRole::Assistant && m.run_id.as_deref() == Some(&run.id))
            .map(|m| m.text_segments.join("\n"))
            .ok_or(AiError::NoReply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{AssistantRun, MockAssistantPort, ThreadMessage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn run(status: RunStatus) -> AssistantRun {
        AssistantRun {
            id: "run_1".into(),
            status,
        }
    }

    fn assistant_message(run_id: &str, segments: &[&str]) -> ThreadMessage {
        ThreadMessage {
            id: format!("msg_{}", run_id),
            role: MessageRole::Assistant,
            run_id: Some(run_id.into()),
            text_segments: segments.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn port_with_statuses(statuses: Vec<RunStatus>) -> MockAssistantPort {
        let mut port = MockAssistantPort::new();
        port.expect_add_user_message()
            .withf(|thread, content| thread == "thread_1" && content == "Hello?")
            .times(1)
            .returning(|_, _| Ok(()));
        port.expect_start_run()
            .times(1)
            .returning(|_| Ok(run(RunStatus::Queued)));
        let calls = AtomicUsize::new(0);
        port.expect_get_run().returning(move |_, _| {
            let i = calls.fetch_add(1, Ordering::SeqCst);
            Ok(run(statuses[i.min(statuses.len() - 1)]))
        });
        port
    }

    #[tokio::test]
    async fn polls_until_completed_and_joins_reply_segments() {
        let mut port = port_with_statuses(vec![RunStatus::InProgress, RunStatus::Completed]);
        port.expect_list_messages().returning(|_| {
            Ok(vec![
                assistant_message("run_1", &["Hi there.", "How can I help?"]),
                assistant_message("run_0", &["Old reply"]),
            ])
        });

        let reply = ChatOps::new(Arc::new(port), Duration::ZERO)
            .post_message("thread_1", "Hello?")
            .await
            .unwrap();
        assert_eq!(reply, "Hi there.\nHow can I help?");
    }

    #[tokio::test]
    async fn failed_run_is_an_error() {
        let mut port = port_with_statuses(vec![RunStatus::Expired]);
        port.expect_list_messages().never();

        let result = ChatOps::new(Arc::new(port), Duration::ZERO)
            .post_message("thread_1", "Hello?")
            .await;
        assert!(matches!(result, Err(AiError::RunFailed(RunStatus::Expired))));
    }

    #[tokio::test]
    async fn completed_run_without_matching_message_has_no_reply() {
        let mut port = port_with_statuses(vec![RunStatus::Completed]);
        port.expect_list_messages()
            .returning(|_| Ok(vec![assistant_message("run_0", &["Stale"])]));

        let result = ChatOps::new(Arc::new(port), Duration::ZERO)
            .post_message("thread_1", "Hello?")
            .await;
        assert!(matches!(result, Err(AiError::NoReply)));
    }
}
