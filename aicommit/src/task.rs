//! Generation tasks.
//!
//! A [`GenerationTask`] runs one [`Generator::generate`] call on the tokio
//! runtime and delivers exactly one [`AppEvent::Generation`] tagged with its
//! epoch, whether the call succeeded, failed, hit its deadline, or was
//! cancelled. [`TaskRunner`] keeps at most one task alive.

use std::sync::Arc;
use std::time::Duration;

use aicommit_core::Generator;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::app::Completion;
use crate::event::AppEvent;

/// Failure text delivered when a task is cancelled.
pub const CANCELLED: &str = "cancelled";

/// Handle to one in-flight generation attempt.
#[derive(Debug)]
pub struct GenerationTask {
    epoch: u64,
    cancel: CancellationToken,
}

impl GenerationTask {
    /// Spawns the attempt for `epoch` on the current runtime.
    ///
    /// The spawned future races the generator against `deadline` and the
    /// cancellation token, then sends its single completion on `tx`. A
    /// closed channel is ignored: the loop has already exited.
    pub fn spawn(
        epoch: u64,
        diff: Arc<str>,
        deadline: Duration,
        generator: Arc<dyn Generator>,
        tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => Err(CANCELLED.to_string()),
                outcome = tokio::time::timeout(deadline, generator.generate(&diff, deadline)) => {
                    match outcome {
                        Ok(Ok(message)) => Ok(message),
                        Ok(Err(e)) => Err(e.to_string()),
                        Err(_) => Err(format!("timeout after {}s", deadline.as_secs())),
                    }
                }
            };
            debug!("Generation {} finished: ok={}", epoch, result.is_ok());
            let _ = tx.send(AppEvent::Generation(Completion { epoch, result }));
        });

        Self { epoch, cancel }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Requests cooperative cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Owns the generator and the at-most-one active [`GenerationTask`].
pub struct TaskRunner {
    generator: Arc<dyn Generator>,
    tx: mpsc::UnboundedSender<AppEvent>,
    active: Option<GenerationTask>,
}

impl TaskRunner {
    pub fn new(generator: Arc<dyn Generator>, tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { generator, tx, active: None }
    }

    /// Starts a task for `epoch`, cancelling whatever was running.
    pub fn launch(&mut self, epoch: u64, diff: Arc<str>, deadline: Duration) {
        if let Some(previous) = self.active.take() {
            debug!("Superseding generation {} with {}", previous.epoch(), epoch);
            previous.cancel();
        }
        self.active = Some(GenerationTask::spawn(
            epoch,
            diff,
            deadline,
            Arc::clone(&self.generator),
            self.tx.clone(),
        ));
    }

    /// Cancels the active task if it belongs to `epoch`.
    pub fn cancel(&mut self, epoch: u64) {
        if self.active.as_ref().is_some_and(|t| t.epoch() == epoch) {
            if let Some(task) = self.active.take() {
                debug!("Cancelling generation {}", epoch);
                task.cancel();
            }
        }
    }

    /// Forgets the active task once its completion for `epoch` has arrived.
    pub fn finished(&mut self, epoch: u64) {
        if self.active.as_ref().is_some_and(|t| t.epoch() == epoch) {
            self.active = None;
        }
    }

    /// Epoch of the active task, if any.
    #[cfg(test)]
    pub fn active_epoch(&self) -> Option<u64> {
        self.active.as_ref().map(GenerationTask::epoch)
    }

    /// Cancels the active task on loop exit.
    pub fn shutdown(&mut self) {
        if let Some(task) = self.active.take() {
            task.cancel();
        }
    }

    /// Label of the underlying generator.
    pub fn name(&self) -> &str {
        self.generator.name()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use aicommit_core::ProviderError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Generator returning scripted replies after a per-call delay.
    pub(crate) struct FakeGenerator {
        replies: Mutex<Vec<(Duration, Result<String, String>)>>,
        pub(crate) calls: AtomicUsize,
    }

    impl FakeGenerator {
        /// Replies are consumed in call order; the last one repeats.
        pub(crate) fn new(replies: Vec<(Duration, Result<&str, &str>)>) -> Arc<Self> {
            let replies = replies
                .into_iter()
                .map(|(d, r)| (d, r.map(str::to_owned).map_err(str::to_owned)))
                .collect();
            Arc::new(Self { replies: Mutex::new(replies), calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl Generator for FakeGenerator {
        async fn generate(&self, _diff: &str, _deadline: Duration) -> Result<String, ProviderError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let (delay, reply) = {
                let replies = self.replies.lock().unwrap();
                let idx = n.min(replies.len() - 1);
                replies[idx].clone()
            };
            tokio::time::sleep(delay).await;
            reply.map_err(ProviderError::Malformed)
        }

        fn name(&self) -> &str {
            "Fake (model)"
        }
    }

    async fn next_completion(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Completion {
        match rx.recv().await {
            Some(AppEvent::Generation(c)) => c,
            other => panic!("expected a completion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_success_is_tagged_with_epoch() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let fake = FakeGenerator::new(vec![(Duration::ZERO, Ok("feat: x"))]);
        let _task = GenerationTask::spawn(7, Arc::from("diff"), Duration::from_secs(5), fake, tx);
        let c = next_completion(&mut rx).await;
        assert_eq!(c, Completion { epoch: 7, result: Ok("feat: x".to_string()) });
    }

    #[tokio::test]
    async fn test_provider_error_is_rendered() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let fake = FakeGenerator::new(vec![(Duration::ZERO, Err("bad json"))]);
        let _task = GenerationTask::spawn(0, Arc::from("diff"), Duration::from_secs(5), fake, tx);
        let c = next_completion(&mut rx).await;
        assert_eq!(c.result, Err("Malformed response from model: bad json".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_produces_timeout() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let fake = FakeGenerator::new(vec![(Duration::from_secs(60), Ok("late"))]);
        let _task = GenerationTask::spawn(0, Arc::from("diff"), Duration::from_secs(30), fake, tx);
        let c = next_completion(&mut rx).await;
        assert_eq!(c.result, Err("timeout after 30s".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_delivers_cancelled_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let fake = FakeGenerator::new(vec![(Duration::from_secs(10), Ok("late"))]);
        let task = GenerationTask::spawn(3, Arc::from("diff"), Duration::from_secs(30), fake, tx);
        task.cancel();
        task.cancel();
        let c = next_completion(&mut rx).await;
        assert_eq!(c, Completion { epoch: 3, result: Err(CANCELLED.to_string()) });
        // The sender was dropped with the task, so the channel is now closed.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_runner_keeps_one_task() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let fake = FakeGenerator::new(vec![(Duration::from_secs(5), Ok("msg"))]);
        let mut runner = TaskRunner::new(fake.clone(), tx);
        assert_eq!(runner.name(), "Fake (model)");

        runner.launch(0, Arc::from("diff"), Duration::from_secs(30));
        runner.launch(1, Arc::from("diff"), Duration::from_secs(30));
        assert_eq!(runner.active_epoch(), Some(1));

        // Epoch 0 was superseded and reports cancellation first.
        let first = next_completion(&mut rx).await;
        assert_eq!(first, Completion { epoch: 0, result: Err(CANCELLED.to_string()) });
        let second = next_completion(&mut rx).await;
        assert_eq!(second, Completion { epoch: 1, result: Ok("msg".to_string()) });

        // A stale epoch does not clear the active task.
        runner.finished(0);
        assert_eq!(runner.active_epoch(), Some(1));
        runner.finished(1);
        assert_eq!(runner.active_epoch(), None);
        // The superseded task never reached the generator.
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runner_cancel_matches_epoch() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let fake = FakeGenerator::new(vec![(Duration::from_secs(5), Ok("msg"))]);
        let mut runner = TaskRunner::new(fake, tx);
        runner.launch(2, Arc::from("diff"), Duration::from_secs(30));

        runner.cancel(1);
        assert_eq!(runner.active_epoch(), Some(2));
        runner.cancel(2);
        assert_eq!(runner.active_epoch(), None);

        let c = next_completion(&mut rx).await;
        assert_eq!(c, Completion { epoch: 2, result: Err(CANCELLED.to_string()) });
        runner.shutdown();
    }
}
