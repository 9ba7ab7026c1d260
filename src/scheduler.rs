//! Trailing-edge debounce scheduler.
//!
//! Coalesces bursts of trigger events into a single delayed invocation of a
//! bound async action. The action runs inline in the scheduler task, so no
//! two invocations from the same scheduler can ever overlap.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Default quiescence window before the bound action fires.
pub const DEFAULT_WAIT: Duration = Duration::from_millis(300);

/// A single-timer trailing-edge debouncer.
///
/// Each `schedule()` (re)arms the timer for the full wait; the action fires
/// once after a burst of triggers quiesces. A trigger arriving while the
/// action is executing does not start a second execution: it re-arms the
/// timer for a full wait after the current execution completes.
pub struct Debouncer {
    trigger_tx: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl Debouncer {
    /// Spawn a scheduler that invokes `action` after `wait` of quiescence.
    pub fn new<F, Fut>(wait: Duration, mut action: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (trigger_tx, mut trigger_rx) = mpsc::unbounded_channel::<()>();

        let task = tokio::spawn(async move {
            debug!("Debounce scheduler started (wait: {:?})", wait);

            'running: loop {
                // Park until the first trigger of a burst. A closed channel
                // means the scheduler was torn down.
                if trigger_rx.recv().await.is_none() {
                    break;
                }

                // Trailing edge: every further trigger restarts the timer.
                loop {
                    let sleep = tokio::time::sleep(wait);
                    tokio::pin!(sleep);

                    tokio::select! {
                        _ = &mut sleep => break,
                        trigger = trigger_rx.recv() => {
                            if trigger.is_none() {
                                // Teardown cancels the pending timer; the
                                // action is never invoked for this burst.
                                break 'running;
                            }
                            trace!("Trigger during wait, timer restarted");
                        }
                    }
                }

                // Quiescent: run the action to completion. Triggers arriving
                // now queue in the channel and re-arm the timer afterwards.
                action().await;
            }

            debug!("Debounce scheduler stopped");
        });

        Self { trigger_tx, task }
    }

    /// Record a trigger event. Ignored after teardown.
    pub fn schedule(&self) {
        let _ = self.trigger_tx.send(());
    }

    /// Tear the scheduler down.
    ///
    /// Any pending timer is cancelled and no further invocation occurs. An
    /// execution already in flight runs to completion before the task exits.
    pub async fn shutdown(self) {
        drop(self.trigger_tx);
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts invocations and tracks how many run concurrently.
    #[derive(Default)]
    struct ActionProbe {
        started: AtomicUsize,
        finished: AtomicUsize,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl ActionProbe {
        fn enter(&self) {
            self.started.fetch_add(1, Ordering::SeqCst);
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(active, Ordering::SeqCst);
        }

        fn exit(&self) {
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counting_debouncer(wait_ms: u64, run_ms: u64, probe: Arc<ActionProbe>) -> Debouncer {
        Debouncer::new(Duration::from_millis(wait_ms), move || {
            let probe = probe.clone();
            async move {
                probe.enter();
                if run_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(run_ms)).await;
                }
                probe.exit();
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_triggers_fires_once() {
        let probe = Arc::new(ActionProbe::default());
        let debouncer = counting_debouncer(300, 0, probe.clone());

        // Five triggers in a burst, then three more spaced under the wait.
        for _ in 0..5 {
            debouncer.schedule();
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
        debouncer.schedule();
        tokio::time::sleep(Duration::from_millis(200)).await;
        debouncer.schedule();

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(probe.finished.load(Ordering::SeqCst), 1);

        debouncer.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_is_reusable_after_firing() {
        let probe = Arc::new(ActionProbe::default());
        let debouncer = counting_debouncer(300, 0, probe.clone());

        debouncer.schedule();
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(probe.finished.load(Ordering::SeqCst), 1);

        debouncer.schedule();
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(probe.finished.load(Ordering::SeqCst), 2);

        debouncer.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_during_execution_rearms_without_overlap() {
        let probe = Arc::new(ActionProbe::default());
        // The action itself takes 500ms.
        let debouncer = counting_debouncer(300, 500, probe.clone());

        debouncer.schedule();
        tokio::time::sleep(Duration::from_millis(350)).await;

        // The first execution is in flight; this trigger must not start a
        // second one now.
        assert_eq!(probe.started.load(Ordering::SeqCst), 1);
        assert_eq!(probe.finished.load(Ordering::SeqCst), 0);
        debouncer.schedule();

        // First run completes at ~800ms, the re-armed timer fires at ~1100ms
        // and the second run completes at ~1600ms.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(probe.started.load(Ordering::SeqCst), 2);
        assert_eq!(probe.finished.load(Ordering::SeqCst), 2);
        assert_eq!(probe.max_active.load(Ordering::SeqCst), 1);

        debouncer.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_pending_timer() {
        let probe = Arc::new(ActionProbe::default());
        let debouncer = counting_debouncer(300, 0, probe.clone());

        debouncer.schedule();
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.shutdown().await;

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(probe.started.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_lets_in_flight_run_finish() {
        let probe = Arc::new(ActionProbe::default());
        let debouncer = counting_debouncer(300, 500, probe.clone());

        debouncer.schedule();
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(probe.started.load(Ordering::SeqCst), 1);

        // Shutdown joins the task, which finishes the in-flight run first.
        debouncer.shutdown().await;
        assert_eq!(probe.finished.load(Ordering::SeqCst), 1);
    }
}
