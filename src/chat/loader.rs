use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;

use crate::common::{ChatEvent, EventSink, LoaderState};

/// Last step of the detailed loader.
pub const MAX_STEP: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderTiming {
    /// Delay before the detailed view appears.
    pub detail_delay: Duration,
    pub min_step: Duration,
    pub max_step: Duration,
    /// Cadence used to play out remaining steps once the request is done.
    pub fast_forward: Duration,
}

impl Default for LoaderTiming {
    fn default() -> Self {
        Self {
            detail_delay: Duration::from_secs(2),
            min_step: Duration::from_secs(1),
            max_step: Duration::from_secs(5),
            fast_forward: Duration::from_millis(250),
        }
    }
}

impl LoaderTiming {
    /// No waiting at all.
    #[cfg(test)]
    pub fn immediate() -> Self {
        Self {
            detail_delay: Duration::ZERO,
            min_step: Duration::ZERO,
            max_step: Duration::ZERO,
            fast_forward: Duration::ZERO,
        }
    }
}

/// Cosmetic multi-step progress shown while a request is in flight.
pub struct LoadingIndicator {
    state: Arc<Mutex<LoaderState>>,
    task: Option<JoinHandle<()>>,
    timing: LoaderTiming,
    sink: EventSink,
}

impl LoadingIndicator {
    pub fn new(timing: LoaderTiming, sink: EventSink) -> Self {
        Self {
            state: Arc::new(Mutex::new(LoaderState::default())),
            task: None,
            timing,
            sink,
        }
    }

    pub fn state(&self) -> LoaderState {
        *lock(&self.state)
    }

    pub async fn start(&mut self) {
        self.cancel().await;
        update(&self.state, &self.sink, |state| *state = LoaderState::default());

        let state = Arc::clone(&self.state);
        let sink = self.sink.clone();
        let timing = self.timing.clone();
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(timing.detail_delay).await;
            update(&state, &sink, |s| s.detailed = true);

            loop {
                let step = lock(&state).step;
                if step >= MAX_STEP {
                    break;
                }
                let delay = step_delay(&timing);
                tokio::time::sleep(delay).await;
                update(&state, &sink, |s| s.step += 1);
            }
        }));
    }

    /// Play out the remaining steps (if the detailed view is showing), then clear.
    pub async fn stop(&mut self) {
        self.cancel().await;

        let current = self.state();
        if current.detailed {
            for step in current.step.saturating_add(1)..=MAX_STEP {
                update(&self.state, &self.sink, |s| s.step = step);
                tokio::time::sleep(self.timing.fast_forward).await;
            }
        }

        update(&self.state, &self.sink, |state| *state = LoaderState::default());
    }

    async fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // Wait for the abort so no late step lands after a reset.
            let _ = task.await;
        }
    }
}

impl Drop for LoadingIndicator {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Random pause in `[min_step, max_step)`.
fn step_delay(timing: &LoaderTiming) -> Duration {
    if timing.max_step <= timing.min_step {
        return timing.min_step;
    }
    rand::thread_rng().gen_range(timing.min_step..timing.max_step)
}

fn lock(state: &Mutex<LoaderState>) -> MutexGuard<'_, LoaderState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn update<F>(state: &Mutex<LoaderState>, sink: &EventSink, change: F)
where
    F: FnOnce(&mut LoaderState),
{
    let snapshot = {
        let mut guard = lock(state);
        change(&mut guard);
        *guard
    };
    sink.publish(ChatEvent::LoadingChanged(snapshot));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader_events(events: &mut tokio::sync::mpsc::UnboundedReceiver<ChatEvent>) -> Vec<LoaderState> {
        let mut states = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let ChatEvent::LoadingChanged(state) = event {
                states.push(state);
            }
        }
        states
    }

    async fn wait_until<F: Fn() -> bool>(condition: F) {
        for _ in 0..500 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }

    #[tokio::test]
    async fn runs_through_all_steps_then_stops_cleared() {
        let (sink, mut events) = EventSink::channel();
        let mut loader = LoadingIndicator::new(LoaderTiming::immediate(), sink);

        loader.start().await;
        wait_until(|| loader.state().step == MAX_STEP).await;
        assert_eq!(
            loader.state(),
            LoaderState {
                step: MAX_STEP,
                detailed: true
            }
        );

        loader.stop().await;
        assert!(loader.state().is_cleared());

        let states = loader_events(&mut events);
        assert!(states.contains(&LoaderState { step: 0, detailed: true }));
        assert!(states.last().unwrap().is_cleared());
    }

    #[tokio::test]
    async fn stop_before_detail_clears_without_fast_forward() {
        let (sink, mut events) = EventSink::channel();
        let timing = LoaderTiming {
            detail_delay: Duration::from_secs(60),
            ..LoaderTiming::immediate()
        };
        let mut loader = LoadingIndicator::new(timing, sink);

        loader.start().await;
        loader.stop().await;

        assert!(loader.state().is_cleared());
        assert!(loader_events(&mut events).iter().all(|s| !s.detailed));
    }

    #[tokio::test]
    async fn stop_fast_forwards_remaining_steps() {
        let (sink, mut events) = EventSink::channel();
        let timing = LoaderTiming {
            min_step: Duration::from_secs(60),
            max_step: Duration::from_secs(60),
            ..LoaderTiming::immediate()
        };
        let mut loader = LoadingIndicator::new(timing, sink);

        loader.start().await;
        wait_until(|| loader.state().detailed).await;
        assert_eq!(loader.state(), LoaderState { step: 0, detailed: true });

        loader.stop().await;

        let steps: Vec<u8> = loader_events(&mut events)
            .into_iter()
            .filter(|s| s.detailed)
            .map(|s| s.step)
            .collect();
        assert_eq!(steps, vec![0, 1, 2, 3, 4]);
        assert!(loader.state().is_cleared());
    }

    #[tokio::test]
    async fn restart_resets_progress() {
        let mut loader = LoadingIndicator::new(LoaderTiming::immediate(), EventSink::disconnected());
        loader.start().await;
        wait_until(|| loader.state().step > 0).await;
        loader.start().await;
        assert!(loader.state().is_cleared());
        loader.stop().await;
        assert!(loader.state().is_cleared());
    }

    #[test]
    fn step_delay_stays_below_the_upper_bound() {
        let timing = LoaderTiming {
            min_step: Duration::from_millis(10),
            max_step: Duration::from_millis(12),
            ..LoaderTiming::default()
        };
        for _ in 0..200 {
            let delay = step_delay(&timing);
            assert!(delay >= timing.min_step && delay < timing.max_step);
        }

        assert_eq!(step_delay(&LoaderTiming::immediate()), Duration::ZERO);
    }
}
