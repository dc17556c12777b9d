//! Per-chat recurring poll jobs.
//!
//! One tokio task per chat runs `poll_tick` on a fixed interval; polls for
//! the same chat never overlap because the task runs them inline. Removing a
//! job is cooperative: an in-flight poll runs to completion and no further
//! ticks are scheduled afterwards.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use valwatch_core::{ChatId, UserState};

use crate::monitor::{Monitor, TickOutcome};

struct Job {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct Scheduler {
    interval: Duration,
    jobs: Mutex<HashMap<ChatId, Job>>,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Start the recurring poll job for a chat. Idempotent: a second call for
    /// the same chat is a no-op. Returns whether a job was created.
    pub fn ensure_job(
        &self,
        chat_id: ChatId,
        state: Arc<tokio::sync::Mutex<UserState>>,
        monitor: Arc<Monitor>,
    ) -> bool {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.get(&chat_id) {
            if !job.handle.is_finished() {
                debug!(chat_id, "Poll job already running");
                return false;
            }
        }

        let (cancel, mut cancelled) = watch::channel(false);
        let interval = self.interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if *cancelled.borrow() {
                            break;
                        }
                        let mut state = state.lock().await;
                        if monitor.poll_tick(chat_id, &mut state).await == TickOutcome::UserGone {
                            info!(chat_id, "User gone; stopping poll job");
                            break;
                        }
                    }
                    _ = cancelled.changed() => break,
                }
            }
        });

        jobs.insert(chat_id, Job { cancel, handle });
        info!(chat_id, "Started poll job");
        true
    }

    /// Cancel a chat's job. An in-flight poll finishes; no further ticks run.
    pub fn remove(&self, chat_id: ChatId) {
        if let Some(job) = self.jobs.lock().unwrap().remove(&chat_id) {
            let _ = job.cancel.send(true);
            info!(chat_id, "Cancelled poll job");
        }
    }

    pub fn is_running(&self, chat_id: ChatId) -> bool {
        self.jobs
            .lock()
            .unwrap()
            .get(&chat_id)
            .map(|job| !job.handle.is_finished())
            .unwrap_or(false)
    }
}
