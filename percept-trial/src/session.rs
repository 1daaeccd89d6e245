//! Onset, response and offset bookkeeping for one presentation.
//!
//! The session never draws anything. The host tells it when the stimulus
//! became visible, forwards key presses and polls [`TrialSession::update`]
//! once per frame. All times are reported in milliseconds since the session
//! was created.

use std::time::Duration;

use percept_core::{CompletionRecord, ItemEcho, StimulusItem, TrialState};
use percept_timing::Timer;
use tracing::{debug, info};

use crate::config::SessionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The stimulus duration ran out; the host should blank the display.
    HideStimulus,
    /// The trial duration ran out.
    Timeout,
}

pub struct TrialSession<T>
where
    T: Timer<Timestamp = u64>,
{
    timer: T,
    config: SessionConfig,
    items: Vec<ItemEcho>,
    state: TrialState,
    start: u64,
    onset: Option<u64>,
    offset: Option<u64>,
    response: Option<(String, u64)>,
    timed_out: bool,
}

impl<T> TrialSession<T>
where
    T: Timer<Timestamp = u64>,
{
    pub fn new(config: SessionConfig, items: &[StimulusItem], timer: T) -> Self {
        let start = timer.now();
        Self {
            timer,
            config,
            items: items.iter().map(ItemEcho::from).collect(),
            state: TrialState::Pending,
            start,
            onset: None,
            offset: None,
            response: None,
            timed_out: false,
        }
    }

    pub fn state(&self) -> TrialState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Marks the first frame with the stimulus on screen. Later calls are
    /// ignored.
    pub fn stimulus_shown(&mut self) {
        if self.state != TrialState::Pending {
            return;
        }
        let now = self.timer.now();
        self.onset = Some(now);
        self.state = TrialState::Rendered;
        debug!(trial = self.config.trial_id, onset_ms = self.ms(now), "stimulus onset");
    }

    /// Marks the stimulus as removed. Only the first call after onset counts.
    pub fn stimulus_hidden(&mut self) {
        if self.onset.is_some() && self.offset.is_none() {
            let now = self.timer.now();
            self.offset = Some(now);
            debug!(trial = self.config.trial_id, offset_ms = self.ms(now), "stimulus offset");
        }
    }

    /// Records `key` as the response if one is still expected and the key
    /// is among the accepted choices. Returns whether it was taken.
    pub fn respond(&mut self, key: &str) -> bool {
        if self.state != TrialState::Rendered || self.timed_out || !self.config.accepts(key) {
            debug!(trial = self.config.trial_id, key, "response ignored");
            return false;
        }
        let now = self.timer.now();
        self.response = Some((key.to_string(), now));
        self.state = TrialState::Responded;
        info!(
            trial = self.config.trial_id,
            key,
            rt_ms = self.rt_ms().unwrap_or_default(),
            "response recorded"
        );
        true
    }

    /// Advances duration-driven transitions. Call once per frame.
    pub fn update(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let Some(onset) = self.onset else {
            return events;
        };
        if self.state == TrialState::Finished {
            return events;
        }
        let since_onset = self.timer.elapsed(onset);

        if let Some(ms) = self.config.stimulus_duration_ms {
            if self.offset.is_none() && since_onset >= Duration::from_millis(ms) {
                self.stimulus_hidden();
                events.push(SessionEvent::HideStimulus);
            }
        }
        if let Some(ms) = self.config.trial_duration_ms {
            if !self.timed_out && since_onset >= Duration::from_millis(ms) {
                self.timed_out = true;
                debug!(trial = self.config.trial_id, "trial timed out");
                events.push(SessionEvent::Timeout);
            }
        }
        events
    }

    /// True once the host should call [`TrialSession::finish`].
    pub fn is_done(&self) -> bool {
        match self.state {
            TrialState::Finished => true,
            TrialState::Responded => self.config.response_ends_trial || self.timed_out,
            _ => self.timed_out,
        }
    }

    /// Closes the trial. A stimulus still showing is taken off now.
    pub fn finish(&mut self) -> CompletionRecord {
        self.stimulus_hidden();
        self.state = TrialState::Finished;
        CompletionRecord {
            trial_id: self.config.trial_id,
            response: self.response.as_ref().map(|(key, _)| key.clone()),
            rt_ms: self.rt_ms(),
            stimulus_onset_ms: self.onset.map(|t| self.ms(t)),
            stimulus_offset_ms: self.offset.map(|t| self.ms(t)),
            items: self.items.clone(),
        }
    }

    fn rt_ms(&self) -> Option<f64> {
        let (_, at) = self.response.as_ref()?;
        let onset = self.onset?;
        Some(nanos_to_ms(at.saturating_sub(onset)))
    }

    fn ms(&self, ts: u64) -> f64 {
        nanos_to_ms(ts.saturating_sub(self.start))
    }
}

fn nanos_to_ms(ns: u64) -> f64 {
    ns as f64 / 1e6
}
