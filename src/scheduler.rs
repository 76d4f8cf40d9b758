//! Generation-tagged delayed continuations and the playback scheduler.
//!
//! Timer callbacks carry a [`TimerEvent`] (data, not a closure). The machine
//! only acts on events whose generation matches the current one, and every
//! superseded round also cancels its pending handles, so a stale callback can
//! never touch the run that replaced it.

use crate::audio::{AudioOut, Tone};
use crate::config::Timing;
use crate::content::Tier;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub i32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// Pre-roll elapsed; schedule the cues.
    BeginPlayback,
    /// Cue `step` of the current playback starts now.
    Cue { step: usize },
    /// Last cue ended (plus the input delay); open input.
    PlaybackDone,
    /// Deferred result feedback.
    Reveal,
    ShowActions,
    AutoNext,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerEvent {
    pub generation: u64,
    pub kind: TimerKind,
}

/// Relative-delay timer source (`setTimeout` contract).
pub trait Timers {
    /// Monotonic milliseconds.
    fn now_ms(&self) -> f64;
    fn schedule(&mut self, delay_ms: f64, event: TimerEvent) -> TimerId;
    fn cancel(&mut self, id: TimerId);
}

/// One scheduled cue. `at` is on the playback time base, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CueTime {
    pub step: usize,
    pub index: usize,
    pub at: f64,
}

/// Cue start times for a challenge: lead-in, then one cue every `note + gap`.
pub fn plan_cues(challenge: &[usize], base: f64, timing: &Timing) -> Vec<CueTime> {
    challenge
        .iter()
        .enumerate()
        .map(|(step, &index)| CueTime {
            step,
            index,
            at: base + timing.lead_in_s + step as f64 * timing.step_s(),
        })
        .collect()
}

/// `lead_in + len * (note + gap)`
pub fn playback_duration(len: usize, timing: &Timing) -> f64 {
    timing.lead_in_s + len as f64 * timing.step_s()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimeBase {
    Audio,
    Wall,
}

/// What a call to [`Scheduler::schedule_playback`] set up.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackPlan {
    pub cues: Vec<CueTime>,
    /// Tones were requested on the audio clock.
    pub audible: bool,
    /// Audio was wanted but unavailable or failed part way.
    pub degraded: bool,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    generation: u64,
    pending: Vec<TimerId>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Void everything scheduled so far: pending handles are cancelled and any
    /// event already in flight fails [`Scheduler::accepts`].
    pub fn supersede(&mut self, timers: &mut dyn Timers) -> u64 {
        for id in self.pending.drain(..) {
            timers.cancel(id);
        }
        self.generation += 1;
        self.generation
    }

    pub fn after(&mut self, timers: &mut dyn Timers, delay_ms: f64, kind: TimerKind) -> TimerId {
        let event = TimerEvent {
            generation: self.generation,
            kind,
        };
        let id = timers.schedule(delay_ms.max(0.0), event);
        self.pending.push(id);
        id
    }

    pub fn accepts(&self, event: &TimerEvent) -> bool {
        event.generation == self.generation
    }

    /// Schedule one cue per challenge step, plus `PlaybackDone`.
    ///
    /// With `audible` and a running audio clock, tones go to `audio` and each
    /// cue's timer delay is `(cue.at - audio.current_time())`, sampled again
    /// right before that cue is scheduled. Without audio the same relative
    /// layout runs on the timer clock and no tone is requested.
    pub fn schedule_playback(
        &mut self,
        timers: &mut dyn Timers,
        audio: &mut dyn AudioOut,
        tier: &Tier,
        challenge: &[usize],
        timing: &Timing,
        audible: bool,
    ) -> PlaybackPlan {
        let wall_base = timers.now_ms() / 1000.0;
        let (base, time_base) = match audio.current_time().filter(|_| audible) {
            Some(t) => (t, TimeBase::Audio),
            None => (wall_base, TimeBase::Wall),
        };
        let mut degraded = audible && time_base == TimeBase::Wall;
        let mut sounding = time_base == TimeBase::Audio;
        let cues = plan_cues(challenge, base, timing);

        for cue in &cues {
            if sounding {
                let frequency = tier.symbol(cue.index).map(|s| s.frequency).unwrap_or(0.0);
                let tone = Tone {
                    frequency,
                    start: cue.at,
                    duration: timing.note_s,
                    envelope: timing.envelope,
                };
                if let Err(err) = audio.play_tone(&tone) {
                    tracing::warn!(%err, step = cue.step, "tone failed, continuing visual-only");
                    sounding = false;
                    degraded = true;
                }
            }
            let now = sample(time_base, audio, timers, base, wall_base);
            self.after(timers, (cue.at - now) * 1000.0, TimerKind::Cue { step: cue.step });
        }

        let end = base + playback_duration(challenge.len(), timing);
        let now = sample(time_base, audio, timers, base, wall_base);
        self.after(
            timers,
            (end - now) * 1000.0 + timing.input_delay_ms,
            TimerKind::PlaybackDone,
        );
        tracing::debug!(
            generation = self.generation,
            cues = cues.len(),
            audible = sounding,
            degraded,
            "playback scheduled"
        );
        PlaybackPlan {
            cues,
            audible: time_base == TimeBase::Audio,
            degraded,
        }
    }
}

fn sample(time_base: TimeBase, audio: &dyn AudioOut, timers: &dyn Timers, base: f64, wall_base: f64) -> f64 {
    let wall = timers.now_ms() / 1000.0;
    match time_base {
        // the audio clock vanished mid-schedule: keep counting from where it was
        TimeBase::Audio => audio.current_time().unwrap_or(base + (wall - wall_base)),
        TimeBase::Wall => wall,
    }
}

#[derive(Clone, Debug)]
struct QueuedTimer {
    id: TimerId,
    due: f64,
    seq: u64,
    event: TimerEvent,
}

#[derive(Debug, Default)]
struct TimerQueue {
    now: f64,
    next_id: i32,
    seq: u64,
    queue: Vec<QueuedTimer>,
}

/// Manually driven timer queue. Clones share the queue so a test can drain it
/// while the engine owns another handle.
#[derive(Clone, Debug, Default)]
pub struct VirtualTimers {
    inner: Rc<RefCell<TimerQueue>>,
}

impl VirtualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock without firing anything.
    pub fn set_now(&self, now_ms: f64) {
        self.inner.borrow_mut().now = now_ms;
    }

    /// Remove and return the earliest timer due at or before `deadline_ms`,
    /// moving the clock to its due time. Ties fire in scheduling order.
    pub fn pop_due(&self, deadline_ms: f64) -> Option<TimerEvent> {
        let mut inner = self.inner.borrow_mut();
        let pos = inner
            .queue
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= deadline_ms)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)))
            .map(|(pos, _)| pos)?;
        let timer = inner.queue.remove(pos);
        if timer.due > inner.now {
            inner.now = timer.due;
        }
        Some(timer.event)
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    pub fn pending_events(&self) -> Vec<(f64, TimerEvent)> {
        let inner = self.inner.borrow();
        let mut events: Vec<_> = inner.queue.iter().map(|t| (t.due, t.seq, t.event)).collect();
        events.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        events.into_iter().map(|(due, _, event)| (due, event)).collect()
    }
}

impl Timers for VirtualTimers {
    fn now_ms(&self) -> f64 {
        self.inner.borrow().now
    }

    fn schedule(&mut self, delay_ms: f64, event: TimerEvent) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        inner.seq += 1;
        let timer = QueuedTimer {
            id: TimerId(inner.next_id),
            due: inner.now + delay_ms.max(0.0),
            seq: inner.seq,
            event,
        };
        let id = timer.id;
        inner.queue.push(timer);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.inner.borrow_mut().queue.retain(|t| t.id != id);
    }
}
