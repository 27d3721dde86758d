//! Deferred work: frame callbacks, idle callbacks, timeouts and transitions.
//!
//! The scheduler runs on a virtual clock that only moves when
//! [`Document::tick`] is called. The app loop ticks it from a tokio interval;
//! tests tick it by hand, which makes animation timing deterministic.
//!
//! A tick runs, in order: due timeouts, frame callbacks queued before the
//! tick, transition steps (dispatching `TransitionEnd` on completion), then
//! idle callbacks.

use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::event::EventType;
use crate::geometry::Transform;

// ---------------------------------------------------------------------------
// CancelToken
// ---------------------------------------------------------------------------

/// Cancels a scheduled callback. Cloning shares the flag.
#[derive(Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CancelToken").field(&self.0.get()).finish()
    }
}

// ---------------------------------------------------------------------------
// Curve
// ---------------------------------------------------------------------------

/// Timing function for transitions, named after the CSS keywords.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Curve {
    Linear,
    #[default]
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    CubicBezier(f32, f32, f32, f32),
}

impl Curve {
    /// Map linear progress `t` in `0.0..=1.0` to eased progress.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Curve::Linear => t,
            Curve::Ease => cubic_bezier(t, 0.25, 0.1, 0.25, 1.0),
            Curve::EaseIn => cubic_bezier(t, 0.42, 0.0, 1.0, 1.0),
            Curve::EaseOut => cubic_bezier(t, 0.0, 0.0, 0.58, 1.0),
            Curve::EaseInOut => cubic_bezier(t, 0.42, 0.0, 0.58, 1.0),
            Curve::CubicBezier(x1, y1, x2, y2) => cubic_bezier(t, x1, y1, x2, y2),
        }
    }

    /// The CSS timing-function keyword.
    pub fn as_css(&self) -> String {
        match *self {
            Curve::Linear => "linear".into(),
            Curve::Ease => "ease".into(),
            Curve::EaseIn => "ease-in".into(),
            Curve::EaseOut => "ease-out".into(),
            Curve::EaseInOut => "ease-in-out".into(),
            Curve::CubicBezier(x1, y1, x2, y2) => format!("cubic-bezier({x1}, {y1}, {x2}, {y2})"),
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_css())
    }
}

/// CSS cubic-bezier: solve x(p) = t by Newton-Raphson with a bisection
/// fallback, then return y(p).
fn cubic_bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let (x, x1, y1, x2, y2) = (t as f64, x1 as f64, y1 as f64, x2 as f64, y2 as f64);

    let mut p = x;
    for _ in 0..8 {
        let err = sample(p, x1, x2) - x;
        if err.abs() < 1e-7 {
            return sample(p, y1, y2) as f32;
        }
        let slope = slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        p -= err / slope;
    }

    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    p = x;
    for _ in 0..24 {
        let val = sample(p, x1, x2);
        if (val - x).abs() < 1e-7 {
            break;
        }
        if val < x {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }
    sample(p, y1, y2) as f32
}

#[inline]
fn sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

#[inline]
fn slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

type Task = Box<dyn FnOnce(&Document)>;

struct Scheduled {
    token: CancelToken,
    task: Task,
}

struct Timeout {
    due: Duration,
    seq: u64,
    job: Scheduled,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    node: NodeId,
    from: Transform,
    to: Transform,
    start: Duration,
    duration: Duration,
    curve: Curve,
}

impl Transition {
    fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start).as_secs_f32();
        (elapsed / self.duration.as_secs_f32()).min(1.0)
    }
}

/// Pending work for one document.
#[derive(Default)]
pub struct Scheduler {
    now: Duration,
    frames: Vec<Scheduled>,
    idle: Vec<Scheduled>,
    timeouts: Vec<Timeout>,
    transitions: Vec<Transition>,
    seq: u64,
}

impl Scheduler {
    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn pending_idle(&self) -> usize {
        self.idle.len()
    }

    pub fn pending_timeouts(&self) -> usize {
        self.timeouts.len()
    }

    pub fn active_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// Whether nothing is queued or animating.
    pub fn is_idle(&self) -> bool {
        self.frames.is_empty()
            && self.idle.is_empty()
            && self.timeouts.is_empty()
            && self.transitions.is_empty()
    }

    fn take_due_timeouts(&mut self) -> Vec<Scheduled> {
        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.timeouts).into_iter().partition(|t| t.due <= now);
        self.timeouts = pending;
        due.sort_by_key(|t| (t.due, t.seq));
        due.into_iter().map(|t| t.job).collect()
    }
}

/// Run queued jobs, skipping cancelled ones. Returns how many ran.
fn run_jobs(document: &Document, jobs: Vec<Scheduled>) -> usize {
    let mut ran = 0;
    for job in jobs {
        if job.token.is_cancelled() {
            debug!("skipping cancelled callback");
            continue;
        }
        (job.task)(document);
        ran += 1;
    }
    ran
}

impl Document {
    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.scheduler().now()
    }

    /// Run `f` on the next tick, before transitions are stepped.
    pub fn request_frame(&self, f: impl FnOnce(&Document) + 'static) -> CancelToken {
        let token = CancelToken::new();
        self.request_frame_with(&token, f);
        token
    }

    /// Like [`request_frame`](Self::request_frame), guarded by a caller-owned token.
    pub fn request_frame_with(&self, token: &CancelToken, f: impl FnOnce(&Document) + 'static) {
        self.scheduler().frames.push(Scheduled {
            token: token.clone(),
            task: Box::new(f),
        });
    }

    /// Run `f` at the end of the next tick, or on [`run_idle`](Self::run_idle).
    pub fn request_idle(&self, f: impl FnOnce(&Document) + 'static) -> CancelToken {
        let token = CancelToken::new();
        self.request_idle_with(&token, f);
        token
    }

    pub fn request_idle_with(&self, token: &CancelToken, f: impl FnOnce(&Document) + 'static) {
        self.scheduler().idle.push(Scheduled {
            token: token.clone(),
            task: Box::new(f),
        });
    }

    /// Run `f` on the first tick at or after `now + delay`.
    pub fn set_timeout(&self, delay: Duration, f: impl FnOnce(&Document) + 'static) -> CancelToken {
        let token = CancelToken::new();
        self.set_timeout_with(&token, delay, f);
        token
    }

    pub fn set_timeout_with(
        &self,
        token: &CancelToken,
        delay: Duration,
        f: impl FnOnce(&Document) + 'static,
    ) {
        let mut sched = self.scheduler();
        sched.seq += 1;
        let timeout = Timeout {
            due: sched.now + delay,
            seq: sched.seq,
            job: Scheduled {
                token: token.clone(),
                task: Box::new(f),
            },
        };
        sched.timeouts.push(timeout);
    }

    /// Animate `node`'s transform from `from` to `to`.
    ///
    /// The node is set to `from` immediately and its `transition` style is
    /// written. Each tick moves it along `curve`; on completion it rests at
    /// `to` and receives a `TransitionEnd` event. A new transition on the same
    /// node replaces the running one.
    pub fn start_transition(
        &self,
        node: NodeId,
        from: Transform,
        to: Transform,
        duration: Duration,
        curve: Curve,
    ) {
        {
            let mut dom = self.dom_mut();
            dom.set_style(node, "transform", from.to_string());
            dom.set_style(
                node,
                "transition",
                format!("transform {}ms {}", duration.as_millis(), curve.as_css()),
            );
        }
        let mut sched = self.scheduler();
        let start = sched.now;
        sched.transitions.retain(|t| t.node != node);
        sched.transitions.push(Transition {
            node,
            from,
            to,
            start,
            duration,
            curve,
        });
    }

    /// Advance the clock by `dt` and run everything that became due.
    ///
    /// Returns the number of callbacks and transition steps processed.
    pub fn tick(&self, dt: Duration) -> usize {
        let due = {
            let mut sched = self.scheduler();
            sched.now += dt;
            sched.take_due_timeouts()
        };
        let mut work = run_jobs(self, due);

        let frames = std::mem::take(&mut self.scheduler().frames);
        work += run_jobs(self, frames);

        work += self.step_transitions();

        let idle = std::mem::take(&mut self.scheduler().idle);
        work += run_jobs(self, idle);

        trace!(now = ?self.now(), work, "tick");
        work
    }

    /// Run only the queued idle callbacks, without moving the clock.
    pub fn run_idle(&self) -> usize {
        let idle = std::mem::take(&mut self.scheduler().idle);
        run_jobs(self, idle)
    }

    /// Whether nothing is queued or animating.
    pub fn is_settled(&self) -> bool {
        self.scheduler().is_idle()
    }

    /// Discard `node` now, or on the next idle pass if the surface is borrowed.
    pub(crate) fn reclaim(&self, node: NodeId) {
        if let Some(mut dom) = self.try_dom_mut() {
            dom.discard(node);
            return;
        }
        match self.try_scheduler() {
            Some(mut sched) => sched.idle.push(Scheduled {
                token: CancelToken::new(),
                task: Box::new(move |doc: &Document| {
                    doc.dom_mut().discard(node);
                }),
            }),
            None => debug!(?node, "surface busy; node not reclaimed"),
        }
    }

    fn step_transitions(&self) -> usize {
        let (now, running) = {
            let sched = self.scheduler();
            (sched.now, sched.transitions.clone())
        };
        if running.is_empty() {
            return 0;
        }

        let mut finished = Vec::new();
        {
            let mut dom = self.dom_mut();
            for t in &running {
                if !dom.contains(t.node) {
                    finished.push((t.node, false));
                    continue;
                }
                let progress = t.progress(now);
                let value = if progress >= 1.0 {
                    finished.push((t.node, true));
                    t.to
                } else {
                    t.from.blend(t.to, t.curve.apply(progress))
                };
                dom.set_style(t.node, "transform", value.to_string());
            }
        }

        self.scheduler()
            .transitions
            .retain(|t| !finished.iter().any(|(n, _)| *n == t.node));
        for (node, alive) in &finished {
            if *alive {
                self.dispatch(*node, EventType::TransitionEnd, None);
            }
        }
        running.len()
    }
}

/// Spawn a future on the current `LocalSet`.
///
/// Widget futures hold `Rc` handles and are not `Send`; this must be called
/// from inside a `tokio::task::LocalSet`.
pub fn spawn_local<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + 'static,
    F::Output: 'static,
{
    tokio::task::spawn_local(future)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const MS: Duration = Duration::from_millis(1);

    fn log() -> Rc<RefCell<Vec<&'static str>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn curve_endpoints() {
        for curve in [Curve::Linear, Curve::Ease, Curve::EaseIn, Curve::EaseOut, Curve::EaseInOut] {
            assert_eq!(curve.apply(0.0), 0.0);
            assert_eq!(curve.apply(1.0), 1.0);
        }
    }

    #[test]
    fn curve_ease_in_out_is_symmetric() {
        let mid = Curve::EaseInOut.apply(0.5);
        assert!((mid - 0.5).abs() < 1e-3);
        assert!(Curve::EaseIn.apply(0.5) < 0.5);
        assert!(Curve::EaseOut.apply(0.5) > 0.5);
    }

    #[test]
    fn curve_css_names() {
        assert_eq!(Curve::Ease.to_string(), "ease");
        assert_eq!(Curve::EaseInOut.as_css(), "ease-in-out");
        assert_eq!(Curve::CubicBezier(0.1, 0.2, 0.3, 0.4).as_css(), "cubic-bezier(0.1, 0.2, 0.3, 0.4)");
    }

    #[test]
    fn tick_order() {
        let doc = Document::new();
        let seen = log();
        let s = Rc::clone(&seen);
        doc.request_idle(move |_| s.borrow_mut().push("idle"));
        let s = Rc::clone(&seen);
        doc.request_frame(move |_| s.borrow_mut().push("frame"));
        let s = Rc::clone(&seen);
        doc.set_timeout(Duration::ZERO, move |_| s.borrow_mut().push("timeout"));
        doc.tick(16 * MS);
        assert_eq!(*seen.borrow(), vec!["timeout", "frame", "idle"]);
        assert!(doc.is_settled());
    }

    #[test]
    fn frame_queued_during_frame_waits() {
        let doc = Document::new();
        let seen = log();
        let s = Rc::clone(&seen);
        doc.request_frame(move |doc| {
            s.borrow_mut().push("first");
            let s = Rc::clone(&s);
            doc.request_frame(move |_| s.borrow_mut().push("second"));
        });
        doc.tick(16 * MS);
        assert_eq!(*seen.borrow(), vec!["first"]);
        doc.tick(16 * MS);
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn timeout_waits_for_clock() {
        let doc = Document::new();
        let seen = log();
        let s = Rc::clone(&seen);
        doc.set_timeout(100 * MS, move |_| s.borrow_mut().push("fired"));
        doc.tick(99 * MS);
        assert!(seen.borrow().is_empty());
        doc.tick(MS);
        assert_eq!(*seen.borrow(), vec!["fired"]);
        assert_eq!(doc.now(), 100 * MS);
    }

    #[test]
    fn timeouts_fire_in_due_order() {
        let doc = Document::new();
        let seen = log();
        let s = Rc::clone(&seen);
        doc.set_timeout(20 * MS, move |_| s.borrow_mut().push("late"));
        let s = Rc::clone(&seen);
        doc.set_timeout(10 * MS, move |_| s.borrow_mut().push("early"));
        doc.tick(50 * MS);
        assert_eq!(*seen.borrow(), vec!["early", "late"]);
    }

    #[test]
    fn cancelled_callbacks_are_skipped() {
        let doc = Document::new();
        let seen = log();
        let s = Rc::clone(&seen);
        let token = doc.request_idle(move |_| s.borrow_mut().push("idle"));
        token.cancel();
        assert_eq!(doc.run_idle(), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn shared_token_cancels_every_kind() {
        let doc = Document::new();
        let seen = log();
        let token = CancelToken::new();
        let s = Rc::clone(&seen);
        doc.request_frame_with(&token, move |_| s.borrow_mut().push("frame"));
        let s = Rc::clone(&seen);
        doc.request_idle_with(&token, move |_| s.borrow_mut().push("idle"));
        let s = Rc::clone(&seen);
        doc.set_timeout_with(&token, 10 * MS, move |_| s.borrow_mut().push("timeout"));
        token.cancel();
        assert_eq!(doc.tick(20 * MS), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn transition_interpolates_and_ends() {
        let doc = Document::new();
        let node = {
            let mut dom = doc.dom_mut();
            let body = dom.body();
            let node = dom.create_element("div");
            dom.append_child(body, node).unwrap();
            node
        };
        let ended = log();
        let e = Rc::clone(&ended);
        doc.add_listener_once(node, EventType::TransitionEnd, Rc::new(move |_| e.borrow_mut().push("end")));

        doc.start_transition(
            node,
            Transform::translate_x(100.0),
            Transform::IDENTITY,
            Duration::from_millis(200),
            Curve::Linear,
        );
        assert_eq!(doc.dom().style(node, "transform"), Some("translateX(100%)"));
        assert_eq!(doc.dom().style(node, "transition"), Some("transform 200ms linear"));

        doc.tick(100 * MS);
        assert_eq!(doc.dom().style(node, "transform"), Some("translateX(50%)"));
        assert!(ended.borrow().is_empty());

        doc.tick(100 * MS);
        assert_eq!(doc.dom().style(node, "transform"), Some("translateX(0%)"));
        assert_eq!(*ended.borrow(), vec!["end"]);
        assert!(doc.is_settled());
    }

    #[test]
    fn transition_on_discarded_node_is_dropped() {
        let doc = Document::new();
        let node = doc.dom_mut().create_element("div");
        doc.start_transition(node, Transform::IDENTITY, Transform::translate_x(-100.0), 300 * MS, Curve::Ease);
        doc.dom_mut().discard(node);
        doc.tick(16 * MS);
        assert!(doc.is_settled());
    }

    #[test]
    fn spawn_local_runs_on_local_set() {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let local = tokio::task::LocalSet::new();
        let value = local.block_on(&rt, async {
            let shared = Rc::new(Cell::new(1));
            let s = Rc::clone(&shared);
            spawn_local(async move { s.set(s.get() + 1) }).await.unwrap();
            shared.get()
        });
        assert_eq!(value, 2);
    }
}
