//! Event delivery: an ordered transformation pipeline of sinks, fanned out
//! to per-type topic subscribers and a pull-style queue (§4.7).
//!
//! Pacing (`emit_delay > 0`) is additive: [`EventBus::deliver`] is always
//! synchronous and ignores delay; [`EventBus::deliver_paced`] (behind the
//! `pacing` feature) drains the same pipeline through a `tokio` timer so
//! callers that never configure a delay never touch an async runtime.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use tracing::warn;

use crate::error::StitchError;
use crate::event::{Event, SharedContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Pre,
    Main,
    Post,
}

impl Stage {
    fn name(self) -> &'static str {
        match self {
            Stage::Pre => "pre_transform",
            Stage::Main => "transform",
            Stage::Post => "post_transform",
        }
    }
}

/// A registered observer/transformer. All methods default to a no-op pass
/// through; implement only the stages a sink cares about.
///
/// `context` is the bus's shared, mutable per-stream mapping (spec.md
/// §4.7's "context stamping"): stages read and write into the same
/// instance across every event, so a sink can leave a note for itself (or
/// another sink) to pick up on a later event.
pub trait Sink {
    fn name(&self) -> &str;

    fn pre_transform(&mut self, event: Event, context: &mut SharedContext) -> anyhow::Result<Vec<Event>> {
        let _ = context;
        Ok(vec![event])
    }

    fn transform(&mut self, event: Event, context: &mut SharedContext) -> anyhow::Result<Vec<Event>> {
        let _ = context;
        Ok(vec![event])
    }

    fn post_transform(&mut self, event: Event, context: &mut SharedContext) -> anyhow::Result<Vec<Event>> {
        let _ = context;
        Ok(vec![event])
    }

    /// Called once when the bus is disposed.
    fn dispose(&mut self) {}
}

type Subscriber = Box<dyn FnMut(&Event)>;

/// Pull-style consumer of delivered events, backed by the bus's shared
/// queue. `next()` is non-blocking: an empty queue yields `None` rather
/// than parking, since the core parser itself never suspends (§5); use
/// [`PullIterator::recv`] (feature `pacing`) to await the next event.
pub struct PullIterator {
    queue: Rc<RefCell<VecDeque<Event>>>,
    wildcard: Rc<RefCell<Vec<Subscriber>>>,
    #[cfg(feature = "pacing")]
    notify: Rc<tokio::sync::Notify>,
}

impl Iterator for PullIterator {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        let popped = self.queue.borrow_mut().pop_front();
        if popped.is_some() && self.queue.borrow().is_empty() {
            let released = Event::BufferReleased {
                context: SharedContext::new(),
                metadata: None,
            };
            for sub in self.wildcard.borrow_mut().iter_mut() {
                sub(&released);
            }
        }
        popped
    }
}

impl PullIterator {
    #[cfg(feature = "pacing")]
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            if let Some(event) = self.queue.borrow_mut().pop_front() {
                return Some(event);
            }
            self.notify.notified().await;
        }
    }
}

/// Ordered registry of sinks plus the pub-sub / pull-queue demultiplexer.
pub struct EventBus {
    sinks: Vec<Box<dyn Sink>>,
    topics: HashMap<String, Vec<Subscriber>>,
    wildcard: Rc<RefCell<Vec<Subscriber>>>,
    queue: Rc<RefCell<VecDeque<Event>>>,
    suppress_errors_from_transforms: bool,
    #[cfg_attr(not(feature = "pacing"), allow(dead_code))]
    emit_delay: Duration,
    /// Shared, mutable per-stream mapping threaded through every sink
    /// stage call, and stamped onto each event just before dispatch.
    context: SharedContext,
    #[cfg(feature = "pacing")]
    notify: Rc<tokio::sync::Notify>,
}

impl EventBus {
    pub fn new(suppress_errors_from_transforms: bool, emit_delay: Duration) -> Self {
        Self {
            sinks: Vec::new(),
            topics: HashMap::new(),
            wildcard: Rc::new(RefCell::new(Vec::new())),
            queue: Rc::new(RefCell::new(VecDeque::new())),
            suppress_errors_from_transforms,
            emit_delay,
            context: SharedContext::new(),
            #[cfg(feature = "pacing")]
            notify: Rc::new(tokio::sync::Notify::new()),
        }
    }

    pub fn register_sink(&mut self, sink: Box<dyn Sink>) {
        self.sinks.push(sink);
    }

    /// Subscribe to a single event kind (`"text"`, `"tag-open"`, ...).
    pub fn subscribe(&mut self, topic: impl Into<String>, callback: impl FnMut(&Event) + 'static) {
        self.topics
            .entry(topic.into())
            .or_default()
            .push(Box::new(callback));
    }

    /// Subscribe to every event regardless of kind.
    pub fn subscribe_all(&mut self, callback: impl FnMut(&Event) + 'static) {
        self.wildcard.borrow_mut().push(Box::new(callback));
    }

    pub fn pull_iterator(&self) -> PullIterator {
        PullIterator {
            queue: Rc::clone(&self.queue),
            wildcard: Rc::clone(&self.wildcard),
            #[cfg(feature = "pacing")]
            notify: Rc::clone(&self.notify),
        }
    }

    pub fn queue_len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run the transformation pipeline and dispatch the survivors
    /// immediately (ignoring `emit_delay`).
    pub fn deliver(&mut self, events: Vec<Event>) {
        let (list, errors) = self.run_pipeline(events);
        for event in list.into_iter().chain(errors) {
            self.dispatch(event);
        }
    }

    /// Run the pipeline, then dispatch survivors one at a time with
    /// `emit_delay` between them. Requires the `pacing` feature.
    #[cfg(feature = "pacing")]
    pub async fn deliver_paced(&mut self, events: Vec<Event>) {
        let (list, errors) = self.run_pipeline(events);
        for event in list.into_iter().chain(errors) {
            if !self.emit_delay.is_zero() {
                tokio::time::sleep(self.emit_delay).await;
            }
            self.dispatch(event);
        }
    }

    fn run_pipeline(&mut self, events: Vec<Event>) -> (Vec<Event>, Vec<Event>) {
        let mut errors = Vec::new();
        let mut current = events;
        for stage in [Stage::Pre, Stage::Main, Stage::Post] {
            current = self.run_stage(stage, current, &mut errors);
        }
        (current, errors)
    }

    fn run_stage(&mut self, stage: Stage, list: Vec<Event>, errors: &mut Vec<Event>) -> Vec<Event> {
        let mut current = list;
        for sink in self.sinks.iter_mut() {
            let mut next = Vec::with_capacity(current.len());
            for event in current {
                let outcome = match stage {
                    Stage::Pre => sink.pre_transform(event.clone(), &mut self.context),
                    Stage::Main => sink.transform(event.clone(), &mut self.context),
                    Stage::Post => sink.post_transform(event.clone(), &mut self.context),
                };
                match outcome {
                    Ok(replacement) => next.extend(replacement),
                    Err(source) => {
                        let error = StitchError::Sink {
                            sink: sink.name().to_string(),
                            stage: stage.name(),
                            source,
                        };
                        warn!(sink = sink.name(), stage = stage.name(), error = %error, "sink stage failed");
                        if !self.suppress_errors_from_transforms {
                            errors.push(Event::Error {
                                reason: error.to_string(),
                                recoverable: true,
                                context: SharedContext::new(),
                                metadata: None,
                            });
                        }
                        // the original event is preserved for this sink's failure
                        next.push(event);
                    }
                }
            }
            current = next;
        }
        current
    }

    fn dispatch(&mut self, mut event: Event) {
        event.set_context(self.context.clone());
        let kind = event.kind();
        if let Some(subs) = self.topics.get_mut(kind) {
            for sub in subs.iter_mut() {
                sub(&event);
            }
        }
        for sub in self.wildcard.borrow_mut().iter_mut() {
            sub(&event);
        }
        self.queue.borrow_mut().push_back(event);
        #[cfg(feature = "pacing")]
        self.notify.notify_waiters();
    }

    /// Release pending pull-iterator waiters and clear buffered state.
    pub fn dispose(&mut self) {
        for sink in self.sinks.iter_mut() {
            sink.dispose();
        }
        self.queue.borrow_mut().clear();
        #[cfg(feature = "pacing")]
        self.notify.notify_waiters();
    }
}
