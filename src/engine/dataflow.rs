// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Publish/subscribe dataflow graph with one worker task per node.
//!
//! ## Lifecycle
//!
//! The graph moves through three phases, each its own type:
//! - [`GraphBuilder`]: nodes are added together with their upstream nodes
//! - [`StreamGraph`]: wiring is frozen, no workers run yet
//! - [`RunningGraph`]: every node has a worker task
//!
//! ## Delivery
//!
//! A node that has upstream nodes owns an input queue, allocated the first
//! time another node is wired into it, and runs a consumption loop calling
//! [`StreamNode::update`] once per message. A node with no upstream never
//! gets a queue and runs [`StreamNode::produce`] instead.
//!
//! [`Emitter::emit`] broadcasts one shared payload to every downstream queue.
//! Order is FIFO per producer/consumer pair; nothing is promised across
//! distinct producers. Messages for nodes that already stopped are dropped.
//!
//! Hook errors are logged and swallowed so one bad message does not take a
//! worker down. A panic inside `update` is caught and logged the same way;
//! the node keeps whatever state the hook left behind.

use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::consts::STREAM_POLL_INTERVAL;
use crate::errors::StreamError;
use crate::observability::messages::stream::{GraphStarted, NodeHookFailed, NodeStopped};
use crate::observability::messages::StructuredLog;

static NEXT_BUILDER_ID: AtomicU64 = AtomicU64::new(0);

/// Result returned by node hooks.
pub type HookResult = Result<(), StreamError>;

/// Value flowing between nodes.
#[derive(Debug)]
pub struct Message<T> {
    /// Name of the node that emitted the payload.
    pub origin: Arc<str>,
    pub payload: Arc<T>,
}

impl<T> Clone for Message<T> {
    fn clone(&self) -> Self {
        Self {
            origin: Arc::clone(&self.origin),
            payload: Arc::clone(&self.payload),
        }
    }
}

/// Behaviour of one graph participant.
///
/// Both hooks default to doing nothing, so a pure consumer implements only
/// `update` and a pure source only `produce`.
#[async_trait]
pub trait StreamNode<T>: Send + 'static
where
    T: Send + Sync + 'static,
{
    /// Handle one message from `origin`. Only called on nodes with upstream.
    async fn update(&mut self, origin: &str, payload: Arc<T>, emitter: &Emitter<T>) -> HookResult {
        let _ = (origin, payload, emitter);
        Ok(())
    }

    /// Generate values. Only called on nodes with no upstream. Long-running
    /// producers should watch `cancel`.
    async fn produce(&mut self, emitter: &Emitter<T>, cancel: CancellationToken) -> HookResult {
        let _ = (emitter, cancel);
        Ok(())
    }
}

/// Sends a node's output to every node observing it.
pub struct Emitter<T> {
    origin: Arc<str>,
    observers: Arc<[mpsc::UnboundedSender<Message<T>>]>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            origin: Arc::clone(&self.origin),
            observers: Arc::clone(&self.observers),
        }
    }
}

impl<T> std::fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("origin", &self.origin)
            .field("observer_count", &self.observers.len())
            .finish()
    }
}

impl<T> Emitter<T> {
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Broadcast `payload`. Returns how many observers accepted it.
    pub fn emit(&self, payload: T) -> usize {
        self.emit_shared(Arc::new(payload))
    }

    /// Broadcast an already shared payload without copying it.
    pub fn emit_shared(&self, payload: Arc<T>) -> usize {
        self.observers
            .iter()
            .filter(|observer| {
                observer
                    .send(Message {
                        origin: Arc::clone(&self.origin),
                        payload: Arc::clone(&payload),
                    })
                    .is_ok()
            })
            .count()
    }
}

/// Identifies a node within the builder that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHandle {
    builder: u64,
    index: usize,
    name: Arc<str>,
}

impl NodeHandle {
    pub fn name(&self) -> &str {
        &self.name
    }
}

struct PendingNode<T>
where
    T: Send + Sync + 'static,
{
    name: Arc<str>,
    node: Box<dyn StreamNode<T>>,
    input: Option<(mpsc::UnboundedSender<Message<T>>, mpsc::UnboundedReceiver<Message<T>>)>,
    observers: Vec<mpsc::UnboundedSender<Message<T>>>,
}

/// Collects nodes and their wiring.
pub struct GraphBuilder<T>
where
    T: Send + Sync + 'static,
{
    id: u64,
    nodes: Vec<PendingNode<T>>,
    poll_interval: Duration,
}

impl<T> Default for GraphBuilder<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GraphBuilder<T>
where
    T: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            id: NEXT_BUILDER_ID.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
            poll_interval: STREAM_POLL_INTERVAL,
        }
    }

    /// How long an idle consumer waits on its queue before looping.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Add `node` observing every node in `upstream`.
    pub fn add_node<N>(
        &mut self,
        name: impl Into<String>,
        node: N,
        upstream: &[&NodeHandle],
    ) -> Result<NodeHandle, StreamError>
    where
        N: StreamNode<T>,
    {
        let name: String = name.into();
        if self.nodes.iter().any(|n| *n.name == *name) {
            return Err(StreamError::DuplicateNode(name));
        }

        let mut sources = Vec::with_capacity(upstream.len());
        let mut seen = HashSet::new();
        for handle in upstream {
            if handle.builder != self.id || handle.index >= self.nodes.len() {
                return Err(StreamError::UnknownNode(handle.name.to_string()));
            }
            if seen.insert(handle.index) {
                sources.push(handle.index);
            }
        }

        let index = self.nodes.len();
        let name: Arc<str> = Arc::from(name);
        let mut pending = PendingNode {
            name: Arc::clone(&name),
            node: Box::new(node),
            input: None,
            observers: Vec::new(),
        };

        for source in sources {
            let (sender, _) = pending.input.get_or_insert_with(mpsc::unbounded_channel);
            self.nodes[source].observers.push(sender.clone());
        }
        self.nodes.push(pending);

        Ok(NodeHandle {
            builder: self.id,
            index,
            name,
        })
    }

    /// Freeze the wiring.
    pub fn build(self) -> StreamGraph<T> {
        StreamGraph {
            nodes: self.nodes,
            poll_interval: self.poll_interval,
        }
    }
}

/// A fully wired graph whose workers have not started.
pub struct StreamGraph<T>
where
    T: Send + Sync + 'static,
{
    nodes: Vec<PendingNode<T>>,
    poll_interval: Duration,
}

impl<T> StreamGraph<T>
where
    T: Send + Sync + 'static,
{
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes observing `handle`'s node.
    pub fn observer_count(&self, handle: &NodeHandle) -> usize {
        self.nodes
            .get(handle.index)
            .map_or(0, |n| n.observers.len())
    }

    /// Spawn one worker per node. Must be called within a tokio runtime.
    pub fn start(self) -> RunningGraph<T> {
        let cancel = CancellationToken::new();
        let consumer_count = self.nodes.iter().filter(|n| n.input.is_some()).count();

        GraphStarted {
            node_count: self.nodes.len(),
            consumer_count,
        }
        .log();

        let mut emitters = Vec::with_capacity(self.nodes.len());
        let mut workers = Vec::with_capacity(self.nodes.len());

        for pending in self.nodes {
            let emitter = Emitter {
                origin: Arc::clone(&pending.name),
                observers: Arc::from(pending.observers),
            };
            emitters.push(emitter.clone());

            // The node's own sender clone is dropped here so the queue
            // closes once every upstream emitter is gone.
            let receiver = pending.input.map(|(_, receiver)| receiver);
            let worker = Worker {
                name: Arc::clone(&pending.name),
                node: pending.node,
                emitter,
                cancel: cancel.clone(),
                poll_interval: self.poll_interval,
            };

            let handle = match receiver {
                Some(receiver) => tokio::spawn(worker.consume(receiver)),
                None => tokio::spawn(worker.produce()),
            };
            workers.push((pending.name, handle));
        }

        RunningGraph {
            cancel,
            emitters,
            workers,
        }
    }
}

struct Worker<T>
where
    T: Send + Sync + 'static,
{
    name: Arc<str>,
    node: Box<dyn StreamNode<T>>,
    emitter: Emitter<T>,
    cancel: CancellationToken,
    poll_interval: Duration,
}

impl<T> Worker<T>
where
    T: Send + Sync + 'static,
{
    async fn consume(mut self, mut receiver: mpsc::UnboundedReceiver<Message<T>>) {
        let reason = loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break "cancelled",
                received = tokio::time::timeout(self.poll_interval, receiver.recv()) => match received {
                    Err(_) => continue,
                    Ok(None) => break "upstream closed",
                    Ok(Some(message)) => {
                        let update = self.node.update(&message.origin, message.payload, &self.emitter);
                        let handled = AssertUnwindSafe(update)
                            .catch_unwind()
                            .await
                            .unwrap_or_else(|panic| {
                                Err(StreamError::HookPanicked {
                                    node: self.name.to_string(),
                                    message: panic_message(panic.as_ref()),
                                })
                            });
                        if let Err(error) = handled {
                            NodeHookFailed {
                                node: &self.name,
                                origin: Some(&*message.origin),
                                error: &error,
                            }
                            .log();
                        }
                    }
                },
            }
        };

        NodeStopped {
            node: &self.name,
            reason,
        }
        .log();
    }

    async fn produce(mut self) {
        let cancel = self.cancel.clone();
        let reason = tokio::select! {
            _ = cancel.cancelled() => "cancelled",
            result = self.node.produce(&self.emitter, self.cancel.child_token()) => match result {
                Ok(()) => "finished",
                Err(error) => {
                    NodeHookFailed {
                        node: &self.name,
                        origin: None,
                        error: &error,
                    }
                    .log();
                    "failed"
                }
            },
        };

        NodeStopped {
            node: &self.name,
            reason,
        }
        .log();
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// A graph whose workers are running. Dropping it cancels every worker.
pub struct RunningGraph<T> {
    cancel: CancellationToken,
    emitters: Vec<Emitter<T>>,
    workers: Vec<(Arc<str>, JoinHandle<()>)>,
}

impl<T> RunningGraph<T>
where
    T: Send + Sync + 'static,
{
    /// Emitter that sends as `handle`'s node, for feeding values in from
    /// outside the graph.
    pub fn emitter(&self, handle: &NodeHandle) -> Option<Emitter<T>> {
        self.emitters
            .get(handle.index)
            .filter(|e| *e.origin == *handle.name)
            .cloned()
    }

    /// Signal every worker to stop without waiting.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop every worker and wait for them to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        self.join_workers().await;
    }

    /// Wait for the graph to drain on its own: producers finish, then each
    /// consumer exits once all of its upstream nodes have.
    pub async fn wait(mut self) {
        self.emitters.clear();
        self.join_workers().await;
    }

    async fn join_workers(&mut self) {
        for (name, handle) in std::mem::take(&mut self.workers) {
            if let Err(error) = handle.await {
                NodeHookFailed {
                    node: &name,
                    origin: None,
                    error: &error,
                }
                .log();
            }
        }
    }
}

impl<T> Drop for RunningGraph<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
