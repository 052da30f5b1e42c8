//! In-process browsing contexts.
//!
//! Each [`MemoryWindow`] models one browsing context: an origin, a message
//! inbox and a listener registry. Posting enqueues a [`MessageEvent`]
//! stamped with the sender's identity and origin; the receiving side runs
//! its own "event loop" by draining its [`Inbox`], either synchronously
//! with [`Inbox::dispatch_pending`] or on a tokio task via
//! [`spawn_event_loop`].
//!
//! # Example
//!
//! ```
//! use frame_bridge::origin::Origin;
//! use frame_bridge::transport::{MemoryFrame, MemoryWindow};
//!
//! let (host, _host_inbox) = MemoryWindow::new(Origin::parse("https://host.example").unwrap());
//! let (app, _app_inbox) = MemoryWindow::new(Origin::parse("https://app.example").unwrap());
//!
//! let frame = MemoryFrame::new(host.clone());
//! frame.load(app.clone());
//! let parent = app.port_to(&host);
//! # let _ = parent;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::{ListenerId, WindowId};
use crate::origin::{Origin, TargetOrigin};

use super::{BrowsingContext, FrameRef, MessageEvent, MessageHandler, MessageTarget};

// ============================================================================
// ListenerRegistry
// ============================================================================

/// Installed message listeners of one window.
#[derive(Default)]
struct ListenerRegistry {
    handlers: Mutex<FxHashMap<ListenerId, MessageHandler>>,
}

impl ListenerRegistry {
    fn add(&self, handler: MessageHandler) -> ListenerId {
        let id = ListenerId::next();
        self.handlers.lock().insert(id, handler);
        id
    }

    fn remove(&self, id: ListenerId) -> bool {
        self.handlers.lock().remove(&id).is_some()
    }

    fn len(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Invokes every listener in installation order.
    ///
    /// Handlers are cloned out first so a listener may add or remove
    /// listeners without deadlocking.
    fn dispatch(&self, event: &MessageEvent) {
        let mut handlers: Vec<(ListenerId, MessageHandler)> = self
            .handlers
            .lock()
            .iter()
            .map(|(id, handler)| (*id, Arc::clone(handler)))
            .collect();
        handlers.sort_by_key(|(id, _)| *id);

        for (_, handler) in handlers {
            handler(event);
        }
    }
}

// ============================================================================
// MemoryWindow
// ============================================================================

/// An in-memory browsing context.
pub struct MemoryWindow {
    id: WindowId,
    origin: Origin,
    inbox_tx: mpsc::UnboundedSender<MessageEvent>,
    listeners: Arc<ListenerRegistry>,
    closed: AtomicBool,
}

impl MemoryWindow {
    /// Creates a window with the given origin and returns it with its inbox.
    #[must_use]
    pub fn new(origin: Origin) -> (Arc<Self>, Inbox) {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let listeners = Arc::new(ListenerRegistry::default());

        let window = Arc::new(Self {
            id: WindowId::next(),
            origin,
            inbox_tx,
            listeners: Arc::clone(&listeners),
            closed: AtomicBool::new(false),
        });

        let inbox = Inbox {
            window_id: window.id,
            rx: inbox_rx,
            listeners,
        };

        (window, inbox)
    }

    /// Returns the window ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Returns the window's origin.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Marks the window closed; further posts to it fail.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        debug!(window_id = %self.id, "Window closed");
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Returns the number of installed message listeners.
    #[inline]
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Returns a handle for posting from `self` to `to`.
    #[must_use]
    pub fn port_to(self: &Arc<Self>, to: &Arc<MemoryWindow>) -> MemoryPort {
        MemoryPort {
            from: Arc::clone(self),
            to: Arc::clone(to),
        }
    }

    /// Enqueues a message as if posted by `from`.
    fn deliver(&self, from: &MemoryWindow, data: Value, target_origin: &TargetOrigin) -> Result<()> {
        if self.is_closed() {
            return Err(Error::window_closed(self.id));
        }

        if !target_origin.matches(&self.origin) {
            trace!(
                window_id = %self.id,
                expected = %target_origin,
                actual = %self.origin,
                "Target origin mismatch, message discarded"
            );
            return Ok(());
        }

        let event = MessageEvent {
            source: Some(from.id),
            origin: from.origin.to_string(),
            data,
        };

        self.inbox_tx
            .send(event)
            .map_err(|_| Error::window_closed(self.id))
    }
}

impl MessageTarget for MemoryWindow {
    fn add_message_listener(&self, handler: MessageHandler) -> ListenerId {
        self.listeners.add(handler)
    }

    fn remove_message_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

// ============================================================================
// MemoryPort
// ============================================================================

/// A sender-bound view of another window (`otherWindow.postMessage`).
#[derive(Clone)]
pub struct MemoryPort {
    from: Arc<MemoryWindow>,
    to: Arc<MemoryWindow>,
}

impl BrowsingContext for MemoryPort {
    fn id(&self) -> WindowId {
        self.to.id
    }

    fn post_message(&self, data: Value, target_origin: &TargetOrigin) -> Result<()> {
        self.to.deliver(&self.from, data, target_origin)
    }
}

// ============================================================================
// MemoryFrame
// ============================================================================

/// An in-memory frame element living in a host window.
pub struct MemoryFrame {
    host: Arc<MemoryWindow>,
    content: RwLock<Option<Arc<MemoryWindow>>>,
}

impl MemoryFrame {
    /// Creates an empty frame inside `host`.
    #[must_use]
    pub fn new(host: Arc<MemoryWindow>) -> Arc<Self> {
        Arc::new(Self {
            host,
            content: RwLock::new(None),
        })
    }

    /// Loads a document (window) into the frame, replacing any previous one.
    pub fn load(&self, window: Arc<MemoryWindow>) {
        debug!(host = %self.host.id, window_id = %window.id, "Frame loaded");
        *self.content.write() = Some(window);
    }

    /// Removes the frame's document; `content_window()` becomes `None`.
    pub fn unload(&self) {
        *self.content.write() = None;
    }
}

impl FrameRef for MemoryFrame {
    fn content_window(&self) -> Option<Arc<dyn BrowsingContext>> {
        let content = self.content.read();
        content
            .as_ref()
            .map(|window| Arc::new(self.host.port_to(window)) as Arc<dyn BrowsingContext>)
    }
}

// ============================================================================
// Inbox
// ============================================================================

/// Receiving end of a window's message queue.
pub struct Inbox {
    window_id: WindowId,
    rx: mpsc::UnboundedReceiver<MessageEvent>,
    listeners: Arc<ListenerRegistry>,
}

impl Inbox {
    /// Returns the ID of the owning window.
    #[inline]
    #[must_use]
    pub fn window_id(&self) -> WindowId {
        self.window_id
    }

    /// Delivers every queued message to the window's listeners.
    ///
    /// Returns the number of messages dispatched.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.listeners.dispatch(&event);
            count += 1;
        }
        count
    }

    /// Waits for the next queued message without dispatching it.
    pub async fn recv(&mut self) -> Option<MessageEvent> {
        self.rx.recv().await
    }
}

// ============================================================================
// EventLoop
// ============================================================================

/// Handle to a spawned inbox event loop.
pub struct EventLoop {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<Inbox>,
}

impl EventLoop {
    /// Stops the loop and returns the inbox with any undelivered messages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the loop task panicked.
    pub async fn shutdown(mut self) -> Result<Inbox> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.task
            .await
            .map_err(|e| Error::config(format!("event loop task failed: {e}")))
    }
}

/// Spawns a tokio task delivering inbox messages to listeners in order.
///
/// Must be called from within a tokio runtime.
#[must_use]
pub fn spawn_event_loop(mut inbox: Inbox) -> EventLoop {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                event = inbox.rx.recv() => {
                    match event {
                        Some(event) => inbox.listeners.dispatch(&event),
                        None => {
                            debug!(window_id = %inbox.window_id, "Inbox closed");
                            break;
                        }
                    }
                }

                _ = &mut shutdown_rx => {
                    debug!(window_id = %inbox.window_id, "Event loop shutdown");
                    break;
                }
            }
        }
        inbox
    });

    EventLoop {
        shutdown_tx: Some(shutdown_tx),
        task,
    }
}

// ============================================================================
// Tests
// ============================================================================
