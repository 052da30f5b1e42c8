//! Embedded document navigation history.

use parking_lot::Mutex;

// ============================================================================
// LocationSnapshot
// ============================================================================

/// Current navigable location of the embedded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationSnapshot {
    /// Current in-app location.
    pub href: String,
    /// Current document title.
    pub title: Option<String>,
    /// Back navigation possible.
    pub can_go_back: bool,
    /// Forward navigation possible.
    pub can_go_forward: bool,
}

// ============================================================================
// AgentHistory
// ============================================================================

/// The embedded document's own history, as seen by the agent.
///
/// Implementations perform the navigation synchronously; the agent reads
/// [`location`](Self::location) right afterwards to report the result.
pub trait AgentHistory: Send + Sync {
    /// Returns the current location.
    fn location(&self) -> LocationSnapshot;

    /// Goes back one entry. No-op at the start of history.
    fn back(&self);

    /// Goes forward one entry. No-op at the end of history.
    fn forward(&self);

    /// Navigates to `href`, dropping any forward entries.
    fn go(&self, href: &str);
}

// ============================================================================
// MemoryHistory
// ============================================================================

struct Entry {
    href: String,
    title: Option<String>,
}

struct Stack {
    entries: Vec<Entry>,
    index: usize,
}

/// A history stack kept in memory.
pub struct MemoryHistory {
    stack: Mutex<Stack>,
}

impl MemoryHistory {
    /// Creates a history with a single entry.
    #[must_use]
    pub fn new(initial_href: impl Into<String>) -> Self {
        Self {
            stack: Mutex::new(Stack {
                entries: vec![Entry {
                    href: initial_href.into(),
                    title: None,
                }],
                index: 0,
            }),
        }
    }

    /// Sets the title of the current entry.
    pub fn set_title(&self, title: impl Into<String>) {
        let mut stack = self.stack.lock();
        let index = stack.index;
        stack.entries[index].title = Some(title.into());
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.lock().entries.len()
    }

    /// Always `false`; a history has at least its initial entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl AgentHistory for MemoryHistory {
    fn location(&self) -> LocationSnapshot {
        let stack = self.stack.lock();
        let current = &stack.entries[stack.index];
        LocationSnapshot {
            href: current.href.clone(),
            title: current.title.clone(),
            can_go_back: stack.index > 0,
            can_go_forward: stack.index + 1 < stack.entries.len(),
        }
    }

    fn back(&self) {
        let mut stack = self.stack.lock();
        stack.index = stack.index.saturating_sub(1);
    }

    fn forward(&self) {
        let mut stack = self.stack.lock();
        if stack.index + 1 < stack.entries.len() {
            stack.index += 1;
        }
    }

    fn go(&self, href: &str) {
        let mut stack = self.stack.lock();
        let keep = stack.index + 1;
        stack.entries.truncate(keep);
        stack.entries.push(Entry {
            href: href.to_string(),
            title: None,
        });
        stack.index = keep;
    }
}

// ============================================================================
// Tests
// ============================================================================
