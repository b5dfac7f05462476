//! Cross-window messaging contract used by the config relay.

use std::{cell::RefCell, rc::Rc};

/// Posts text messages to the window that opened or embeds the current one.
pub trait FrameMessenger {
    /// Returns whether the current window was opened by another window.
    fn has_opener(&self) -> bool;

    /// Posts `message` to the opener when one exists, otherwise to the parent frame.
    fn post_to_opener_or_parent(&self, message: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Messenger for targets without any window hierarchy.
pub struct NoopFrameMessenger;

impl FrameMessenger for NoopFrameMessenger {
    fn has_opener(&self) -> bool {
        false
    }

    fn post_to_opener_or_parent(&self, _message: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Destination a [`MemoryFrameMessenger`] recorded for one post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostedFrameMessage {
    /// Posted to the opening window.
    Opener,
    /// Posted to the parent frame.
    Parent,
}

#[derive(Debug, Clone, Default)]
/// In-memory messenger that records every post.
pub struct MemoryFrameMessenger {
    opener: bool,
    posts: Rc<RefCell<Vec<(PostedFrameMessage, String)>>>,
}

impl MemoryFrameMessenger {
    /// Creates a messenger for a window opened by another window (a popup).
    pub fn popup() -> Self {
        Self {
            opener: true,
            ..Self::default()
        }
    }

    /// Creates a messenger for an embedded frame without an opener.
    pub fn embedded() -> Self {
        Self::default()
    }

    /// Returns every recorded post in order.
    pub fn posts(&self) -> Vec<(PostedFrameMessage, String)> {
        self.posts.borrow().clone()
    }
}

impl FrameMessenger for MemoryFrameMessenger {
    fn has_opener(&self) -> bool {
        self.opener
    }

    fn post_to_opener_or_parent(&self, message: &str) -> Result<(), String> {
        let target = if self.opener {
            PostedFrameMessage::Opener
        } else {
            PostedFrameMessage::Parent
        };
        self.posts.borrow_mut().push((target, message.to_string()));
        Ok(())
    }
}
