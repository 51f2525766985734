use crate::frame::Frame;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

/// A user-facing status line, tagged with the frame it was raised on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub frame_index: u64,
    pub level: StatusLevel,
    pub source: &'static str,
    pub text: String,
}

/// Messages retained by a [`StatusLog`].
pub const STATUS_CAPACITY: usize = 32;

/// Status area backing store. Messages are kept in arrival order; the render
/// loop shows the latest error if there is one, otherwise the latest info.
///
/// At most [`STATUS_CAPACITY`] messages are kept. The oldest info message is
/// evicted first, so an error stays visible behind a stream of infos.
#[derive(Debug, Default)]
pub struct StatusLog {
    messages: Vec<StatusMessage>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    pub fn info(&mut self, frame: Frame, source: &'static str, text: impl Into<String>) {
        self.push(frame, StatusLevel::Info, source, text.into());
    }

    pub fn error(&mut self, frame: Frame, source: &'static str, text: impl Into<String>) {
        self.push(frame, StatusLevel::Error, source, text.into());
    }

    fn push(&mut self, frame: Frame, level: StatusLevel, source: &'static str, text: String) {
        self.messages.push(StatusMessage {
            frame_index: frame.index,
            level,
            source,
            text,
        });
        if self.messages.len() > STATUS_CAPACITY {
            let evict = self
                .messages
                .iter()
                .position(|m| m.level == StatusLevel::Info)
                .unwrap_or(0);
            self.messages.remove(evict);
        }
    }

    pub fn messages(&self) -> &[StatusMessage] {
        &self.messages
    }

    /// The message to display: the most recent error, else the most recent info.
    pub fn headline(&self) -> Option<&StatusMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.level == StatusLevel::Error)
            .or_else(|| self.messages.last())
    }
}
