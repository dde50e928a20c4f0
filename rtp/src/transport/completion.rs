use super::code;
use std::fmt;

type Callback = Box<dyn FnOnce(i32, usize) + Send + 'static>;

/// One-shot completion for a single accepted send.
///
/// Fires at most once: through [`complete`](SendCompletion::complete), or
/// with [`code::ABANDONED`] if the transport drops it unfired. A send that
/// was rejected synchronously gives the token back to its owner, who
/// disposes of it with [`cancel`](SendCompletion::cancel).
pub struct SendCompletion {
    callback: Option<Callback>,
}

impl SendCompletion {
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce(i32, usize) + Send + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    pub fn complete(mut self, code: i32, bytes_transferred: usize) {
        if let Some(callback) = self.callback.take() {
            callback(code, bytes_transferred);
        }
    }

    /// Drops the callback, and everything it captured, without running it.
    pub fn cancel(mut self) {
        self.callback.take();
    }
}

impl Drop for SendCompletion {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback(code::ABANDONED, 0);
        }
    }
}

impl fmt::Debug for SendCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendCompletion")
            .field("armed", &self.callback.is_some())
            .finish()
    }
}
