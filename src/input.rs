//! Pull-based input sources.
//!
//! An input source yields one payload per step. It is finite and cannot be
//! restarted: once a payload has been pulled it is gone, and running the
//! same inputs again means building a new source (and a new engine).

use crate::core::Payload;
use futures::stream::{self, BoxStream, Fuse, Stream, StreamExt};
use serde_json::Value;
use std::fmt;

/// Lazy, finite sequence of payloads consumed one step at a time.
///
/// # Example
///
/// ```rust
/// use stepwise::input::InputSource;
///
/// # futures::executor::block_on(async {
/// let mut inputs = InputSource::from_values("value", ["1", "3"]);
///
/// assert_eq!(inputs.next().await.unwrap().get_str("value"), Some("1"));
/// assert_eq!(inputs.next().await.unwrap().get_str("value"), Some("3"));
/// assert!(inputs.next().await.is_none());
/// assert!(inputs.next().await.is_none());
/// assert_eq!(inputs.pulled(), 2);
/// # });
/// ```
pub struct InputSource {
    stream: Fuse<BoxStream<'static, Payload>>,
    pulled: usize,
}

impl InputSource {
    /// Wrap any stream of payloads.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Payload> + Send + 'static,
    {
        Self {
            stream: stream.boxed().fuse(),
            pulled: 0,
        }
    }

    pub fn from_payloads<I>(payloads: I) -> Self
    where
        I: IntoIterator<Item = Payload>,
        I::IntoIter: Send + 'static,
    {
        Self::new(stream::iter(payloads))
    }

    /// One payload per value, each of the form `{ field: value }`.
    pub fn from_values<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        I::IntoIter: Send + 'static,
        V: Into<Value>,
    {
        let field = field.into();
        Self::new(stream::iter(values).map(move |value| Payload::new().with(field.clone(), value)))
    }

    pub fn empty() -> Self {
        Self::new(stream::empty())
    }

    /// Pull the next payload. `None` once the source is exhausted, and on
    /// every call after that.
    pub async fn next(&mut self) -> Option<Payload> {
        let payload = self.stream.next().await;
        if payload.is_some() {
            self.pulled += 1;
        }
        payload
    }

    /// Number of payloads handed out so far.
    pub fn pulled(&self) -> usize {
        self.pulled
    }

    /// Whether the source has already reported exhaustion.
    pub fn is_exhausted(&self) -> bool {
        self.stream.is_done()
    }
}

impl From<Vec<Payload>> for InputSource {
    fn from(payloads: Vec<Payload>) -> Self {
        Self::from_payloads(payloads)
    }
}

impl fmt::Debug for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputSource")
            .field("pulled", &self.pulled)
            .field("exhausted", &self.is_exhausted())
            .finish()
    }
}
