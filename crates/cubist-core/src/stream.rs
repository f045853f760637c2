//! Fragment forwarding and accumulation.

/// Destination for streamed text fragments.
///
/// `accept` is called synchronously, in arrival order, once per fragment.
pub trait FragmentSink {
    /// Accept one fragment.
    fn accept(&mut self, fragment: &str);
}

/// Accumulating sink for tests and in-memory capture.
impl FragmentSink for String {
    fn accept(&mut self, fragment: &str) {
        self.push_str(fragment);
    }
}

/// Sink that discards fragments.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FragmentSink for NullSink {
    fn accept(&mut self, _fragment: &str) {}
}

/// Pass-through aggregator for one step's fragment stream.
///
/// Every fragment is forwarded to the sink immediately and appended to an
/// internal buffer; no reordering, deduplication, or additional buffering.
/// [`StreamAggregator::into_text`] yields the exact in-order concatenation
/// once the stream for the step closes.
pub struct StreamAggregator<'a> {
    sink: &'a mut dyn FragmentSink,
    buffer: String,
}

impl<'a> StreamAggregator<'a> {
    /// Create an aggregator forwarding into `sink`.
    pub fn new(sink: &'a mut dyn FragmentSink) -> Self {
        Self {
            sink,
            buffer: String::new(),
        }
    }

    /// Forward one fragment and accumulate it.
    pub fn push(&mut self, fragment: &str) {
        self.sink.accept(fragment);
        self.buffer.push_str(fragment);
    }

    /// Whether any fragment has arrived yet.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Consume the aggregator, yielding the full concatenation.
    pub fn into_text(self) -> String {
        self.buffer
    }
}
