//! DispatchNode contract and construction-time receivers

use std::any::{type_name, Any};

use contracts::{LogContext, LogLevel, Sink};

use crate::dispatcher::Dispatcher;
use crate::error::DispatcherError;
use crate::filter::FilterNode;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{ConsoleSink, FileSink, MemorySink, TracingSink, UdpSink};
use crate::writer::{FormattedWriter, SharedSink};

type Classified = Result<Receiver, Box<dyn Any + Send>>;

// Concrete sinks recognized inside an opaque receiver
const BUILT_IN_SINKS: [fn(Box<dyn Any + Send>) -> Classified; 5] = [
    downcast_sink::<ConsoleSink>,
    downcast_sink::<FileSink>,
    downcast_sink::<MemorySink>,
    downcast_sink::<TracingSink>,
    downcast_sink::<UdpSink>,
];

fn downcast_sink<S: Sink + 'static>(value: Box<dyn Any + Send>) -> Classified {
    value.downcast::<S>().map(|sink| Receiver::Sink(sink))
}

/// Branch of a dispatch tree.
///
/// Anything that can sit under a [`Dispatcher`] as a child: it receives every
/// event its parent fans out and takes part in the parent's flush/close walk.
pub trait DispatchNode: Send {
    /// Deliver one event to every destination below this node.
    ///
    /// Per-destination failures go to `on_error`; delivery always continues.
    fn dispatch(
        &mut self,
        message: &str,
        level: LogLevel,
        context: &LogContext,
        on_error: &mut dyn FnMut(DispatcherError),
    );

    /// Best-effort flush of every sink below this node. Never fails.
    fn flush(&mut self);

    /// Flush and close every owned sink below this node, stopping at the first error.
    fn close(&mut self) -> Result<(), DispatcherError>;

    /// Multi-line diagnostic dump, see [`Dispatcher::describe`]
    fn describe(&self) -> String;

    /// Per-writer metrics for the subtree, in dispatch order
    fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        Vec::new()
    }
}

/// Construction-time argument to a [`Dispatcher`]
pub enum Receiver {
    /// Pre-built writer, stored as-is
    Writer(FormattedWriter),
    /// Raw sink, wrapped with the dispatcher's formatter; the tree owns it
    Sink(Box<dyn Sink>),
    /// Raw sink owned elsewhere; the tree flushes but never closes it
    SharedSink(SharedSink),
    /// Nested dispatcher-like node
    Node(Box<dyn DispatchNode>),
    /// Value of unknown type, classified at construction
    Opaque {
        type_name: &'static str,
        value: Box<dyn Any + Send>,
    },
}

impl Receiver {
    /// Owned raw sink
    pub fn sink<S: Sink + 'static>(sink: S) -> Self {
        Receiver::Sink(Box::new(sink))
    }

    /// Nested node
    pub fn node<N: DispatchNode + 'static>(node: N) -> Self {
        Receiver::Node(Box::new(node))
    }

    /// Type-erased value.
    ///
    /// Recognized types are `FormattedWriter`, `Box<dyn Sink>`, the built-in
    /// sinks of [`crate::sinks`], `SharedSink`, `Dispatcher`, `FilterNode` and
    /// `Box<dyn DispatchNode>`; anything else fails construction with
    /// `UnsupportedReceiverType`.
    pub fn opaque<T: Any + Send>(value: T) -> Self {
        Receiver::Opaque {
            type_name: type_name::<T>(),
            value: Box::new(value),
        }
    }

    /// Resolve opaque values into one of the typed variants
    pub(crate) fn classify(self) -> Result<Receiver, DispatcherError> {
        let (type_name, value) = match self {
            Receiver::Opaque { type_name, value } => (type_name, value),
            typed => return Ok(typed),
        };

        let value = match value.downcast::<FormattedWriter>() {
            Ok(writer) => return Ok(Receiver::Writer(*writer)),
            Err(value) => value,
        };
        let mut value = match value.downcast::<Box<dyn Sink>>() {
            Ok(sink) => return Ok(Receiver::Sink(*sink)),
            Err(value) => value,
        };
        for downcast in BUILT_IN_SINKS {
            match downcast(value) {
                Ok(receiver) => return Ok(receiver),
                Err(rest) => value = rest,
            }
        }
        let value = match value.downcast::<SharedSink>() {
            Ok(sink) => return Ok(Receiver::SharedSink(*sink)),
            Err(value) => value,
        };
        let value = match value.downcast::<Dispatcher>() {
            Ok(node) => return Ok(Receiver::Node(node)),
            Err(value) => value,
        };
        let value = match value.downcast::<FilterNode>() {
            Ok(node) => return Ok(Receiver::Node(node)),
            Err(value) => value,
        };
        match value.downcast::<Box<dyn DispatchNode>>() {
            Ok(node) => Ok(Receiver::Node(*node)),
            Err(_) => Err(DispatcherError::unsupported(type_name)),
        }
    }
}

impl From<FormattedWriter> for Receiver {
    fn from(writer: FormattedWriter) -> Self {
        Receiver::Writer(writer)
    }
}

impl From<Box<dyn Sink>> for Receiver {
    fn from(sink: Box<dyn Sink>) -> Self {
        Receiver::Sink(sink)
    }
}

impl From<SharedSink> for Receiver {
    fn from(sink: SharedSink) -> Self {
        Receiver::SharedSink(sink)
    }
}

impl From<Dispatcher> for Receiver {
    fn from(node: Dispatcher) -> Self {
        Receiver::node(node)
    }
}

impl From<FilterNode> for Receiver {
    fn from(node: FilterNode) -> Self {
        Receiver::node(node)
    }
}

impl From<Box<dyn DispatchNode>> for Receiver {
    fn from(node: Box<dyn DispatchNode>) -> Self {
        Receiver::Node(node)
    }
}
