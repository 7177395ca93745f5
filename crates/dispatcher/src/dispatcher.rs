//! Dispatcher - tree node fanning log events out to writers and children

use std::fmt;

use contracts::{
    LogConfig, LogContext, LogLevel, PatternFormatter, ReceiverConfig, SharedFormatter, Sink,
};
use tracing::{debug, instrument};

use crate::error::DispatcherError;
use crate::filter::FilterNode;
use crate::metrics::MetricsSnapshot;
use crate::node::{DispatchNode, Receiver};
use crate::sinks::{ConsoleSink, FileSink, TracingSink, UdpSink};
use crate::writer::FormattedWriter;

const CHILD_INDENT: &str = "        ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Active,
    Closed,
}

/// Tree node owning an ordered list of writers and an ordered list of children.
///
/// - `dispatch` visits own writers first, then children, each in registration order.
/// - `flush` and `close` visit children first, then own writers.
/// - The first `close` moves the node to its terminal closed state.
pub struct Dispatcher {
    formatter: SharedFormatter,
    writers: Vec<FormattedWriter>,
    children: Vec<Box<dyn DispatchNode>>,
    state: NodeState,
}

impl Dispatcher {
    /// Create a dispatcher from a formatter and a non-empty list of receivers.
    ///
    /// Raw sinks are wrapped into writers using `formatter`.
    ///
    /// # Errors
    /// - `NilFormatter` if `formatter` is `None`
    /// - `EmptyReceivers` if `receivers` is empty
    /// - `UnsupportedReceiverType` for an opaque receiver of unknown type
    /// - `InvalidWriter` if a raw sink cannot be wrapped
    pub fn new(
        formatter: Option<SharedFormatter>,
        receivers: Vec<Receiver>,
    ) -> Result<Self, DispatcherError> {
        let formatter = formatter.ok_or(DispatcherError::NilFormatter)?;
        if receivers.is_empty() {
            return Err(DispatcherError::EmptyReceivers);
        }

        let mut writers = Vec::new();
        let mut children = Vec::new();
        for receiver in receivers {
            match receiver.classify()? {
                Receiver::Writer(writer) => writers.push(writer),
                Receiver::Sink(sink) => {
                    writers.push(FormattedWriter::new(sink, formatter.clone())?)
                }
                Receiver::SharedSink(sink) => {
                    writers.push(FormattedWriter::shared(sink, formatter.clone())?)
                }
                Receiver::Node(node) => children.push(node),
                Receiver::Opaque { type_name, .. } => {
                    return Err(DispatcherError::unsupported(type_name))
                }
            }
        }

        Ok(Self {
            formatter,
            writers,
            children,
            state: NodeState::Active,
        })
    }

    /// Start an incremental build
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Formatter shared with raw-sink writers of this node
    pub fn formatter(&self) -> &SharedFormatter {
        &self.formatter
    }

    /// Own writers, in registration order
    pub fn writers(&self) -> &[FormattedWriter] {
        &self.writers
    }

    /// Child nodes, in registration order
    pub fn children(&self) -> &[Box<dyn DispatchNode>] {
        &self.children
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.state == NodeState::Closed
    }

    /// Deliver one event: own writers first, then children, depth-first.
    ///
    /// A failing writer is reported through `on_error` and skipped; every other
    /// destination still receives the event. On a closed node the call reports
    /// `Closed` once and delivers nothing.
    pub fn dispatch(
        &mut self,
        message: &str,
        level: LogLevel,
        context: &LogContext,
        on_error: &mut dyn FnMut(DispatcherError),
    ) {
        if self.is_closed() {
            on_error(DispatcherError::Closed);
            return;
        }

        for writer in &mut self.writers {
            if let Err(e) = writer.write(message, level, context) {
                on_error(DispatcherError::write(writer.name(), e));
            }
        }

        for child in &mut self.children {
            child.dispatch(message, level, context, on_error);
        }
    }

    /// Best-effort flush: children first, then own flushable sinks.
    ///
    /// Sinks without the flush capability are skipped; flush failures are
    /// logged and swallowed. No-op once closed.
    pub fn flush(&mut self) {
        if self.is_closed() {
            debug!("Flush on closed dispatcher ignored");
            return;
        }

        for child in &mut self.children {
            child.flush();
        }
        for writer in &mut self.writers {
            writer.flush_quietly();
        }
    }

    /// Tear the subtree down: each child is flushed then closed, then each
    /// own writer is flushed then closed.
    ///
    /// Returns the first error and skips the rest of this node's teardown.
    /// Shared sinks are flushed but left open. The node is closed afterwards
    /// whatever the outcome; a second call returns `Closed`.
    #[instrument(
        name = "dispatcher_close",
        skip(self),
        fields(writers = self.writers.len(), children = self.children.len())
    )]
    pub fn close(&mut self) -> Result<(), DispatcherError> {
        if self.is_closed() {
            return Err(DispatcherError::Closed);
        }
        self.state = NodeState::Closed;

        for child in &mut self.children {
            child.flush();
            child.close()?;
        }

        for writer in &mut self.writers {
            writer.flush_quietly();
            writer
                .close_sink()
                .map_err(|e| DispatcherError::close(writer.name(), e))?;
        }

        debug!("Dispatcher closed");
        Ok(())
    }

    /// Indented tree dump: formatter, then children, then writers
    pub fn describe(&self) -> String {
        let mut out = format!("Formatter: {}\n", self.formatter);

        out.push_str("    ->Dispatchers:");
        if self.children.is_empty() {
            out.push_str("none\n");
        } else {
            out.push('\n');
            for child in &self.children {
                let text = child.describe();
                let mut lines = text.lines();
                if let Some(first) = lines.next() {
                    out.push_str(&format!("{CHILD_INDENT}->{first}\n"));
                }
                for line in lines {
                    out.push_str(&format!("{CHILD_INDENT}{line}\n"));
                }
            }
        }

        out.push_str("    ->Writers:");
        if self.writers.is_empty() {
            out.push_str("none\n");
        } else {
            out.push('\n');
            for writer in &self.writers {
                out.push_str(&format!("{CHILD_INDENT}->{writer}\n"));
            }
        }

        out
    }

    /// Per-writer metrics for the whole subtree, in dispatch order
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        let own = self
            .writers
            .iter()
            .map(|w| (w.name().to_string(), w.metrics().snapshot()));
        let nested = self.children.iter().flat_map(|c| c.metrics());
        own.chain(nested).collect()
    }
}

impl DispatchNode for Dispatcher {
    fn dispatch(
        &mut self,
        message: &str,
        level: LogLevel,
        context: &LogContext,
        on_error: &mut dyn FnMut(DispatcherError),
    ) {
        Dispatcher::dispatch(self, message, level, context, on_error)
    }

    fn flush(&mut self) {
        Dispatcher::flush(self)
    }

    fn close(&mut self) -> Result<(), DispatcherError> {
        Dispatcher::close(self)
    }

    fn describe(&self) -> String {
        Dispatcher::describe(self)
    }

    fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        Dispatcher::metrics(self)
    }
}

impl fmt::Display for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("writers", &self.writers)
            .field("children", &self.children.len())
            .field("state", &self.state)
            .finish()
    }
}

/// Builder for creating a Dispatcher
#[derive(Default)]
pub struct DispatcherBuilder {
    formatter: Option<SharedFormatter>,
    receivers: Vec<Receiver>,
}

impl DispatcherBuilder {
    /// Set the formatter
    pub fn formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Append a receiver
    pub fn receiver(mut self, receiver: impl Into<Receiver>) -> Self {
        self.receivers.push(receiver.into());
        self
    }

    /// Append an owned raw sink
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.receivers.push(Receiver::sink(sink));
        self
    }

    /// Build the dispatcher, see [`Dispatcher::new`]
    pub fn build(self) -> Result<Dispatcher, DispatcherError> {
        Dispatcher::new(self.formatter, self.receivers)
    }
}

/// Build a whole dispatch tree from a configuration.
///
/// Nested dispatchers without their own `format` inherit their parent's.
#[instrument(
    name = "dispatcher_create",
    skip(config),
    fields(receivers = config.receivers.len())
)]
pub fn create_dispatcher(config: &LogConfig) -> Result<Dispatcher, DispatcherError> {
    let formatter = match &config.format {
        Some(pattern) => PatternFormatter::new(pattern.as_str())?.shared(),
        None => PatternFormatter::default().shared(),
    };
    let root = build_node(&formatter, None, &config.receivers)?;
    debug!(
        sinks = config.sink_count(),
        dispatchers = config.dispatcher_count(),
        "Dispatch tree built"
    );
    Ok(root)
}

fn build_node(
    parent_formatter: &SharedFormatter,
    format: Option<&str>,
    receivers: &[ReceiverConfig],
) -> Result<Dispatcher, DispatcherError> {
    let formatter = match format {
        Some(pattern) => PatternFormatter::new(pattern)?.shared(),
        None => parent_formatter.clone(),
    };

    let mut built = Vec::with_capacity(receivers.len());
    for receiver in receivers {
        built.push(build_receiver(&formatter, receiver)?);
    }
    Dispatcher::new(Some(formatter), built)
}

fn build_receiver(
    formatter: &SharedFormatter,
    config: &ReceiverConfig,
) -> Result<Receiver, DispatcherError> {
    match config {
        ReceiverConfig::Dispatcher(d) => Ok(Receiver::node(build_node(
            formatter,
            d.format.as_deref(),
            &d.receivers,
        )?)),
        ReceiverConfig::Filter(f) => {
            let inner = build_node(formatter, f.format.as_deref(), &f.receivers)?;
            Ok(Receiver::node(FilterNode::new(f.levels.iter().copied(), inner)))
        }
        sink => Ok(Receiver::Sink(create_sink(sink)?)),
    }
}

/// Create a sink from its configuration
#[instrument(
    name = "dispatcher_create_sink",
    skip(config),
    fields(sink_type = config.kind())
)]
fn create_sink(config: &ReceiverConfig) -> Result<Box<dyn Sink>, DispatcherError> {
    let name = config.sink_name().unwrap_or_default();
    match config {
        ReceiverConfig::Console(c) => Ok(Box::new(ConsoleSink::new(name, c.stream))),
        ReceiverConfig::File(c) => {
            let sink = FileSink::open(&name, &c.path, c.buffered)
                .map_err(|e| DispatcherError::sink_creation(&name, e.to_string()))?;
            Ok(Box::new(sink))
        }
        ReceiverConfig::Tracing(_) => Ok(Box::new(TracingSink::new(name))),
        ReceiverConfig::Udp(c) => {
            let sink = UdpSink::connect(&name, &c.addr)
                .map_err(|e| DispatcherError::sink_creation(&name, e.to_string()))?;
            Ok(Box::new(sink))
        }
        ReceiverConfig::Dispatcher(_) | ReceiverConfig::Filter(_) => Err(
            DispatcherError::sink_creation(config.kind(), "not a sink receiver"),
        ),
    }
}
