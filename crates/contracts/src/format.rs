//! Formatter trait and the built-in pattern formatter

use chrono::Local;
use std::fmt;
use std::sync::Arc;

use crate::{ContractError, LogContext, LogLevel};

/// Pattern used when a configuration does not name one
pub const DEFAULT_PATTERN: &str = "%Time [%Lev] %Msg%n";

/// Turns a log event into the text a sink receives.
///
/// Implementations must be pure with respect to the event: the same input
/// yields the same output (up to clock-derived verbs). `Display` provides the
/// human-readable description used by tree diagnostics.
pub trait Formatter: fmt::Display + Send + Sync {
    /// Render one event
    fn format(&self, message: &str, level: LogLevel, context: &LogContext) -> String;
}

/// Formatter shared read-only across a whole dispatch tree
pub type SharedFormatter = Arc<dyn Formatter>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Message,
    Level,
    LevelShort,
    Time,
    Date,
    File,
    Line,
    Function,
    Newline,
}

// Longest verb first so `%Level` is not read as `%Lev` + "el".
const VERBS: &[(&str, Segment)] = &[
    ("Level", Segment::Level),
    ("Lev", Segment::LevelShort),
    ("Msg", Segment::Message),
    ("Time", Segment::Time),
    ("Date", Segment::Date),
    ("File", Segment::File),
    ("Line", Segment::Line),
    ("Func", Segment::Function),
    ("n", Segment::Newline),
];

/// Formatter compiled from a `%Verb` pattern.
///
/// Supported verbs: `%Msg`, `%Level`, `%Lev`, `%Time`, `%Date`, `%File`,
/// `%Line`, `%Func`, `%n` and `%%` for a literal percent sign.
///
/// # Examples
/// ```
/// use contracts::{Formatter, LogContext, LogLevel, PatternFormatter};
///
/// let f = PatternFormatter::new("[%Lev] %Msg").unwrap();
/// let out = f.format("ready", LogLevel::Info, &LogContext::default());
/// assert_eq!(out, "[Inf] ready");
/// ```
#[derive(Debug, Clone)]
pub struct PatternFormatter {
    pattern: String,
    segments: Vec<Segment>,
}

impl PatternFormatter {
    /// Compile a pattern
    ///
    /// # Errors
    /// Returns `InvalidFormat` for an unknown verb or a dangling `%`.
    pub fn new(pattern: impl Into<String>) -> Result<Self, ContractError> {
        let pattern = pattern.into();
        let segments = compile(&pattern)?;
        Ok(Self { pattern, segments })
    }

    /// Wrap into a `SharedFormatter`
    pub fn shared(self) -> SharedFormatter {
        Arc::new(self)
    }

    /// Source pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Default for PatternFormatter {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            segments: vec![
                Segment::Time,
                Segment::Literal(" [".to_string()),
                Segment::LevelShort,
                Segment::Literal("] ".to_string()),
                Segment::Message,
                Segment::Newline,
            ],
        }
    }
}

fn compile(pattern: &str) -> Result<Vec<Segment>, ContractError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = pattern;

    while let Some(pos) = rest.find('%') {
        literal.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(stripped) = after.strip_prefix('%') {
            literal.push('%');
            rest = stripped;
            continue;
        }

        let (name, segment) = VERBS
            .iter()
            .find(|(name, _)| after.starts_with(name))
            .ok_or_else(|| {
                let shown: String = after.chars().take(8).collect();
                if shown.is_empty() {
                    ContractError::invalid_format(pattern, "dangling '%' at end of pattern")
                } else {
                    ContractError::invalid_format(pattern, format!("unknown verb '%{shown}'"))
                }
            })?;

        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(segment.clone());
        rest = &after[name.len()..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

impl Formatter for PatternFormatter {
    fn format(&self, message: &str, level: LogLevel, context: &LogContext) -> String {
        let mut out = String::with_capacity(message.len() + 32);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Message => out.push_str(message),
                Segment::Level => out.push_str(level.display_name()),
                Segment::LevelShort => out.push_str(level.short_name()),
                Segment::Time => out.push_str(&Local::now().format("%H:%M:%S").to_string()),
                Segment::Date => out.push_str(&Local::now().format("%Y-%m-%d").to_string()),
                Segment::File => out.push_str(context.short_file()),
                Segment::Line => out.push_str(&context.line.to_string()),
                Segment::Function => out.push_str(context.function.as_deref().unwrap_or("")),
                Segment::Newline => out.push('\n'),
            }
        }
        out
    }
}

impl fmt::Display for PatternFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pattern '{}'", self.pattern.escape_debug())
    }
}
