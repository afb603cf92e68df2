//! Fault-tolerant lookup of typed fields inside untyped documents.
//!
//! Every field of the simulation configuration is located by a [`FieldPath`]
//! and read with [`FieldResolver::resolve`]. Callers only decide one thing:
//! whether the field has a [`Fallback::Default`]. A missing or mistyped field
//! then either becomes the default (and a recorded [`LoadWarning`]) or a
//! [`ConfigurationError`].

use std::fmt::{self, Debug, Display};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use super::error::{ConfigurationError, LoadWarning};


/// A single step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Key of a mapping.
    Key(String),
    /// Position in a sequence.
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_owned())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}


/// Location of a value inside a nested document, e.g. `ports[0].width`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns a new path with `segment` appended.
    #[must_use = "function returns the extended path"]
    pub fn join<S: Into<PathSegment>>(&self, segment: S) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());

        Self { segments }
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "<root>");
        }

        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if position == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }

        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}


/// Builds a [`FieldPath`] from keys (`&str`) and indices (`usize`).
///
/// ```
/// # use ems_config::field_path;
/// let index: usize = 2;
/// assert_eq!(field_path!["layers", index, "type"].to_string(), "layers[2].type");
/// ```
#[macro_export]
macro_rules! field_path {
    ($($segment:expr),* $(,)?) => {{
        let segments: ::std::vec::Vec<$crate::simulation::resolver::PathSegment> =
            ::std::vec![$($crate::simulation::resolver::PathSegment::from($segment)),*];
        $crate::simulation::resolver::FieldPath::from_segments(segments)
    }};
}


/// Runtime kind of a document value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Sequence,
    Mapping,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(number) if number.is_i64() || number.is_u64() => ValueKind::Integer,
            Value::Number(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Sequence,
            Value::Object(_) => ValueKind::Mapping,
        }
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Sequence => "sequence",
            ValueKind::Mapping => "mapping",
        };

        f.write_str(name)
    }
}


/// The set of value kinds a field accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedType {
    Boolean,
    Integer,
    /// Integer or float.
    Numeric,
    String,
    Sequence,
    Mapping,
    /// The inner type, or null.
    Nullable(Box<ExpectedType>),
}

impl ExpectedType {
    pub fn accepts(&self, kind: ValueKind) -> bool {
        match (self, kind) {
            (ExpectedType::Boolean, ValueKind::Boolean)
            | (ExpectedType::Integer, ValueKind::Integer)
            | (ExpectedType::Numeric, ValueKind::Integer | ValueKind::Float)
            | (ExpectedType::String, ValueKind::String)
            | (ExpectedType::Sequence, ValueKind::Sequence)
            | (ExpectedType::Mapping, ValueKind::Mapping)
            | (ExpectedType::Nullable(_), ValueKind::Null) => true,
            (ExpectedType::Nullable(inner), kind) => inner.accepts(kind),
            _ => false,
        }
    }
}

impl Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedType::Boolean => f.write_str("boolean"),
            ExpectedType::Integer => f.write_str("integer"),
            ExpectedType::Numeric => f.write_str("integer or float"),
            ExpectedType::String => f.write_str("string"),
            ExpectedType::Sequence => f.write_str("sequence"),
            ExpectedType::Mapping => f.write_str("mapping"),
            ExpectedType::Nullable(inner) => write!(f, "{inner} or null"),
        }
    }
}


/// A Rust type that can be read out of a document value.
pub trait FieldValue<'a>: Sized {
    fn expected() -> ExpectedType;

    /// Converts an already accepted value. Returns `None` if the value
    /// does not fit the Rust type (e.g. an integer beyond `i64::MAX`).
    fn from_value(value: &'a Value) -> Option<Self>;
}

impl<'a> FieldValue<'a> for bool {
    fn expected() -> ExpectedType {
        ExpectedType::Boolean
    }

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_bool()
    }
}

impl<'a> FieldValue<'a> for i64 {
    fn expected() -> ExpectedType {
        ExpectedType::Integer
    }

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_i64()
    }
}

impl<'a> FieldValue<'a> for f64 {
    fn expected() -> ExpectedType {
        ExpectedType::Numeric
    }

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_f64()
    }
}

impl<'a> FieldValue<'a> for String {
    fn expected() -> ExpectedType {
        ExpectedType::String
    }

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl<'a> FieldValue<'a> for &'a str {
    fn expected() -> ExpectedType {
        ExpectedType::String
    }

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_str()
    }
}

impl<'a> FieldValue<'a> for &'a [Value] {
    fn expected() -> ExpectedType {
        ExpectedType::Sequence
    }

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_array().map(Vec::as_slice)
    }
}

impl<'a> FieldValue<'a> for &'a Map<String, Value> {
    fn expected() -> ExpectedType {
        ExpectedType::Mapping
    }

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object()
    }
}

impl<'a, T> FieldValue<'a> for Option<T>
where
    T: FieldValue<'a>,
{
    fn expected() -> ExpectedType {
        ExpectedType::Nullable(Box::new(T::expected()))
    }

    fn from_value(value: &'a Value) -> Option<Self> {
        if value.is_null() {
            return Some(None);
        }

        T::from_value(value).map(Some)
    }
}


/// What to do when a field is missing or has the wrong type.
#[derive(Debug, Clone, PartialEq)]
pub enum Fallback<T> {
    /// The field is mandatory, fail the load.
    Required,
    /// Use this value and record a warning.
    Default(T),
}


enum Lookup<T> {
    Found(T),
    NotFound,
    IncorrectType {
        actual: ValueKind,
        expected: ExpectedType,
    },
    /// Right kind, but not representable, e.g. an integer above `i64::MAX`.
    OutOfRange(String),
}

impl<T> Lookup<T> {
    fn into_error(self, path: &FieldPath) -> Option<ConfigurationError> {
        match self {
            Lookup::Found(_) => None,
            Lookup::NotFound => Some(ConfigurationError::MissingField { path: path.clone() }),
            Lookup::IncorrectType { actual, expected } => Some(ConfigurationError::IncorrectType {
                path: path.clone(),
                actual,
                expected,
            }),
            Lookup::OutOfRange(value) => Some(ConfigurationError::InvalidValue {
                path: path.clone(),
                value,
                reason: OUT_OF_RANGE_REASON,
            }),
        }
    }
}

const OUT_OF_RANGE_REASON: &str = "out of range for a 64-bit signed integer";


/// Walks `path` from `document`. Index segments only match sequences and key
/// segments only match mappings; anything else means the path does not exist.
pub fn lookup<'a>(document: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    let mut current = document;

    for segment in path.segments() {
        current = match (segment, current) {
            (PathSegment::Key(key), Value::Object(mapping)) => mapping.get(key)?,
            (PathSegment::Index(index), Value::Array(sequence)) => sequence.get(*index)?,
            _ => return None,
        };
    }

    Some(current)
}

fn typed_lookup<'a, T>(document: &'a Value, path: &FieldPath) -> Lookup<T>
where
    T: FieldValue<'a>,
{
    let Some(value) = lookup(document, path) else {
        return Lookup::NotFound;
    };

    let actual = ValueKind::of(value);
    let expected = T::expected();

    if !expected.accepts(actual) {
        return Lookup::IncorrectType { actual, expected };
    }

    match T::from_value(value) {
        Some(resolved) => Lookup::Found(resolved),
        None => Lookup::OutOfRange(value.to_string()),
    }
}


/// Resolves fields and keeps track of every warning emitted while doing so.
#[derive(Debug, Default)]
pub struct FieldResolver {
    warnings: Vec<LoadWarning>,
}

impl FieldResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the value at `path`, checking it against `T`'s expected type.
    ///
    /// Missing and mistyped values are handled the same way: with
    /// [`Fallback::Required`] an error naming the path is returned, with
    /// [`Fallback::Default`] the default is returned and one warning is recorded.
    pub fn resolve<'a, T>(
        &mut self,
        document: &'a Value,
        path: &FieldPath,
        fallback: Fallback<T>,
    ) -> Result<T, ConfigurationError>
    where
        T: FieldValue<'a> + Debug,
    {
        let lookup = typed_lookup::<T>(document, path);

        match (lookup, fallback) {
            (Lookup::Found(value), _) => Ok(value),
            (missed, Fallback::Default(default)) => Ok(self.substitute(missed, path, default)),
            (missed, Fallback::Required) => Err(missed
                .into_error(path)
                .unwrap_or_else(|| ConfigurationError::MissingField { path: path.clone() })),
        }
    }

    /// Shorthand for [`Self::resolve`] with [`Fallback::Required`].
    pub fn require<'a, T>(
        &mut self,
        document: &'a Value,
        path: &FieldPath,
    ) -> Result<T, ConfigurationError>
    where
        T: FieldValue<'a> + Debug,
    {
        self.resolve(document, path, Fallback::Required)
    }

    /// Shorthand for [`Self::resolve`] with [`Fallback::Default`], which cannot fail.
    pub fn or_default<'a, T>(&mut self, document: &'a Value, path: &FieldPath, default: T) -> T
    where
        T: FieldValue<'a> + Debug,
    {
        match typed_lookup::<T>(document, path) {
            Lookup::Found(value) => value,
            missed => self.substitute(missed, path, default),
        }
    }

    fn substitute<T: Debug>(&mut self, missed: Lookup<T>, path: &FieldPath, default: T) -> T {
        let warning = match missed {
            Lookup::IncorrectType { actual, expected } => LoadWarning::DefaultUsedForIncorrectType {
                path: path.clone(),
                actual,
                expected,
                default: format!("{default:?}"),
            },
            Lookup::OutOfRange(value) => LoadWarning::DefaultUsedForInvalidValue {
                path: path.clone(),
                value,
                reason: OUT_OF_RANGE_REASON,
                default: format!("{default:?}"),
            },
            _ => LoadWarning::DefaultUsed {
                path: path.clone(),
                default: format!("{default:?}"),
            },
        };

        self.record_warning(warning);
        default
    }

    pub(crate) fn record_warning(&mut self, warning: LoadWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Every warning recorded so far, in order.
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<LoadWarning> {
        self.warnings
    }
}
