use std::{
    fmt,
    hash::{DefaultHasher, Hash, Hasher},
};

use indexmap::IndexMap;
use ordered_float::OrderedFloat;

use crate::{instance::Instance, records::Kind, symbols::Symbol};

/// An integer range, inclusive unless `exclusive` is set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: i64,
    pub end: i64,
    pub exclusive: bool,
}

impl Range {
    pub fn inclusive(start: i64, end: i64) -> Self {
        Self {
            start,
            end,
            exclusive: false,
        }
    }

    pub fn exclusive(start: i64, end: i64) -> Self {
        Self {
            start,
            end,
            exclusive: true,
        }
    }

    /// Every integer the range covers, in order. Empty when `end` precedes
    /// `start`.
    pub fn offsets(&self) -> std::ops::Range<i64> {
        let end = if self.exclusive {
            self.end
        } else {
            self.end.saturating_add(1)
        };
        self.start..end.max(self.start)
    }
}

impl From<std::ops::Range<i64>> for Range {
    fn from(range: std::ops::Range<i64>) -> Self {
        Self::exclusive(range.start, range.end)
    }
}

impl From<std::ops::RangeInclusive<i64>> for Range {
    fn from(range: std::ops::RangeInclusive<i64>) -> Self {
        Self::inclusive(*range.start(), *range.end())
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dots = if self.exclusive { "..." } else { ".." };
        write!(f, "{}{dots}{}", self.start, self.end)
    }
}

#[derive(Clone, derive_more::Debug, derive_more::From)]
pub enum Value {
    /// Also the value of a member that was never assigned.
    #[from(ignore)]
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(OrderedFloat<f64>),
    String(String),
    Symbol(Symbol),
    Array(Vec<Value>),
    Hash(#[debug(skip)] IndexMap<Value, Value>),
    Range(Range),
    Kind(Kind),
    Struct(Instance),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Class name of the value, as reported in type errors.
    pub fn type_name(&self) -> String {
        match self {
            Self::Nil => "NilClass".to_string(),
            Self::Boolean(true) => "TrueClass".to_string(),
            Self::Boolean(false) => "FalseClass".to_string(),
            Self::Integer(_) => "Integer".to_string(),
            Self::Float(_) => "Float".to_string(),
            Self::String(_) => "String".to_string(),
            Self::Symbol(_) => "Symbol".to_string(),
            Self::Array(_) => "Array".to_string(),
            Self::Hash(_) => "Hash".to_string(),
            Self::Range(_) => "Range".to_string(),
            Self::Kind(_) => "Class".to_string(),
            Self::Struct(instance) => instance.kind().to_string(),
        }
    }

    pub fn inspect(&self) -> String {
        match self {
            Self::Nil => "nil".to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(OrderedFloat(f)) => {
                if f.is_finite() && f.fract() == 0.0 {
                    format!("{f:.1}")
                } else {
                    f.to_string()
                }
            }
            Self::String(s) => format!("{s:?}"),
            Self::Symbol(sym) => format!(":{sym}"),
            Self::Array(items) => {
                let items = items.iter().map(Value::inspect).collect::<Vec<_>>();
                format!("[{}]", items.join(", "))
            }
            Self::Hash(table) => {
                let entries = table
                    .iter()
                    .map(|(k, v)| format!("{}=>{}", k.inspect(), v.inspect()))
                    .collect::<Vec<_>>();
                format!("{{{}}}", entries.join(", "))
            }
            Self::Range(range) => range.to_string(),
            Self::Kind(kind) => kind.to_string(),
            Self::Struct(instance) => instance.inspect(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inspect())
    }
}

/// Strict (`eql?`) equality: `1` and `1.0` are different values.
impl PartialEq for Value {
    fn eq(&self, rhs: &Self) -> bool {
        match (self, rhs) {
            (Self::Nil, Self::Nil) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Hash(a), Self::Hash(b)) => a == b,
            (Self::Range(a), Self::Range(b)) => a == b,
            (Self::Kind(a), Self::Kind(b)) => a == b,
            (Self::Struct(a), Self::Struct(b)) => a.eql(b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Nil => (),
            Self::Boolean(b) => b.hash(state),
            Self::Integer(i) => i.hash(state),
            Self::Float(f) => f.hash(state),
            Self::String(s) => s.hash(state),
            Self::Symbol(sym) => sym.hash(state),
            Self::Array(items) => items.hash(state),
            Self::Hash(table) => {
                // Hash equality ignores insertion order, so must the hash.
                let combined = table.iter().fold(0u64, |acc, entry| {
                    let mut hasher = DefaultHasher::new();
                    entry.hash(&mut hasher);
                    acc.wrapping_add(hasher.finish())
                });
                table.len().hash(state);
                combined.hash(state);
            }
            Self::Range(range) => range.hash(state),
            Self::Kind(kind) => kind.hash(state),
            Self::Struct(instance) => instance.hash(state),
        }
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(OrderedFloat(f))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<std::ops::RangeInclusive<i64>> for Value {
    fn from(range: std::ops::RangeInclusive<i64>) -> Self {
        Self::Range(range.into())
    }
}

impl From<std::ops::Range<i64>> for Value {
    fn from(range: std::ops::Range<i64>) -> Self {
        Self::Range(range.into())
    }
}

impl From<IndexMap<Symbol, Value>> for Value {
    fn from(table: IndexMap<Symbol, Value>) -> Self {
        Self::Hash(
            table
                .into_iter()
                .map(|(k, v)| (Value::Symbol(k), v))
                .collect(),
        )
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Nil, Value::from)
    }
}
