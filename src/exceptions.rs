//! Exceptional situations and conditions

use std::fmt;

/// Which end of the valid offset range an index fell off of.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OffsetBound {
    TooSmall,
    TooLarge,
}

impl fmt::Display for OffsetBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall => write!(f, "too small"),
            Self::TooLarge => write!(f, "too large"),
        }
    }
}

/// Errors raised by struct kinds and their instances. Every variant maps onto
/// one of the runtime's exception classes, see [`Condition::class_name`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Condition {
    #[error("{message}")]
    Argument { message: String },
    #[error("offset {offset} {bound} for struct(size:{size})")]
    Index {
        offset: i64,
        size: usize,
        bound: OffsetBound,
    },
    #[error("no member '{member}' in struct")]
    Name { member: String },
    #[error("undefined method '{method}' for {receiver}")]
    NoMethod { method: String, receiver: String },
    #[error("no implicit conversion of {provided} into {expected}")]
    Type {
        provided: String,
        expected: &'static str,
    },
}

impl Condition {
    pub fn argument(message: impl fmt::Display) -> Self {
        Self::Argument {
            message: message.to_string(),
        }
    }

    pub fn base_cannot_define_members() -> Self {
        Self::argument("you cannot define attributes to the Struct class")
    }

    pub fn base_has_no_members() -> Self {
        Self::argument("the Struct class has no members")
    }

    pub fn base_cannot_be_instantiated() -> Self {
        Self::argument("the Struct class cannot be instantiated")
    }

    pub fn duplicate_member(member: impl fmt::Display) -> Self {
        Self::argument(format!("duplicate member: {member}"))
    }

    pub fn sealed(kind: impl fmt::Display, member: impl fmt::Display) -> Self {
        Self::argument(format!(
            "cannot add member '{member}' to {kind} after it has been instantiated"
        ))
    }

    pub fn struct_size_differs(expected: usize, provided: usize) -> Self {
        Self::argument(format!(
            "struct size differs (expected {expected}, provided {provided})"
        ))
    }

    pub fn invalid_offset(offset: i64, size: usize) -> Self {
        let bound = if offset < 0 {
            OffsetBound::TooSmall
        } else {
            OffsetBound::TooLarge
        };
        Self::Index {
            offset,
            size,
            bound,
        }
    }

    pub fn no_member(member: impl fmt::Display) -> Self {
        Self::Name {
            member: member.to_string(),
        }
    }

    pub fn no_method(method: impl fmt::Display, receiver: impl fmt::Display) -> Self {
        Self::NoMethod {
            method: method.to_string(),
            receiver: receiver.to_string(),
        }
    }

    /// For when a key or selector is not something that can be turned into
    /// an offset.
    pub fn no_implicit_conversion(provided: &str) -> Self {
        Self::Type {
            provided: provided.to_string(),
            expected: "Integer",
        }
    }

    /// The runtime exception class this condition is raised as.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Argument { .. } => "ArgumentError",
            Self::Index { .. } => "IndexError",
            Self::Name { .. } => "NameError",
            Self::NoMethod { .. } => "NoMethodError",
            Self::Type { .. } => "TypeError",
        }
    }
}
