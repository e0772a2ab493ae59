// SPDX-License-Identifier: MIT OR Apache-2.0
//! Attribute values and host type tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage type reported by the host for an attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttrType {
    /// Boolean
    Bool,
    /// Integer (`long`, `short`, `byte`)
    Int,
    /// Enumeration index
    Enum,
    /// Single precision float
    Float,
    /// Double precision float (including linear/angle units)
    Double,
    /// Three single precision components (colors)
    Float3,
    /// Three double precision components (vectors)
    Double3,
    /// String data
    String,
    /// Message plug, carries no value
    Message,
    /// Any tag this crate does not model
    Other(String),
}

impl AttrType {
    /// Parse a host type tag
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "bool" => Self::Bool,
            "long" | "short" | "byte" | "int" => Self::Int,
            "enum" => Self::Enum,
            "float" => Self::Float,
            "double" | "doubleLinear" | "doubleAngle" | "time" => Self::Double,
            "float3" => Self::Float3,
            "double3" => Self::Double3,
            "string" => Self::String,
            "message" => Self::Message,
            other => Self::Other(other.to_string()),
        }
    }

    /// Host tag for this type
    pub fn tag(&self) -> &str {
        match self {
            Self::Bool => "bool",
            Self::Int => "long",
            Self::Enum => "enum",
            Self::Float => "float",
            Self::Double => "double",
            Self::Float3 => "float3",
            Self::Double3 => "double3",
            Self::String => "string",
            Self::Message => "message",
            Self::Other(tag) => tag,
        }
    }

    /// Whether this is a three-component vector type
    pub fn is_vector3(&self) -> bool {
        matches!(self, Self::Float3 | Self::Double3)
    }

    /// Whether this is a single numeric type
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Bool | Self::Int | Self::Enum | Self::Float | Self::Double
        )
    }

    /// Whether two tags describe the same storage family.
    ///
    /// Single and double precision variants are interchangeable, as are
    /// integers and enumerations.
    pub fn same_family(&self, other: &AttrType) -> bool {
        match (self, other) {
            (Self::Float | Self::Double, Self::Float | Self::Double) => true,
            (Self::Float3 | Self::Double3, Self::Float3 | Self::Double3) => true,
            (Self::Int | Self::Enum, Self::Int | Self::Enum) => true,
            _ => self == other,
        }
    }

    /// Check whether a value has the shape this type stores
    pub fn fits(&self, value: &AttrValue) -> bool {
        if self.is_vector3() {
            return matches!(value, AttrValue::Vector3(_));
        }
        if self.is_scalar() {
            return value.is_scalar();
        }
        match self {
            Self::String => matches!(value, AttrValue::String(_)),
            Self::Message => false,
            _ => true,
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl From<String> for AttrType {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<AttrType> for String {
    fn from(attr_type: AttrType) -> Self {
        attr_type.tag().to_string()
    }
}

/// Value read from or written to a node attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    /// Boolean
    Bool(bool),
    /// Integer or enumeration index
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Three-component vector or color
    Vector3([f64; 3]),
    /// String
    String(String),
    /// Packed list, as hosts return compound reads (e.g. `[(r, g, b)]`)
    List(Vec<AttrValue>),
}

impl AttrValue {
    /// Whether this is a single numeric value
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Bool(_) | Self::Int(_) | Self::Float(_))
    }

    /// Numeric value of a scalar
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// First logical component of a packed list, or the value itself.
    ///
    /// An empty list stays as it is.
    pub fn unpacked(&self) -> AttrValue {
        match self {
            Self::List(items) => items.first().cloned().unwrap_or_else(|| self.clone()),
            other => other.clone(),
        }
    }

    /// First scalar component, looking through vectors and packed lists
    pub fn first_scalar(&self) -> Option<f64> {
        match self {
            Self::Vector3(v) => Some(v[0]),
            Self::List(items) => items.first().and_then(AttrValue::first_scalar),
            other => other.as_f64(),
        }
    }

    /// Whether this is a negative scalar
    pub fn is_negative(&self) -> bool {
        self.as_f64().is_some_and(|v| v < 0.0)
    }

    /// Apply `f` to every numeric component, keeping the value's shape.
    ///
    /// Scalars come back as `Float`. Strings have no numeric components.
    pub fn map_components(&self, f: &impl Fn(f64) -> f64) -> Option<AttrValue> {
        match self {
            Self::Bool(_) | Self::Int(_) | Self::Float(_) => {
                self.as_f64().map(|v| Self::Float(f(v)))
            }
            Self::Vector3(v) => Some(Self::Vector3([f(v[0]), f(v[1]), f(v[2])])),
            Self::List(items) => items
                .iter()
                .map(|item| item.map_components(f))
                .collect::<Option<Vec<_>>>()
                .map(Self::List),
            Self::String(_) => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Vector3([x, y, z]) => write!(f, "({x}, {y}, {z})"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}
