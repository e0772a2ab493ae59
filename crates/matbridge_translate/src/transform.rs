// SPDX-License-Identifier: MIT OR Apache-2.0
//! Value transforms applied while mapping a native attribute to a common one.

use matbridge_graph::AttrValue;
use serde::{Deserialize, Serialize};

/// Pure value transform registered in code.
///
/// Returning `None` means the value cannot be mapped; the field is skipped.
pub type TransformFn = fn(&AttrValue) -> Option<AttrValue>;

/// Transform attached to a mapping entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Transform {
    /// `1 - x` on every component
    OneMinus,
    /// `x + offset` when `x < limit`, otherwise `x`
    OffsetBelow {
        /// Added amount
        offset: f64,
        /// Exclusive upper bound for the offset to apply
        limit: f64,
    },
    /// Multiply every component
    Scale(f64),
    /// First scalar component of a vector or packed value
    FirstComponent,
    /// Function registered in code, not expressible in schema files
    #[serde(skip)]
    Custom(TransformFn),
}

impl Transform {
    /// Apply the transform to a raw attribute value
    pub fn apply(&self, value: &AttrValue) -> Option<AttrValue> {
        match self {
            Self::OneMinus => value.map_components(&|x| 1.0 - x),
            Self::Scale(factor) => value.map_components(&|x| x * factor),
            Self::OffsetBelow { offset, limit } => {
                let x = value.unpacked().as_f64()?;
                Some(AttrValue::Float(if x < *limit { x + offset } else { x }))
            }
            Self::FirstComponent => value.first_scalar().map(AttrValue::Float),
            Self::Custom(f) => f(value),
        }
    }
}
