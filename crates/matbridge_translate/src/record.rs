// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene-independent half of node translation.
//!
//! Values read from the source node are collected into a [`CommonRecord`]
//! keyed by common attribute name. The record is then matched against the
//! destination table to produce [`Assignment`]s. When the host rejects an
//! assignment, [`Coercion::choose`] picks the one fallback to try.

use crate::schema::{DestinationNodeSchema, MappingEntry};
use indexmap::IndexMap;
use matbridge_graph::{AttrType, AttrValue};
use serde::{Deserialize, Serialize};

/// A value captured from the source scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeValueRecord {
    /// Value after the mapping rule
    pub value: AttrValue,
    /// Storage type of the source attribute
    pub source_type: AttrType,
}

/// A node expressed in common attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonRecord {
    /// Common node type
    pub common_type: String,
    /// Values by common attribute name
    pub fields: IndexMap<String, AttributeValueRecord>,
}

impl CommonRecord {
    /// Create an empty record
    pub fn new(common_type: impl Into<String>) -> Self {
        Self {
            common_type: common_type.into(),
            fields: IndexMap::new(),
        }
    }

    /// Store a common value, replacing an earlier one of the same name
    pub fn insert(&mut self, common: impl Into<String>, value: AttrValue, source_type: AttrType) {
        self.fields.insert(
            common.into(),
            AttributeValueRecord { value, source_type },
        );
    }

    /// Get a common value
    pub fn get(&self, common: &str) -> Option<&AttributeValueRecord> {
        self.fields.get(common)
    }

    /// Apply every entry of one source attribute to its raw value.
    ///
    /// Returns the common names whose transform could not handle the value.
    pub fn add_source_value(
        &mut self,
        entries: &[MappingEntry],
        raw: &AttrValue,
        source_type: &AttrType,
    ) -> Vec<String> {
        let mut failed = Vec::new();
        for entry in entries {
            match entry.resolve(raw) {
                Some(value) => self.insert(entry.common.clone(), value, source_type.clone()),
                None => failed.push(entry.common.clone()),
            }
        }
        failed
    }

    /// Number of common values
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record holds no values
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One destination attribute write
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Common attribute the value comes from
    pub common: String,
    /// Destination socket
    pub socket: String,
    /// Value to write
    pub value: AttrValue,
    /// Storage type of the source attribute
    pub source_type: AttrType,
}

/// Writes for every common value the destination table knows, in record order
pub fn plan_assignments(record: &CommonRecord, destination: &DestinationNodeSchema) -> Vec<Assignment> {
    record
        .fields
        .iter()
        .filter_map(|(common, field)| {
            destination.native(common).map(|socket| Assignment {
                common: common.clone(),
                socket: socket.to_string(),
                value: field.value.clone(),
                source_type: field.source_type.clone(),
            })
        })
        .collect()
}

/// Fallback write after the host rejected a value
#[derive(Debug, Clone, PartialEq)]
pub enum Coercion {
    /// Scalar repeated into every component, declared as the vector type
    Broadcast {
        /// Three equal components
        value: AttrValue,
        /// Destination vector type
        vector_type: AttrType,
    },
    /// First component of a vector source
    FirstComponent(AttrValue),
    /// Absolute value of a negative scalar
    Absolute(AttrValue),
    /// Original value declared as the destination type
    Explicit {
        /// Unchanged value
        value: AttrValue,
        /// Destination type
        attr_type: AttrType,
    },
}

impl Coercion {
    /// Pick the fallback for a rejected value.
    ///
    /// Rules are tried in order and exactly one is chosen:
    /// 1. vector destination and scalar value: broadcast
    /// 2. scalar destination and vector source type: first component
    /// 3. scalar destination and negative value: absolute value
    /// 4. anything else: retry declaring the destination type
    pub fn choose(value: &AttrValue, source_type: &AttrType, destination_type: &AttrType) -> Self {
        let scalar = value.unpacked().as_f64();

        if destination_type.is_vector3() {
            if let Some(x) = scalar {
                return Self::Broadcast {
                    value: AttrValue::Vector3([x, x, x]),
                    vector_type: destination_type.clone(),
                };
            }
        }

        if destination_type.is_scalar() {
            if source_type.is_vector3() {
                if let Some(first) = value.first_scalar() {
                    return Self::FirstComponent(AttrValue::Float(first));
                }
            }
            if let Some(x) = scalar.filter(|x| *x < 0.0) {
                return Self::Absolute(AttrValue::Float(x.abs()));
            }
        }

        Self::Explicit {
            value: value.clone(),
            attr_type: destination_type.clone(),
        }
    }

    /// Value to write
    pub fn value(&self) -> &AttrValue {
        match self {
            Self::Broadcast { value, .. }
            | Self::FirstComponent(value)
            | Self::Absolute(value)
            | Self::Explicit { value, .. } => value,
        }
    }

    /// Type to declare with the write
    pub fn explicit_type(&self) -> Option<&AttrType> {
        match self {
            Self::Broadcast { vector_type, .. } => Some(vector_type),
            Self::Explicit { attr_type, .. } => Some(attr_type),
            Self::FirstComponent(_) | Self::Absolute(_) => None,
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Broadcast { .. } => "broadcast",
            Self::FirstComponent(_) => "first component",
            Self::Absolute(_) => "absolute value",
            Self::Explicit { .. } => "explicit type",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;

    #[test]
    fn test_record_applies_every_entry() {
        let mut record = CommonRecord::new("surfaceShader");
        let entries = [
            MappingEntry::copy("scatter"),
            MappingEntry::transform("extinction", Transform::OneMinus),
        ];
        let failed = record.add_source_value(&entries, &AttrValue::Float(0.3), &AttrType::Float);

        assert!(failed.is_empty());
        assert_eq!(record.get("scatter").unwrap().value, AttrValue::Float(0.3));
        match record.get("extinction").unwrap().value {
            AttrValue::Float(v) => assert!((v - 0.7).abs() < 1e-9),
            ref other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_failed_transform_reported() {
        let mut record = CommonRecord::new("textureFileNode");
        let entries = [MappingEntry::transform("gain", Transform::OneMinus)];
        let failed = record.add_source_value(
            &entries,
            &AttrValue::String("tex.png".into()),
            &AttrType::String,
        );
        assert_eq!(failed, vec!["gain".to_string()]);
        assert!(record.is_empty());
    }

    #[test]
    fn test_plan_skips_unknown_common_names() {
        let mut record = CommonRecord::new("surfaceShader");
        record.insert("sheen", AttrValue::Float(0.5), AttrType::Float);
        record.insert("caustics", AttrValue::Bool(true), AttrType::Bool);
        let destination = DestinationNodeSchema::new("PxrSurface").rename("sheen", "fuzzGain");

        let plan = plan_assignments(&record, &destination);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].socket, "fuzzGain");
        assert_eq!(plan[0].common, "sheen");
    }

    #[test]
    fn test_choose_broadcast() {
        let c = Coercion::choose(&AttrValue::Float(0.25), &AttrType::Float, &AttrType::Float3);
        assert_eq!(c.value(), &AttrValue::Vector3([0.25, 0.25, 0.25]));
        assert_eq!(c.explicit_type(), Some(&AttrType::Float3));
    }

    #[test]
    fn test_choose_first_component() {
        let value = AttrValue::Vector3([0.4, 0.5, 0.6]);
        let c = Coercion::choose(&value, &AttrType::Float3, &AttrType::Float);
        assert_eq!(c, Coercion::FirstComponent(AttrValue::Float(0.4)));
        assert_eq!(c.explicit_type(), None);
    }

    #[test]
    fn test_choose_absolute() {
        let c = Coercion::choose(&AttrValue::Float(-2.0), &AttrType::Float, &AttrType::Double);
        assert_eq!(c, Coercion::Absolute(AttrValue::Float(2.0)));
    }

    #[test]
    fn test_choose_explicit_otherwise() {
        let value = AttrValue::String("tex.png".into());
        let c = Coercion::choose(&value, &AttrType::String, &AttrType::String);
        assert_eq!(c.explicit_type(), Some(&AttrType::String));
        assert_eq!(c.value(), &value);

        // A vector into a vector destination has nothing to broadcast
        let vector = AttrValue::Vector3([1.0, 2.0, 3.0]);
        let c = Coercion::choose(&vector, &AttrType::Float3, &AttrType::Double3);
        assert_eq!(c.name(), "explicit type");
    }
}
