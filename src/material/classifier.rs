//! Vector property classification.
//!
//! Extension entries store texture UV transforms in the same table as plain
//! vectors. A four-float entry is a texture transform exactly when the entry
//! also binds a texture under the same property name.

use cgmath::{Vector2, Vector4};

use crate::data_structures::material::MaterialExtensionEntry;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VectorProperty {
    PlainVector(Vector4<f32>),
    TextureTransform {
        offset: Vector2<f32>,
        scale: Vector2<f32>,
    },
}

/// Classifies `value`, stored under `key` in `entry`.
pub fn classify(entry: &MaterialExtensionEntry, key: &str, value: [f32; 4]) -> VectorProperty {
    let [x, y, z, w] = value;
    if entry.texture_properties.contains_key(key) {
        VectorProperty::TextureTransform {
            offset: Vector2::new(x, y),
            scale: Vector2::new(z, w),
        }
    } else {
        VectorProperty::PlainVector(Vector4::new(x, y, z, w))
    }
}

/// Looks up and classifies the vector property `key` of `entry`, or `None`
/// when the entry has no vector under that key.
pub fn classify_property(entry: &MaterialExtensionEntry, key: &str) -> Option<VectorProperty> {
    entry
        .vector_properties
        .get(key)
        .map(|value| classify(entry, key, *value))
}
