// ABOUTME: Phantom-typed cloud identifiers (CIDs) for compile-time type safety.
// ABOUTME: Prevents accidental swapping of disk and VM ids.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker types for phantom type parameters.
pub enum DiskMarker {}
pub enum VmMarker {}

/// An opaque, provider-assigned identifier.
///
/// The provider decides the format; this crate only compares and displays it.
/// The marker parameter keeps a `DiskCid` from being passed where a `VmCid`
/// is expected.
#[must_use = "CIDs reference provider resources and should not be ignored"]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }
}

// T is only a marker, so these impls must not require bounds on it.

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Id").field(&self.value).finish()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

pub type DiskCid = Id<DiskMarker>;
pub type VmCid = Id<VmMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_raw_value() {
        let cid = DiskCid::new("disk-1");
        assert_eq!(cid.to_string(), "disk-1");
        assert_eq!(format!("{cid:?}"), "Id(\"disk-1\")");
    }

    #[test]
    fn serializes_as_plain_string() {
        let cid = VmCid::new("vm-42");
        let json = serde_json::to_string(&cid).unwrap();
        assert_eq!(json, "\"vm-42\"");

        let back: VmCid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cid);
    }
}
