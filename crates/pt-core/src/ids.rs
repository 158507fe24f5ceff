use core::fmt;
use core::num::NonZeroU32;
use core::str::FromStr;

use crate::error::PtError;

/// Compact, stable index of a component instance within one description.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<InstanceIdx>` to be pointer-optimized
///
/// The index is the position of the component entry in the description, so
/// ordering by index is ordering by first appearance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceIdx(NonZeroU32);

impl InstanceIdx {
    /// Create an index from a 0-based position by storing position+1.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Recover the 0-based position.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// The 0-based position as `usize`, for slice indexing.
    pub fn as_usize(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for InstanceIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceIdx({})", self.index())
    }
}

impl fmt::Display for InstanceIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Identity of a component instance: identifiers are unique per type tag only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceKey {
    pub type_tag: String,
    pub id: String,
}

impl InstanceKey {
    pub fn new(type_tag: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.type_tag, self.id)
    }
}

/// Endpoint of a connection as written in a description: `[type_tag:]id.port`.
///
/// The type tag is optional; it is only needed when the same identifier is
/// used by instances of different types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortRef {
    pub type_tag: Option<String>,
    pub instance: String,
    pub port: String,
}

impl PortRef {
    pub fn new(instance: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            type_tag: None,
            instance: instance.into(),
            port: port.into(),
        }
    }

    pub fn qualified(
        type_tag: impl Into<String>,
        instance: impl Into<String>,
        port: impl Into<String>,
    ) -> Self {
        Self {
            type_tag: Some(type_tag.into()),
            instance: instance.into(),
            port: port.into(),
        }
    }

    /// Whether this reference designates the given instance.
    pub fn matches(&self, key: &InstanceKey) -> bool {
        self.instance == key.id && self.type_tag.as_ref().is_none_or(|t| *t == key.type_tag)
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_tag {
            Some(tag) => write!(f, "{}:{}.{}", tag, self.instance, self.port),
            None => write!(f, "{}.{}", self.instance, self.port),
        }
    }
}

impl FromStr for PortRef {
    type Err = PtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| PtError::InvalidPortRef {
            text: s.to_string(),
            reason,
        };

        let text = s.trim();
        let (type_tag, rest) = match text.split_once(':') {
            Some((tag, rest)) => (Some(tag), rest),
            None => (None, text),
        };
        if rest.contains(':') {
            return Err(invalid("more than one ':' separator"));
        }
        let (instance, port) = rest
            .split_once('.')
            .ok_or_else(|| invalid("expected '<id>.<port>'"))?;
        if port.contains('.') {
            return Err(invalid("more than one '.' separator"));
        }
        if type_tag.is_some_and(str::is_empty) {
            return Err(invalid("empty type tag"));
        }
        if instance.is_empty() {
            return Err(invalid("empty instance id"));
        }
        if port.is_empty() {
            return Err(invalid("empty port name"));
        }

        Ok(Self {
            type_tag: type_tag.map(str::to_string),
            instance: instance.to_string(),
            port: port.to_string(),
        })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PortRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PortRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idx_round_trip_index() {
        for i in [0_u32, 1, 2, 42, 10_000] {
            let idx = InstanceIdx::from_index(i);
            assert_eq!(idx.index(), i);
            assert_eq!(idx.as_usize(), i as usize);
        }
    }

    #[test]
    fn option_idx_is_small() {
        assert_eq!(
            core::mem::size_of::<InstanceIdx>(),
            core::mem::size_of::<Option<InstanceIdx>>()
        );
    }

    #[test]
    fn parse_unqualified_port_ref() {
        let r: PortRef = "dc_bus_1.voltage_out".parse().unwrap();
        assert_eq!(r, PortRef::new("dc_bus_1", "voltage_out"));
        assert_eq!(r.to_string(), "dc_bus_1.voltage_out");
    }

    #[test]
    fn parse_qualified_port_ref() {
        let r: PortRef = "battery_pack:pack_1.voltage_out".parse().unwrap();
        assert_eq!(r.type_tag.as_deref(), Some("battery_pack"));
        assert_eq!(r.instance, "pack_1");
        assert_eq!(r.port, "voltage_out");
        assert!(r.matches(&InstanceKey::new("battery_pack", "pack_1")));
        assert!(!r.matches(&InstanceKey::new("dc_bus", "pack_1")));
    }

    #[test]
    fn reject_malformed_port_refs() {
        for text in ["", "no_port", "a.b.c", ":x.y", "a:b:c.d", ".port", "id."] {
            let err = text.parse::<PortRef>().unwrap_err();
            assert!(
                matches!(err, PtError::InvalidPortRef { .. }),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn instance_key_display() {
        let key = InstanceKey::new("pmsm", "motor_1");
        assert_eq!(key.to_string(), "pmsm:motor_1");
    }
}
