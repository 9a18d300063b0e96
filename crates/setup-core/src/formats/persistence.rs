//! # Saved Configuration Format
//!
//! Binary encoding of a saved build.
//!
//! Format: 5-byte header followed by a postcard payload.
//! - 4 bytes: magic (`USCF`)
//! - 1 byte: version
//!
//! Size, header and version are all checked before the payload is decoded.

use crate::primitives::{FORMAT_VERSION, MAGIC_BYTES};
use crate::{CategoryId, Component, ComponentId, Price, SetupError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upper bound on an encoded configuration. Seven components with their
/// specification maps are a few kilobytes; anything near this is corrupt.
pub const MAX_CONFIGURATION_PAYLOAD_SIZE: usize = 1024 * 1024;

const HEADER_SIZE: usize = 5;

// =============================================================================
// SAVED CONFIGURATION
// =============================================================================

/// A named snapshot of a build, as handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedConfiguration {
    pub name: String,
    pub components: BTreeMap<CategoryId, Component>,
    #[serde(default)]
    pub notes: BTreeMap<ComponentId, String>,
    pub total_price: Price,
}

impl SavedConfiguration {
    /// Category → component id view; what a round trip must preserve.
    #[must_use]
    pub fn component_ids(&self) -> BTreeMap<CategoryId, ComponentId> {
        self.components
            .iter()
            .map(|(category, c)| (*category, c.id.clone()))
            .collect()
    }

    #[must_use]
    pub fn summary(&self) -> ConfigurationSummary {
        ConfigurationSummary {
            name: self.name.clone(),
            component_count: self.components.len(),
            total_price: self.total_price,
        }
    }
}

/// List-view entry for a saved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationSummary {
    pub name: String,
    pub component_count: usize,
    pub total_price: Price,
}

// =============================================================================
// HEADER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl PersistenceHeader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *MAGIC_BYTES,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        if &self.magic != MAGIC_BYTES {
            return Err(SetupError::DeserializationError(
                "invalid magic bytes".to_string(),
            ));
        }
        if self.version != FORMAT_VERSION {
            return Err(SetupError::DeserializationError(format!(
                "unsupported version: {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SetupError> {
        let Some(head) = bytes.get(..HEADER_SIZE) else {
            return Err(SetupError::DeserializationError(
                "header too short".to_string(),
            ));
        };
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&head[..4]);
        Ok(Self {
            magic,
            version: head[4],
        })
    }
}

impl Default for PersistenceHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ENCODE / DECODE
// =============================================================================

/// Encode a saved configuration (header + payload).
pub fn configuration_to_bytes(config: &SavedConfiguration) -> Result<Vec<u8>, SetupError> {
    let payload =
        postcard::to_stdvec(config).map_err(|e| SetupError::SerializationError(e.to_string()))?;
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&PersistenceHeader::new().to_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decode a saved configuration, validating size and header first.
pub fn configuration_from_bytes(bytes: &[u8]) -> Result<SavedConfiguration, SetupError> {
    if bytes.len() > MAX_CONFIGURATION_PAYLOAD_SIZE {
        return Err(SetupError::DeserializationError(format!(
            "data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_CONFIGURATION_PAYLOAD_SIZE
        )));
    }
    let header = PersistenceHeader::from_bytes(bytes)?;
    header.validate()?;
    postcard::from_bytes(&bytes[HEADER_SIZE..]).map_err(|e| {
        SetupError::DeserializationError(format!("failed to decode configuration: {e}"))
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SpecValue;

    fn sample() -> SavedConfiguration {
        let cpu = Component::new("cpu-7800x3d", CategoryId::Cpu, "Ryzen 7 7800X3D", Price(44_900))
            .with_spec("socket", "AM5")
            .with_spec("tdp", 120)
            .with_spec("boostClock", 5.0)
            .with_spec("features", vec!["3D V-Cache".to_string(), "Unlocked".to_string()])
            .with_rating(4.8);
        let gpu = Component::new("gpu-4070", CategoryId::Gpu, "RTX 4070", Price(59_900))
            .with_compat("minPsu", "650W");
        let mut notes = BTreeMap::new();
        notes.insert(ComponentId::new("gpu-4070"), "white edition".to_string());
        SavedConfiguration {
            name: "Workstation".to_string(),
            components: [(CategoryId::Cpu, cpu), (CategoryId::Gpu, gpu)].into(),
            notes,
            total_price: Price(104_800),
        }
    }

    #[test]
    fn encode_decode_preserves_everything() {
        let saved = sample();
        let bytes = configuration_to_bytes(&saved).expect("encode");
        assert_eq!(&bytes[..4], MAGIC_BYTES);

        let restored = configuration_from_bytes(&bytes).expect("decode");
        assert_eq!(restored, saved);
        assert_eq!(
            restored.components[&CategoryId::Cpu].specifications["features"],
            SpecValue::List(vec!["3D V-Cache".to_string(), "Unlocked".to_string()])
        );
    }

    #[test]
    fn encoding_is_stable() {
        let first = configuration_to_bytes(&sample()).expect("encode");
        let again = configuration_to_bytes(&configuration_from_bytes(&first).expect("decode"))
            .expect("re-encode");
        assert_eq!(first, again);
    }

    #[test]
    fn bad_headers_rejected() {
        assert!(configuration_from_bytes(b"USC").is_err());

        let mut bytes = configuration_to_bytes(&sample()).expect("encode");
        bytes[4] = FORMAT_VERSION + 1;
        assert!(configuration_from_bytes(&bytes).is_err());

        bytes[..4].copy_from_slice(b"KREM");
        assert!(configuration_from_bytes(&bytes).is_err());
    }

    #[test]
    fn truncated_payload_rejected() {
        let bytes = configuration_to_bytes(&sample()).expect("encode");
        assert!(configuration_from_bytes(&bytes[..bytes.len() / 2]).is_err());
    }

    #[test]
    fn json_uses_natural_shapes() {
        let json = serde_json::to_value(sample()).expect("json");
        assert_eq!(json["totalPrice"], 104_800);
        assert_eq!(json["components"]["cpu"]["specifications"]["tdp"], 120);
        assert_eq!(json["notes"]["gpu-4070"], "white edition");
    }

    #[test]
    fn summary_counts_components() {
        let summary = sample().summary();
        assert_eq!(summary.component_count, 2);
        assert_eq!(summary.total_price, Price(104_800));
    }
}
