//! Internal key representation written to the object sink

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Length in bytes of a temporary exposure key
pub const EXPOSURE_KEY_LENGTH: usize = 16;

/// Raw temporary exposure key bytes
///
/// Serializes as canonical standard base64.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExposureKeyData([u8; EXPOSURE_KEY_LENGTH]);

impl ExposureKeyData {
    /// Decode standard base64 key material, checking the decoded length
    ///
    /// # Examples
    ///
    /// ```
    /// use keyfed::domain::key::ExposureKeyData;
    ///
    /// assert!(ExposureKeyData::from_base64("ogNW4Ra+Zdds1ZOOmyntDA==").is_ok());
    /// assert!(ExposureKeyData::from_base64("c2hvcnQ=").is_err());
    /// ```
    pub fn from_base64(encoded: &str) -> Result<Self, String> {
        let bytes = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| format!("Key data is not valid base64: {e}"))?;

        let key: [u8; EXPOSURE_KEY_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
            format!(
                "Key data decodes to {} bytes, expected {EXPOSURE_KEY_LENGTH}",
                bytes.len()
            )
        })?;

        Ok(Self(key))
    }

    /// Canonical base64 form
    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; EXPOSURE_KEY_LENGTH] {
        &self.0
    }
}

// Key material stays out of logs.
impl fmt::Debug for ExposureKeyData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExposureKeyData([REDACTED])")
    }
}

impl Serialize for ExposureKeyData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for ExposureKeyData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        Self::from_base64(&encoded).map_err(serde::de::Error::custom)
    }
}

/// A validated key in the local storage representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTemporaryExposureKey {
    pub key: ExposureKeyData,
    pub rolling_start_number: u32,
    pub rolling_period: u32,
    pub transmission_risk: u8,
    pub days_since_onset_of_symptoms: i32,
}

/// Body of one sink object: every accepted key of one downloaded batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTemporaryExposureKeyPayload {
    pub temporary_exposure_keys: Vec<StoredTemporaryExposureKey>,
}

impl StoredTemporaryExposureKeyPayload {
    pub fn new(temporary_exposure_keys: Vec<StoredTemporaryExposureKey>) -> Self {
        Self {
            temporary_exposure_keys,
        }
    }
}
