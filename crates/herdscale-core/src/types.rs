use crate::{
    Result,
    constants::{
        ANTICOLLISION_FRAME_LENGTH, MAX_DEVICE_ID_LENGTH, MIN_DEVICE_ID_LENGTH, TAG_HEX_LENGTH,
        TAG_ID_LENGTH,
    },
    error::Error,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier of a contactless tag, as extracted by the anti-collision
/// exchange.
///
/// Holds the 4 raw UID bytes. The canonical external representation is the
/// uppercase, zero-padded hexadecimal rendering of those bytes (8
/// characters); that string is the key the dispatcher debounces on and the
/// value shipped in capture reports.
///
/// # Examples
///
/// ```
/// use herdscale_core::TagId;
///
/// let tag = TagId::from_bytes([0x04, 0xA1, 0xB2, 0xC3]);
/// assert_eq!(tag.to_string(), "04A1B2C3");
/// assert_eq!(tag.checksum(), 0x04 ^ 0xA1 ^ 0xB2 ^ 0xC3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagId([u8; TAG_ID_LENGTH]);

impl TagId {
    /// Create a tag identifier from 4 raw UID bytes.
    pub fn from_bytes(bytes: [u8; TAG_ID_LENGTH]) -> Self {
        TagId(bytes)
    }

    /// Parse a raw anti-collision response frame.
    ///
    /// The frame must be exactly 5 bytes: 4 UID bytes followed by the BCC
    /// checksum, which must equal the XOR of the 4 UID bytes. A frame that
    /// fails either check invalidates the whole read.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTagFrame` on a length mismatch and
    /// `Error::ChecksumMismatch` when the BCC byte does not match.
    ///
    /// # Examples
    ///
    /// ```
    /// use herdscale_core::TagId;
    ///
    /// let frame = [0x04, 0xA1, 0xB2, 0xC3, 0x04 ^ 0xA1 ^ 0xB2 ^ 0xC3];
    /// let tag = TagId::from_frame(&frame).unwrap();
    /// assert_eq!(tag.to_string(), "04A1B2C3");
    ///
    /// // Corrupted checksum byte invalidates the read
    /// let bad = [0x04, 0xA1, 0xB2, 0xC3, 0x00];
    /// assert!(TagId::from_frame(&bad).is_err());
    /// ```
    pub fn from_frame(frame: &[u8]) -> Result<Self> {
        if frame.len() != ANTICOLLISION_FRAME_LENGTH {
            return Err(Error::InvalidTagFrame {
                expected: ANTICOLLISION_FRAME_LENGTH,
                actual: frame.len(),
            });
        }

        let uid: [u8; TAG_ID_LENGTH] = frame[..TAG_ID_LENGTH]
            .try_into()
            .expect("slice length checked above");
        let expected = uid.iter().fold(0u8, |acc, b| acc ^ b);

        if frame[TAG_ID_LENGTH] != expected {
            return Err(Error::ChecksumMismatch {
                expected,
                actual: frame[TAG_ID_LENGTH],
            });
        }

        Ok(TagId(uid))
    }

    /// Get the raw UID bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; TAG_ID_LENGTH] {
        &self.0
    }

    /// XOR of the UID bytes — the BCC byte a well-formed anti-collision
    /// frame carries after the UID.
    #[must_use]
    pub fn checksum(&self) -> u8 {
        self.0.iter().fold(0u8, |acc, b| acc ^ b)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for TagId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != TAG_HEX_LENGTH || !s.is_ascii() {
            return Err(Error::InvalidTagFormat(format!(
                "expected {TAG_HEX_LENGTH} hex characters, got {:?}",
                s
            )));
        }

        let mut bytes = [0u8; TAG_ID_LENGTH];
        for (i, chunk) in s.as_bytes().chunks_exact(2).enumerate() {
            let pair = std::str::from_utf8(chunk).expect("ASCII checked above");
            bytes[i] = u8::from_str_radix(pair, 16)
                .map_err(|_| Error::InvalidTagFormat(format!("invalid hex pair {pair:?}")))?;
        }

        Ok(TagId(bytes))
    }
}

/// Serialize as the canonical hex string, not a byte array; the wire
/// protocol and the config file both speak the rendered form.
impl Serialize for TagId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TagId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Station/device identifier (3-32 ASCII characters).
///
/// Identifies which physical station produced a capture report, e.g.
/// `"STATION-PADDOCK-01"`. Normalized to uppercase on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a new device ID with validation.
    ///
    /// The ID is normalized (trimmed and converted to uppercase) before
    /// validation.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDeviceId` if:
    /// - The length is not between 3-32 characters after trimming
    /// - The ID contains characters other than ASCII alphanumerics, `-`, `_`
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim().to_uppercase();

        let len = id.len();
        if !(MIN_DEVICE_ID_LENGTH..=MAX_DEVICE_ID_LENGTH).contains(&len) {
            return Err(Error::InvalidDeviceId(format!(
                "device ID must be {MIN_DEVICE_ID_LENGTH}-{MAX_DEVICE_ID_LENGTH} chars, got {len}"
            )));
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::InvalidDeviceId(
                "device ID must be ASCII alphanumeric, '-' or '_'".to_string(),
            ));
        }

        Ok(DeviceId(id))
    }

    /// Get the device ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DeviceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DeviceId::new(s)
    }
}

/// Physical placement of the station camera relative to the weighing race.
///
/// The estimation server weighs the silhouette differently per viewpoint,
/// so the position travels with every capture report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraPosition {
    /// Head-on view of the race entry.
    Front,

    /// Left flank view.
    LeftSide,

    /// Right flank view.
    RightSide,

    /// Overhead view.
    Top,
}

impl CameraPosition {
    /// Wire name of the position, as used in reports and config files.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraPosition::Front => "front",
            CameraPosition::LeftSide => "left_side",
            CameraPosition::RightSide => "right_side",
            CameraPosition::Top => "top",
        }
    }
}

impl fmt::Display for CameraPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CameraPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "front" => Ok(CameraPosition::Front),
            "left_side" => Ok(CameraPosition::LeftSide),
            "right_side" => Ok(CameraPosition::RightSide),
            "top" => Ok(CameraPosition::Top),
            other => Err(Error::InvalidCameraPosition(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_tag_id_display_uppercase_zero_padded() {
        let tag = TagId::from_bytes([0x04, 0x0A, 0x00, 0xFF]);
        assert_eq!(tag.to_string(), "040A00FF");
    }

    #[test]
    fn test_tag_id_from_valid_frame() {
        let frame = [0x04, 0xA1, 0xB2, 0xC3, 0x04 ^ 0xA1 ^ 0xB2 ^ 0xC3];
        let tag = TagId::from_frame(&frame).unwrap();
        assert_eq!(tag.as_bytes(), &[0x04, 0xA1, 0xB2, 0xC3]);
    }

    #[test]
    fn test_tag_id_from_frame_rejects_bad_checksum() {
        let frame = [0x04, 0xA1, 0xB2, 0xC3, 0x00];
        let err = TagId::from_frame(&frame).unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { .. }));
    }

    #[rstest]
    #[case(&[])]
    #[case(&[0x04, 0xA1])]
    #[case(&[0x04, 0xA1, 0xB2, 0xC3])]
    #[case(&[0x04, 0xA1, 0xB2, 0xC3, 0xD4, 0x00])]
    fn test_tag_id_from_frame_rejects_bad_length(#[case] frame: &[u8]) {
        let err = TagId::from_frame(frame).unwrap_err();
        assert!(matches!(err, Error::InvalidTagFrame { .. }));
    }

    #[test]
    fn test_tag_id_checksum_is_xor_of_uid() {
        let tag = TagId::from_bytes([0x12, 0x34, 0x56, 0x78]);
        assert_eq!(tag.checksum(), 0x12 ^ 0x34 ^ 0x56 ^ 0x78);
    }

    #[test]
    fn test_tag_id_parse_roundtrip() {
        let tag: TagId = "04A1B2C3".parse().unwrap();
        assert_eq!(tag, TagId::from_bytes([0x04, 0xA1, 0xB2, 0xC3]));
        assert_eq!(tag.to_string().parse::<TagId>().unwrap(), tag);
    }

    #[rstest]
    #[case("")]
    #[case("04A1B2")]
    #[case("04A1B2C3D4")]
    #[case("04A1B2GX")]
    fn test_tag_id_parse_rejects_malformed(#[case] input: &str) {
        assert!(input.parse::<TagId>().is_err());
    }

    #[test]
    fn test_tag_id_serde_as_hex_string() {
        let tag = TagId::from_bytes([0x04, 0xA1, 0xB2, 0xC3]);
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(json, "\"04A1B2C3\"");

        let back: TagId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
    }

    #[test]
    fn test_device_id_normalizes_case() {
        let id = DeviceId::new("  station-01 ").unwrap();
        assert_eq!(id.as_str(), "STATION-01");
    }

    #[rstest]
    #[case("ab")]
    #[case("")]
    #[case("THIS_DEVICE_ID_IS_DEFINITELY_TOO_LONG_TO_BE_VALID")]
    #[case("bad id")]
    #[case("café-01")]
    fn test_device_id_rejects_invalid(#[case] input: &str) {
        assert!(DeviceId::new(input).is_err());
    }

    #[rstest]
    #[case(CameraPosition::Front, "front")]
    #[case(CameraPosition::LeftSide, "left_side")]
    #[case(CameraPosition::RightSide, "right_side")]
    #[case(CameraPosition::Top, "top")]
    fn test_camera_position_wire_names(#[case] pos: CameraPosition, #[case] name: &str) {
        assert_eq!(pos.as_str(), name);
        assert_eq!(name.parse::<CameraPosition>().unwrap(), pos);
    }

    #[test]
    fn test_camera_position_rejects_unknown() {
        assert!("sideways".parse::<CameraPosition>().is_err());
    }
}
