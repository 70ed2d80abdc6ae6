//! Layout snapshot encoding.
//!
//! A snapshot is two opaque blobs: the main window geometry and the window
//! state (arrangement plus per-panel flags). Each blob is framed as
//!
//! ```text
//! magic[4] | version: u16 BE | payload length: u32 BE | payload | crc32: u32 BE
//! ```
//!
//! The `.layout` file stores both blobs hex encoded in a small JSON document.

use crate::layout::arrangement::Arrangement;
use crate::layout::panel::{PanelId, PanelState, WindowGeometry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub const GEOMETRY_KEY: &str = "geometry";
pub const WINDOW_STATE_KEY: &str = "windowState";

/// File extension for exported layouts.
pub const LAYOUT_EXTENSION: &str = "layout";

const GEOMETRY_MAGIC: [u8; 4] = *b"DCGM";
const STATE_MAGIC: [u8; 4] = *b"DCWS";
const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: usize = 4 + 2 + 4;
const TRAILER_LEN: usize = 4;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to access layout file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed layout document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid hex encoding: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("Layout data is truncated")]
    Truncated,
    #[error("Layout data is not a {0} blob")]
    BadMagic(&'static str),
    #[error("Unsupported layout format version {0}")]
    UnsupportedVersion(u16),
    #[error("Layout payload length mismatch")]
    LengthMismatch,
    #[error("Layout checksum mismatch")]
    ChecksumMismatch,
    #[error("Layout does not describe every panel exactly once")]
    IncompleteLayout,
}

/// The two persisted blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSnapshot {
    pub geometry: Vec<u8>,
    pub window_state: Vec<u8>,
}

/// Decoded content of the `windowState` blob.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowState {
    pub arrangement: Arrangement,
    pub panels: BTreeMap<PanelId, PanelState>,
}

#[derive(Serialize, Deserialize)]
struct PanelRecord {
    id: PanelId,
    state: PanelState,
}

#[derive(Serialize, Deserialize)]
struct WindowStatePayload {
    arrangement: Arrangement,
    panels: Vec<PanelRecord>,
}

/// On-disk form of an exported layout.
#[derive(Debug, Serialize, Deserialize)]
struct LayoutDocument {
    #[serde(rename = "windowState")]
    window_state: String,
    geometry: String,
}

fn frame(magic: [u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(HEADER_LEN + payload.len() + TRAILER_LEN);
    blob.extend_from_slice(&magic);
    blob.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
    blob.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    blob.extend_from_slice(payload);
    blob.extend_from_slice(&crc32fast::hash(payload).to_be_bytes());
    blob
}

fn unframe<'a>(
    magic: [u8; 4],
    kind: &'static str,
    blob: &'a [u8],
) -> Result<&'a [u8], SnapshotError> {
    if blob.len() < HEADER_LEN + TRAILER_LEN {
        return Err(SnapshotError::Truncated);
    }
    if blob[..4] != magic {
        return Err(SnapshotError::BadMagic(kind));
    }
    let version = u16::from_be_bytes([blob[4], blob[5]]);
    if version != FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(version));
    }
    let len = u32::from_be_bytes([blob[6], blob[7], blob[8], blob[9]]) as usize;
    if blob.len() != HEADER_LEN + len + TRAILER_LEN {
        return Err(SnapshotError::LengthMismatch);
    }

    let payload = &blob[HEADER_LEN..HEADER_LEN + len];
    let trailer = &blob[HEADER_LEN + len..];
    let expected = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    if crc32fast::hash(payload) != expected {
        return Err(SnapshotError::ChecksumMismatch);
    }
    Ok(payload)
}

pub fn encode_geometry(geometry: &WindowGeometry) -> Result<Vec<u8>, SnapshotError> {
    let payload = serde_json::to_vec(geometry)?;
    Ok(frame(GEOMETRY_MAGIC, &payload))
}

pub fn decode_geometry(blob: &[u8]) -> Result<WindowGeometry, SnapshotError> {
    let payload = unframe(GEOMETRY_MAGIC, "geometry", blob)?;
    Ok(serde_json::from_slice(payload)?)
}

pub fn encode_window_state(state: &WindowState) -> Result<Vec<u8>, SnapshotError> {
    let payload = WindowStatePayload {
        arrangement: state.arrangement.clone(),
        panels: state
            .panels
            .iter()
            .map(|(id, state)| PanelRecord {
                id: *id,
                state: state.clone(),
            })
            .collect(),
    };
    let payload = serde_json::to_vec(&payload)?;
    Ok(frame(STATE_MAGIC, &payload))
}

pub fn decode_window_state(blob: &[u8]) -> Result<WindowState, SnapshotError> {
    let payload = unframe(STATE_MAGIC, "window state", blob)?;
    let payload: WindowStatePayload = serde_json::from_slice(payload)?;

    let record_count = payload.panels.len();
    let panels: BTreeMap<PanelId, PanelState> = payload
        .panels
        .into_iter()
        .map(|record| (record.id, record.state))
        .collect();
    if record_count != PanelId::ALL.len()
        || panels.len() != PanelId::ALL.len()
        || !payload.arrangement.is_complete()
    {
        return Err(SnapshotError::IncompleteLayout);
    }

    Ok(WindowState {
        arrangement: payload.arrangement,
        panels,
    })
}

impl LayoutSnapshot {
    /// Hex-text document written to `.layout` files.
    pub fn to_document(&self) -> Result<String, SnapshotError> {
        let document = LayoutDocument {
            window_state: hex::encode(&self.window_state),
            geometry: hex::encode(&self.geometry),
        };
        Ok(serde_json::to_string(&document)?)
    }

    pub fn from_document(text: &str) -> Result<Self, SnapshotError> {
        let document: LayoutDocument = serde_json::from_str(text)?;
        Ok(Self {
            geometry: hex::decode(document.geometry.trim())?,
            window_state: hex::decode(document.window_state.trim())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> WindowState {
        WindowState {
            arrangement: Arrangement::default(),
            panels: PanelId::ALL
                .into_iter()
                .map(|id| (id, PanelState::default()))
                .collect(),
        }
    }

    #[test]
    fn window_state_blob_decodes() {
        let state = sample_state();
        let blob = encode_window_state(&state).unwrap();
        assert_eq!(&blob[..4], b"DCWS");
        assert_eq!(decode_window_state(&blob).unwrap(), state);
    }

    #[test]
    fn geometry_blob_rejected_as_window_state() {
        let blob = encode_geometry(&WindowGeometry::default()).unwrap();
        assert!(matches!(
            decode_window_state(&blob),
            Err(SnapshotError::BadMagic(_))
        ));
    }

    #[test]
    fn flipped_payload_byte_fails_checksum() {
        let mut blob = encode_geometry(&WindowGeometry::default()).unwrap();
        blob[HEADER_LEN + 2] ^= 0x01;
        assert!(matches!(
            decode_geometry(&blob),
            Err(SnapshotError::ChecksumMismatch)
        ));
    }

    #[test]
    fn truncated_blob_is_reported() {
        let blob = encode_geometry(&WindowGeometry::default()).unwrap();
        assert!(matches!(
            decode_geometry(&blob[..6]),
            Err(SnapshotError::Truncated)
        ));
        assert!(matches!(
            decode_geometry(&blob[..blob.len() - 1]),
            Err(SnapshotError::LengthMismatch)
        ));
    }

    #[test]
    fn missing_panel_is_incomplete() {
        let mut state = sample_state();
        state.panels.remove(&PanelId::C);
        let blob = encode_window_state(&state).unwrap();
        assert!(matches!(
            decode_window_state(&blob),
            Err(SnapshotError::IncompleteLayout)
        ));
    }

    #[test]
    fn document_uses_hex_fields() {
        let snapshot = LayoutSnapshot {
            geometry: vec![0xde, 0xad],
            window_state: vec![0xbe, 0xef],
        };
        let text = snapshot.to_document().unwrap();
        assert!(text.contains(r#""geometry":"dead""#));
        assert!(text.contains(r#""windowState":"beef""#));
        assert_eq!(LayoutSnapshot::from_document(&text).unwrap(), snapshot);
    }

    #[test]
    fn document_with_bad_hex_fails() {
        let text = r#"{"geometry":"0g","windowState":"00"}"#;
        assert!(matches!(
            LayoutSnapshot::from_document(text),
            Err(SnapshotError::Hex(_))
        ));
    }
}
