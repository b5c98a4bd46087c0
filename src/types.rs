//! Core types for the introduction lifecycle tracker.

/// RecordId: hex-encoded, content-derived identifier of an introduction record
pub type RecordId = String;

/// UserId: opaque identifier assigned by the host platform
pub type UserId = String;

/// PinHash: SHA-256 digest of a connection PIN
pub type PinHash = [u8; 32];
