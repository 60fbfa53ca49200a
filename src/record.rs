//! Patient record, admission draft, and the delimited payload codec.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::types::{Rank, Sequence};

/// Field separator of the encoded payload.
pub const DELIMITER: char = '|';

/// Where a patient is in their visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    /// Queued and not yet seen.
    Waiting,
    /// Popped from the queue and seen.
    Treated,
}

impl VisitStatus {
    /// Stable wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            VisitStatus::Waiting => "waiting",
            VisitStatus::Treated => "treated",
        }
    }
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisitStatus {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(VisitStatus::Waiting),
            "treated" => Ok(VisitStatus::Treated),
            other => Err(CodecError::InvalidStatus(other.to_string())),
        }
    }
}

/// Fully materialized patient record stored in both structures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// External patient identifier.
    pub id: String,
    /// Triage rank, 1 is most critical.
    pub rank: Rank,
    /// Arrival sequence assigned at admission.
    pub arrival: Sequence,
    /// Visit status.
    pub status: VisitStatus,
    /// Free-form notes (symptoms, vitals).
    pub info: String,
}

/// Caller-supplied admission payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientDraft {
    /// External patient identifier.
    pub id: String,
    /// Requested triage rank.
    pub rank: Rank,
    /// Free-form notes.
    pub info: String,
}

impl PatientDraft {
    /// Convenience constructor.
    pub fn new(id: impl Into<String>, rank: Rank, info: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rank,
            info: info.into(),
        }
    }
}

/// Decoding failures for encoded payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The payload ended before this field.
    #[error("payload is missing the {0} field")]
    MissingField(&'static str),
    /// The rank field is not a number in range for [`Rank`].
    #[error("invalid rank field {0:?}")]
    InvalidRank(String),
    /// The arrival field is not an unsigned integer.
    #[error("invalid arrival field {0:?}")]
    InvalidArrival(String),
    /// The status field is not a known [`VisitStatus`].
    #[error("invalid status field {0:?}")]
    InvalidStatus(String),
}

/// Encodes `rec` as `id|rank|arrival|status|info`.
pub fn encode(rec: &PatientRecord) -> String {
    format!(
        "{id}{d}{rank}{d}{arrival}{d}{status}{d}{info}",
        id = rec.id,
        rank = rec.rank,
        arrival = rec.arrival,
        status = rec.status,
        info = rec.info,
        d = DELIMITER,
    )
}

/// Id prefix of an encoded payload, without decoding the other fields.
pub fn id_of(payload: &str) -> &str {
    payload.split(DELIMITER).next().unwrap_or(payload)
}

/// Decodes a payload produced by [`encode`].
///
/// `info` is the unsplit remainder, so it may contain the delimiter. An id
/// containing the delimiter cannot round-trip.
pub fn decode(payload: &str) -> Result<PatientRecord, CodecError> {
    let mut fields = payload.splitn(5, DELIMITER);
    let id = fields.next().ok_or(CodecError::MissingField("id"))?;
    let rank = fields.next().ok_or(CodecError::MissingField("rank"))?;
    let arrival = fields.next().ok_or(CodecError::MissingField("arrival"))?;
    let status = fields.next().ok_or(CodecError::MissingField("status"))?;
    let info = fields.next().ok_or(CodecError::MissingField("info"))?;

    Ok(PatientRecord {
        id: id.to_string(),
        rank: rank
            .parse()
            .map_err(|_| CodecError::InvalidRank(rank.to_string()))?,
        arrival: arrival
            .parse()
            .map_err(|_| CodecError::InvalidArrival(arrival.to_string()))?,
        status: status.parse()?,
        info: info.to_string(),
    })
}
