//! Particle status codes

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Incoming particle
pub const INCOMING: i32 = -1;
/// Outgoing final state particle
pub const OUTGOING: i32 = 1;
/// Intermediate space-like propagator defining an x and Q^2 which should be preserved
pub const INTERMEDIATE_SPACELIKE: i32 = -2;
/// Intermediate resonance, mass should be preserved
pub const INTERMEDIATE_RESONANCE: i32 = 2;
/// Intermediate resonance, for documentation only
pub const INTERMEDIATE_DOC: i32 = 3;
/// Incoming beam particles at time t = −∞
pub const INCOMING_BEAM: i32 = -9;

/// Interpretation of the `status` column of a particle record
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Status {
    /// Incoming beam particles at time t = −∞
    IncomingBeam,
    /// Incoming particle
    Incoming,
    /// Outgoing final state particle
    Outgoing,
    /// Intermediate space-like propagator
    IntermediateSpacelike,
    /// Intermediate resonance, mass should be preserved
    IntermediateResonance,
    /// Intermediate resonance, for documentation only
    IntermediateDoc,
    /// Generator-specific code
    Other(i32),
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        match code {
            INCOMING_BEAM => Status::IncomingBeam,
            INCOMING => Status::Incoming,
            OUTGOING => Status::Outgoing,
            INTERMEDIATE_SPACELIKE => Status::IntermediateSpacelike,
            INTERMEDIATE_RESONANCE => Status::IntermediateResonance,
            INTERMEDIATE_DOC => Status::IntermediateDoc,
            other => Status::Other(other),
        }
    }
}

impl From<Status> for i32 {
    fn from(status: Status) -> Self {
        match status {
            Status::IncomingBeam => INCOMING_BEAM,
            Status::Incoming => INCOMING,
            Status::Outgoing => OUTGOING,
            Status::IntermediateSpacelike => INTERMEDIATE_SPACELIKE,
            Status::IntermediateResonance => INTERMEDIATE_RESONANCE,
            Status::IntermediateDoc => INTERMEDIATE_DOC,
            Status::Other(code) => code,
        }
    }
}
