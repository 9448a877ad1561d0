//! Root-cause correlator: ranks candidate explanations for a focal drift
//! report against recent deployment, fleet, and history signals.

pub mod candidate;
pub mod correlate;

pub use candidate::{CandidateCause, CauseKind};
pub use correlate::{correlate, FleetDriftObservation, RcaConfig, RecentDeployment};
