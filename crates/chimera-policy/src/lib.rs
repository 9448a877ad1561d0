//! Policy evaluation: deny-precedence authorization over the `Policy`
//! entity defined in `chimera-types`.

pub mod authorize;
pub mod decision;
pub mod gate;

pub use authorize::authorize;
pub use decision::PolicyDecision;
pub use gate::{ComposedGate, PolicyEngineGate, PolicyGate};
