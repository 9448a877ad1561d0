//! Capability interfaces consumed by the core use cases.
//!
//! Every port is an `async_trait` kept deliberately narrow: the core depends
//! on these traits only, never on a concrete adapter. Production adapters
//! (Nix builds, SSH transports, cloud SDKs, ITSM/notification clients) live
//! outside this crate; `fakes` ships in-memory doubles used by the other
//! crates' test suites and by `chimera-cli`'s demonstration mode.

pub mod build;
pub mod cloud_provider;
pub mod error;
pub mod event_bus;
pub mod itsm;
pub mod notification;
pub mod orchestrator;
pub mod remote_executor;
pub mod session;

pub mod fakes;

pub use build::BuildPort;
pub use cloud_provider::CloudProviderPort;
pub use error::{PortFailure, PortResult};
pub use event_bus::{EventBusPort, EventHandler};
pub use itsm::{Incident, IncidentSeverity, ItsmPort};
pub use notification::NotificationPort;
pub use orchestrator::{HealingCommand, OrchestratorPort};
pub use remote_executor::RemoteExecutorPort;
pub use session::SessionPort;
