//! Contract e-signature lifecycle: the embedded signature block, the store
//! seam, and the service that ties them together.

pub mod embedder;
pub mod error;
pub mod field;
pub mod service;
pub mod store;

pub use error::SigningError;
pub use service::{
    AdminSignatureRequest, MemberSignatureRequest, RefreshScope, SigningOutcome, SigningService,
};
pub use store::{ContractStore, DraftFields};

/// The service as wired into the HTTP layer.
pub type DbSigningService = SigningService<sea_orm::DatabaseConnection>;
