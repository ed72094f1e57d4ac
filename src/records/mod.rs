//! Record handling subsystem.
//!
//! # Data Flow
//! ```text
//! request body
//!     → model.rs (decode, validate → RecordDraft)
//!     → gateway.rs (assign id, persist, read back → Record)
//!     → model.rs (Record → RecordResponse)
//! ```

pub mod error;
pub mod gateway;
pub mod model;

pub use error::{ErrorKind, RequestError, StoreError, StoreResult};
pub use gateway::RecordGateway;
pub use model::{
    parse_create_request, CreateRecordRequest, ErrorResponse, Record, RecordDraft, RecordResponse,
};
