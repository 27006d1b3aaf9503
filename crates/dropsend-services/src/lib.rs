//! Dropsend Services Layer
//!
//! Business rules of the transfer engine: identity resolution, the access gate, the
//! completion state machine, the download pipeline, and the transfer lifecycle. The HTTP
//! crate stays a thin layer over these.

pub mod access;
pub mod completion;
pub mod download;
pub mod resolver;
pub mod transfers;

pub use access::is_accessible;
pub use completion::{transfer_completion_holds, CompletionStateMachine, Transition};
pub use download::{ArchiveDownload, DownloadOutcome, DownloadPipeline, ARCHIVE_CONTENT_TYPE};
pub use resolver::{parse_token, IdentityResolver, Resolution, ResolvedToken};
pub use transfers::TransferService;
