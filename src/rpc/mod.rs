//! Component C — the `Provider` wire contract.
//!
//! The generated tonic/prost code lives in `pb`; [`ProviderBackend`] is the
//! domain-level trait hypervisor backends implement (the vSphere backend is
//! the only one in this crate — see `vsphere::provider::VsphereProvider`).
//! [`GrpcProviderService`] adapts any `ProviderBackend` to the generated
//! `pb::provider_server::Provider` trait, translating `resilience::Error`
//! into a `tonic::Status` at the one conversion point the RPC boundary
//! needs.

pub mod pb {
    tonic::include_proto!("virtrigaud.provider.v1");
}

pub mod backend;
pub mod service;

pub use backend::{
    CloneArgs, CloneOutcome, CreateArgs, CreateOutcome, Capabilities, DescribeOutcome, PowerOp,
    ProviderBackend, SnapshotCreateOutcome, TaskOutcome, TaskStatusOutcome, ValidateOutcome,
};
pub use pb::provider_client::ProviderClient;
pub use pb::provider_server::{Provider, ProviderServer};
pub use service::GrpcProviderService;

use crate::resilience::{Error as ResilienceError, ErrorKind};
use tonic::{Code, Status};

/// The single conversion point from the core error taxonomy to gRPC status
/// codes.
pub fn error_to_status(err: ResilienceError) -> Status {
    let code = match err.kind {
        ErrorKind::NotFound => Code::NotFound,
        ErrorKind::InvalidSpec => Code::InvalidArgument,
        ErrorKind::Unauthorized => Code::Unauthenticated,
        ErrorKind::NotSupported => Code::Unimplemented,
        ErrorKind::Retryable | ErrorKind::Unavailable => Code::Unavailable,
        ErrorKind::RateLimit => Code::ResourceExhausted,
        ErrorKind::Timeout => Code::DeadlineExceeded,
        ErrorKind::QuotaExceeded => Code::ResourceExhausted,
        ErrorKind::Conflict => Code::Aborted,
    };
    Status::new(code, err.message)
}
