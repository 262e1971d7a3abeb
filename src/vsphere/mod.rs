//! The vSphere provider backend — the one concrete
//! [`crate::rpc::ProviderBackend`] implementation in this crate.
//!
//! The SOAP transport is kept behind [`HypervisorClient`] so the rest of
//! this module (clone-spec construction, power/graceful-shutdown state
//! machine, describe projection, snapshot orchestration) can be exercised
//! against a scripted stub in tests without a real vCenter.

pub mod client;
pub mod clone_spec;
pub mod datastore;
pub mod describe;
pub mod inventory;
pub mod power;
pub mod provider;
pub mod session;
pub mod snapshot;
pub mod soap;
pub mod task;
pub mod vmdk;

pub use client::{HypervisorClient, MoRef, TaskHandle, TaskInfo, VmSummary};
pub use provider::{capabilities, VsphereProvider};
