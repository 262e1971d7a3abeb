//! Adapts a [`ProviderBackend`] to the generated `pb::provider_server::Provider`
//! trait. Every handler emits a tracing span carrying the operation name
//! and VM/task ID.

use tonic::{Request, Response, Status};
use tracing::instrument;

use super::backend::{CloneArgs, CreateArgs, PowerOp, ProviderBackend};
use super::error_to_status;
use super::pb;

pub struct GrpcProviderService<B> {
    backend: B,
}

impl<B> GrpcProviderService<B> {
    pub fn new(backend: B) -> Self {
        GrpcProviderService { backend }
    }
}

fn power_op_from_wire(op: i32) -> Result<PowerOp, Status> {
    match pb::PowerOp::try_from(op).unwrap_or(pb::PowerOp::Unspecified) {
        pb::PowerOp::On => Ok(PowerOp::On),
        pb::PowerOp::Off => Ok(PowerOp::Off),
        pb::PowerOp::Reboot => Ok(PowerOp::Reboot),
        pb::PowerOp::ShutdownGraceful => Ok(PowerOp::ShutdownGraceful),
        pb::PowerOp::Unspecified => Err(Status::invalid_argument("power op must be specified")),
    }
}

#[tonic::async_trait]
impl<B: ProviderBackend + 'static> pb::provider_server::Provider for GrpcProviderService<B> {
    #[instrument(skip(self, _request), name = "rpc.validate")]
    async fn validate(
        &self,
        _request: Request<pb::ValidateRequest>,
    ) -> Result<Response<pb::ValidateResponse>, Status> {
        let outcome = self.backend.validate().await.map_err(error_to_status)?;
        Ok(Response::new(pb::ValidateResponse {
            ok: outcome.ok,
            message: outcome.message,
        }))
    }

    #[instrument(skip(self, _request), name = "rpc.get_capabilities")]
    async fn get_capabilities(
        &self,
        _request: Request<pb::GetCapabilitiesRequest>,
    ) -> Result<Response<pb::GetCapabilitiesResponse>, Status> {
        let caps = self.backend.get_capabilities().await.map_err(error_to_status)?;
        Ok(Response::new(pb::GetCapabilitiesResponse {
            supported_operations: caps.supported_operations,
            supported_disk_types: caps.supported_disk_types,
            supported_network_types: caps.supported_network_types,
            supports_graceful_shutdown: caps.supports_graceful_shutdown,
            supports_memory_snapshots: caps.supports_memory_snapshots,
            supports_linked_clone: caps.supports_linked_clone,
        }))
    }

    #[instrument(skip(self, request), name = "rpc.create", fields(vm.name = %request.get_ref().name))]
    async fn create(
        &self,
        request: Request<pb::CreateRequest>,
    ) -> Result<Response<pb::CreateResponse>, Status> {
        let req = request.into_inner();
        let outcome = self
            .backend
            .create(CreateArgs {
                name: req.name,
                class_json: req.class_json,
                image_json: req.image_json,
                networks_json: req.networks_json,
                disks_json: req.disks_json,
                user_data: req.user_data,
                placement_json: req.placement_json,
                desired_power_state: req.desired_power_state,
            })
            .await
            .map_err(error_to_status)?;
        Ok(Response::new(pb::CreateResponse {
            id: outcome.id,
            task_ref: outcome.task_ref,
        }))
    }

    #[instrument(skip(self, request), name = "rpc.delete", fields(vm.id = %request.get_ref().id))]
    async fn delete(
        &self,
        request: Request<pb::DeleteRequest>,
    ) -> Result<Response<pb::DeleteResponse>, Status> {
        let outcome = self
            .backend
            .delete(&request.into_inner().id)
            .await
            .map_err(error_to_status)?;
        Ok(Response::new(pb::DeleteResponse {
            task_ref: outcome.task_ref,
        }))
    }

    #[instrument(skip(self, request), name = "rpc.power", fields(vm.id = %request.get_ref().id))]
    async fn power(
        &self,
        request: Request<pb::PowerRequest>,
    ) -> Result<Response<pb::PowerResponse>, Status> {
        let req = request.into_inner();
        let op = power_op_from_wire(req.op)?;
        let outcome = self
            .backend
            .power(&req.id, op, req.graceful_timeout_seconds)
            .await
            .map_err(error_to_status)?;
        Ok(Response::new(pb::PowerResponse {
            task_ref: outcome.task_ref,
        }))
    }

    #[instrument(skip(self, request), name = "rpc.reconfigure", fields(vm.id = %request.get_ref().id))]
    async fn reconfigure(
        &self,
        request: Request<pb::ReconfigureRequest>,
    ) -> Result<Response<pb::ReconfigureResponse>, Status> {
        let req = request.into_inner();
        let outcome = self
            .backend
            .reconfigure(&req.id, &req.desired_class_json, &req.disk_changes_json)
            .await
            .map_err(error_to_status)?;
        Ok(Response::new(pb::ReconfigureResponse {
            task_ref: outcome.task_ref,
        }))
    }

    #[instrument(skip(self, request), name = "rpc.describe", fields(vm.id = %request.get_ref().id))]
    async fn describe(
        &self,
        request: Request<pb::DescribeRequest>,
    ) -> Result<Response<pb::DescribeResponse>, Status> {
        let outcome = self
            .backend
            .describe(&request.into_inner().id)
            .await
            .map_err(error_to_status)?;
        Ok(Response::new(pb::DescribeResponse {
            exists: outcome.exists,
            power_state: outcome.power_state,
            ips: outcome.ips,
            console_url: outcome.console_url,
            provider_raw_json: outcome.provider_raw_json,
        }))
    }

    #[instrument(skip(self, request), name = "rpc.task_status", fields(task_ref = %request.get_ref().task_ref))]
    async fn task_status(
        &self,
        request: Request<pb::TaskStatusRequest>,
    ) -> Result<Response<pb::TaskStatusResponse>, Status> {
        let outcome = self
            .backend
            .task_status(&request.into_inner().task_ref)
            .await
            .map_err(error_to_status)?;
        Ok(Response::new(pb::TaskStatusResponse {
            done: outcome.done,
            error: outcome.error,
            progress_percent: outcome.progress_percent,
        }))
    }

    #[instrument(skip(self, request), name = "rpc.snapshot_create", fields(vm.id = %request.get_ref().id))]
    async fn snapshot_create(
        &self,
        request: Request<pb::SnapshotCreateRequest>,
    ) -> Result<Response<pb::SnapshotCreateResponse>, Status> {
        let req = request.into_inner();
        let outcome = self
            .backend
            .snapshot_create(&req.id, &req.name_hint, &req.description, req.include_memory)
            .await
            .map_err(error_to_status)?;
        Ok(Response::new(pb::SnapshotCreateResponse {
            snapshot_id: outcome.snapshot_id,
            task_ref: outcome.task_ref,
        }))
    }

    #[instrument(skip(self, request), name = "rpc.snapshot_delete", fields(snapshot.id = %request.get_ref().snapshot_id))]
    async fn snapshot_delete(
        &self,
        request: Request<pb::SnapshotDeleteRequest>,
    ) -> Result<Response<pb::SnapshotDeleteResponse>, Status> {
        let outcome = self
            .backend
            .snapshot_delete(&request.into_inner().snapshot_id)
            .await
            .map_err(error_to_status)?;
        Ok(Response::new(pb::SnapshotDeleteResponse {
            task_ref: outcome.task_ref,
        }))
    }

    #[instrument(skip(self, request), name = "rpc.snapshot_revert", fields(vm.id = %request.get_ref().id))]
    async fn snapshot_revert(
        &self,
        request: Request<pb::SnapshotRevertRequest>,
    ) -> Result<Response<pb::SnapshotRevertResponse>, Status> {
        let req = request.into_inner();
        let outcome = self
            .backend
            .snapshot_revert(&req.id, &req.snapshot_id)
            .await
            .map_err(error_to_status)?;
        Ok(Response::new(pb::SnapshotRevertResponse {
            task_ref: outcome.task_ref,
        }))
    }

    #[instrument(skip(self, request), name = "rpc.clone", fields(source.id = %request.get_ref().source_id))]
    async fn clone(
        &self,
        request: Request<pb::CloneRequest>,
    ) -> Result<Response<pb::CloneResponse>, Status> {
        let req = request.into_inner();
        let outcome = self
            .backend
            .clone(CloneArgs {
                source_id: req.source_id,
                target_name: req.target_name,
                clone_type: req.clone_type,
                power_on: req.power_on,
                customization_json: req.customization_json,
            })
            .await
            .map_err(error_to_status)?;
        Ok(Response::new(pb::CloneResponse {
            id: outcome.id,
            task_ref: outcome.task_ref,
        }))
    }

    #[instrument(skip(self, request), name = "rpc.image_prepare")]
    async fn image_prepare(
        &self,
        request: Request<pb::ImagePrepareRequest>,
    ) -> Result<Response<pb::ImagePrepareResponse>, Status> {
        let outcome = self
            .backend
            .image_prepare(&request.into_inner().image_json)
            .await
            .map_err(error_to_status)?;
        Ok(Response::new(pb::ImagePrepareResponse {
            task_ref: outcome.task_ref,
        }))
    }
}
