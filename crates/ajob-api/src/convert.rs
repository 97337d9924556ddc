use ajob_model::{InboundEvent, JobLabels, JobMetadata, Repository};

use crate::{error::ApiError, payload::WorkflowJobPayload};

// ============================================================================
// Webhook payload → InboundEvent
// ============================================================================

impl TryFrom<WorkflowJobPayload> for InboundEvent {
    type Error = ApiError;

    fn try_from(p: WorkflowJobPayload) -> Result<Self, Self::Error> {
        let action = p
            .action
            .parse()
            .map_err(|e: ajob_model::ModelError| ApiError::InvalidRequest(e.to_string()))?;

        if p.repository.full_name.trim().is_empty() {
            return Err(ApiError::InvalidRequest("repository.full_name is empty".into()));
        }

        Ok(InboundEvent {
            action,
            repository: Repository {
                full_name: p.repository.full_name,
                private: p.repository.private,
                fork: p.repository.fork,
            },
            head_sha: p.workflow_job.head_sha,
            labels: p.workflow_job.labels.into_iter().collect::<JobLabels>(),
            job: JobMetadata {
                id: p.workflow_job.id,
                run_id: p.workflow_job.run_id,
                name: p.workflow_job.name,
                workflow_name: p.workflow_job.workflow_name,
            },
        })
    }
}
