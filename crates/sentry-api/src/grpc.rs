use std::pin::Pin;
use std::sync::Arc;

use sentry_model::JobId;
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};

use crate::convert::{chunk_to_job_output, validate_job_id, validate_start_job_request};
use crate::proto::{self, sentry_service_server::SentryService};
use crate::ApiHandler;

/// Backpressure capacity for a single subscriber's channel to the gRPC
/// transport. Matches the broadcaster's own per-subscriber capacity of 1:
/// a slow client backpressures all the way to the child's pipe.
const STREAM_CHANNEL_CAPACITY: usize = 1;

/// gRPC service implementation.
///
/// Wraps an [`ApiHandler`] and implements the generated [`SentryService`]
/// trait; `sentry-server` hands an instance of this to tonic's server
/// builder.
pub struct SentryApiService<H> {
    handler: Arc<H>,
}

impl<H> SentryApiService<H>
where
    H: ApiHandler,
{
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }
}

#[tonic::async_trait]
impl<H> SentryService for SentryApiService<H>
where
    H: ApiHandler,
{
    type StreamJobLogsStream =
        Pin<Box<dyn Stream<Item = Result<proto::JobOutput, Status>> + Send + 'static>>;

    async fn start_job(
        &self,
        request: Request<proto::StartJobRequest>,
    ) -> Result<Response<proto::StartJobResponse>, Status> {
        let req = request.into_inner();
        validate_start_job_request(&req).map_err(Status::from)?;
        let (command, args, limits, chroot) = req.into();

        let job_id = self
            .handler
            .start_job(command, args, limits, chroot)
            .await
            .map_err(Status::from)?;

        Ok(Response::new(proto::StartJobResponse {
            job_id: job_id.to_string(),
        }))
    }

    async fn stop_job(
        &self,
        request: Request<proto::StopJobRequest>,
    ) -> Result<Response<proto::StopJobResponse>, Status> {
        let req = request.into_inner();
        validate_job_id(&req.job_id).map_err(Status::from)?;
        let id = JobId::from(req.job_id);

        match self.handler.stop_job(&id).await {
            Ok(()) => Ok(Response::new(proto::StopJobResponse {
                success: true,
                message: String::new(),
            })),
            Err(err) => Ok(Response::new(proto::StopJobResponse {
                success: false,
                message: err.to_string(),
            })),
        }
    }

    async fn kill_job(
        &self,
        request: Request<proto::KillJobRequest>,
    ) -> Result<Response<proto::KillJobResponse>, Status> {
        let req = request.into_inner();
        validate_job_id(&req.job_id).map_err(Status::from)?;
        let id = JobId::from(req.job_id);

        match self.handler.kill_job(&id).await {
            Ok(()) => Ok(Response::new(proto::KillJobResponse {
                success: true,
                message: String::new(),
            })),
            Err(err) => Ok(Response::new(proto::KillJobResponse {
                success: false,
                message: err.to_string(),
            })),
        }
    }

    async fn get_job_status(
        &self,
        request: Request<proto::JobStatusRequest>,
    ) -> Result<Response<proto::JobStatusResponse>, Status> {
        let req = request.into_inner();
        validate_job_id(&req.job_id).map_err(Status::from)?;
        let id = JobId::from(req.job_id);

        let is_running = self.handler.job_status(&id).await.map_err(Status::from)?;
        Ok(Response::new(proto::JobStatusResponse { is_running }))
    }

    async fn get_job_logs(
        &self,
        request: Request<proto::JobLogsRequest>,
    ) -> Result<Response<proto::JobLogsResponse>, Status> {
        let req = request.into_inner();
        validate_job_id(&req.job_id).map_err(Status::from)?;
        let id = JobId::from(req.job_id);

        let logs = self.handler.job_logs(&id).await.map_err(Status::from)?;
        Ok(Response::new(proto::JobLogsResponse { logs }))
    }

    async fn list_jobs(
        &self,
        _request: Request<proto::ListJobsRequest>,
    ) -> Result<Response<proto::ListJobsResponse>, Status> {
        let jobs = self.handler.list_jobs().await.map_err(Status::from)?;
        let jobs = jobs.into_iter().map(proto::JobInfo::from).collect();
        Ok(Response::new(proto::ListJobsResponse { jobs }))
    }

    async fn stream_job_logs(
        &self,
        request: Request<proto::JobLogsRequest>,
    ) -> Result<Response<Self::StreamJobLogsStream>, Status> {
        let req = request.into_inner();
        validate_job_id(&req.job_id).map_err(Status::from)?;
        let id = JobId::from(req.job_id);
        let job_id_text = id.to_string();

        // No transport-level disconnect signal is wired into this token yet
        // (tonic surfaces that via the response stream being dropped, which
        // we detect below); cancelling here is this request's own escape
        // hatch should a future caller want to cancel independently of the
        // transport.
        let cancel = tokio_util::sync::CancellationToken::new();
        let cancel_for_stream = cancel.clone();

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let handler = self.handler.clone();

        tokio::spawn(async move {
            let (chunk_tx, mut chunk_rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
            let stream_task = handler.stream_job_logs(&id, cancel_for_stream, chunk_tx);
            let forward_task = async {
                while let Some(chunk) = chunk_rx.recv().await {
                    let out = chunk_to_job_output(&job_id_text, chunk);
                    if tx.send(Ok(out)).await.is_err() {
                        // Client disconnected: tell the registry to detach
                        // the subscriber instead of reading until job exit.
                        // Close our half now too: the broadcaster may be
                        // blocked on a send to `chunk_tx` while holding the
                        // job's inner lock, and nobody will drain this
                        // channel again once we stop polling it. Left open,
                        // that send blocks forever on a full buffer and the
                        // lock `detach()` needs never frees. Closing it
                        // makes the send fail immediately instead.
                        cancel.cancel();
                        chunk_rx.close();
                        break;
                    }
                }
            };
            let (result, _) = tokio::join!(stream_task, forward_task);
            if let Err(err) = result {
                let _ = tx.send(Err(Status::from(err))).await;
            }
        });

        Ok(Response::new(Box::pin(ReceiverStream::new(rx))))
    }
}
