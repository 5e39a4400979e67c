//! The gRPC façade: generated proto types, domain⟷wire conversions, the
//! `ApiHandler` trait that keeps the tonic service decoupled from
//! `sentry-core`, and a ready-made adapter over `sentry_core::JobRegistry`.

pub mod proto {
    tonic::include_proto!("sentry");
}

mod adapter;
mod convert;
mod error;
mod grpc;
mod handler;

pub use adapter::RegistryApiAdapter;
pub use error::ApiError;
pub use grpc::SentryApiService;
pub use handler::ApiHandler;
