//! Kinetrace Core - Device-agnostic motion telemetry recording
//!
//! This crate provides the recording half of the Kinetrace system:
//! - Normalized per-frame samples (head pose, controllers, buttons)
//! - The wire encodings shared by backup files and the remote collector
//! - The buffering/flush pipeline with its session lifecycle
//! - Capability contracts decoupling frame producers ([`SourceAdapter`])
//!   and transports ([`Uploader`]) from the pipeline

pub mod codec;
pub mod config;
pub mod pipeline;
pub mod sample;
pub mod session;
pub mod source;
pub mod uploader;

pub use codec::{CodecError, CSV_HEADER};
pub use config::SessionConfig;
pub use pipeline::TelemetryPipeline;
pub use sample::{ControllerState, InputState, Pose, Sample};
pub use source::{NullSource, SourceAdapter};
pub use uploader::Uploader;
