//! Buffering, flush policy, and session lifecycle

use std::path::Path;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::codec;
use crate::config::{SessionConfig, DEFAULT_MAX_SAMPLES_PER_FILE};
use crate::sample::Sample;
use crate::session;
use crate::uploader::Uploader;

/// Lifecycle states. Transitions are linear; `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineState {
    Uninitialized,
    Active,
    ShuttingDown,
    Closed,
}

/// Collects normalized samples into an in-memory buffer and flushes them in
/// batches to a local CSV backup and/or a remote collector.
///
/// The pipeline is built to sit inside a host application's frame loop: no
/// operation panics across the API boundary, lifecycle misuse degrades to a
/// logged no-op, and a failed backup write or upload never stops recording.
/// A full buffer is flushed and cleared regardless of delivery outcome, so
/// memory use stays bounded even with the network down.
///
/// Single ownership is the concurrency model; `&mut self` receivers make
/// the one-caller-at-a-time rule a compile-time property.
pub struct TelemetryPipeline {
    state: PipelineState,
    uploader: Option<Box<dyn Uploader>>,
    config: SessionConfig,
    buffer: Vec<Sample>,
    base_filename: String,
    current_file_index: u32,
    total_samples: u64,
}

impl TelemetryPipeline {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Uninitialized,
            uploader: None,
            config: SessionConfig::default(),
            buffer: Vec::with_capacity(DEFAULT_MAX_SAMPLES_PER_FILE),
            base_filename: String::new(),
            current_file_index: 0,
            total_samples: 0,
        }
    }

    /// Start a recording session.
    ///
    /// Returns `true` once the pipeline is active. Calling again while
    /// active is a no-op returning `true`; calling after [`shutdown`]
    /// returns `false`, the pipeline does not restart. A missing uploader
    /// or an uploader that fails to initialize leaves the pipeline
    /// uninitialized. Session registration failure is non-fatal: local
    /// backup still works without the collector.
    ///
    /// [`shutdown`]: TelemetryPipeline::shutdown
    pub fn initialize(
        &mut self,
        uploader: Option<Box<dyn Uploader>>,
        config: SessionConfig,
        device_description: &str,
    ) -> bool {
        match self.state {
            PipelineState::Active => {
                debug!("pipeline already initialized");
                return true;
            }
            PipelineState::ShuttingDown | PipelineState::Closed => {
                warn!("pipeline already shut down; not restarting");
                return false;
            }
            PipelineState::Uninitialized => {}
        }

        let Some(mut uploader) = uploader else {
            warn!("no uploader provided; pipeline stays uninitialized");
            return false;
        };

        let mut config = config;
        config.max_samples_per_file = config.max_samples_per_file.max(1);

        if !uploader.initialize(&config) {
            warn!("uploader failed to initialize; pipeline stays uninitialized");
            return false;
        }

        if config.enable_cloud_upload && !uploader.create_session(device_description) {
            warn!("session registration failed; continuing with local backup only");
        }

        self.base_filename = session::base_filename_at(Local::now());
        self.config = config;
        self.uploader = Some(uploader);
        self.state = PipelineState::Active;

        info!(
            session = %self.session_id(),
            base = %self.base_filename,
            max_samples = self.config.max_samples_per_file,
            "telemetry pipeline initialized"
        );
        true
    }

    /// Append one sample to the buffer, flushing when the configured
    /// threshold is reached. Ignored unless the pipeline is active.
    pub fn record(&mut self, sample: Sample) {
        if self.state != PipelineState::Active {
            return;
        }
        self.buffer.push(sample);
        self.total_samples += 1;
        if self.buffer.len() >= self.config.max_samples_per_file {
            self.flush_buffer();
        }
    }

    /// Flush whatever is buffered right now, without waiting for the
    /// threshold. Ignored unless the pipeline is active; an empty buffer
    /// produces no file and no upload.
    pub fn force_flush(&mut self) {
        if self.state != PipelineState::Active {
            return;
        }
        debug!(buffered = self.buffer.len(), "force flush requested");
        self.flush_buffer();
    }

    /// End the session: flush any remaining samples, shut the uploader
    /// down, and close the pipeline for good. Idempotent; calls before
    /// [`initialize`] or after the first shutdown do nothing.
    ///
    /// [`initialize`]: TelemetryPipeline::initialize
    pub fn shutdown(&mut self) {
        if self.state != PipelineState::Active {
            return;
        }
        self.state = PipelineState::ShuttingDown;
        info!(buffered = self.buffer.len(), "shutting down telemetry pipeline");

        if !self.buffer.is_empty() {
            self.flush_buffer();
        }

        if let Some(mut uploader) = self.uploader.take() {
            uploader.shutdown();
        }

        info!(
            total_samples = self.total_samples,
            files = self.current_file_index,
            "telemetry pipeline shut down"
        );
        self.state = PipelineState::Closed;
    }

    /// Flush the buffer to the enabled destinations, then clear it and
    /// advance the file index. The clear is unconditional: a failed write
    /// or upload drops the batch rather than growing the buffer without
    /// bound.
    fn flush_buffer(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let filename = self.current_filename();

        if self.config.enable_local_backup {
            let path = self.config.output_dir.join(&filename);
            match self.write_backup(&path) {
                Ok(()) => {
                    info!(
                        samples = self.buffer.len(),
                        path = %path.display(),
                        "wrote local backup"
                    );
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "local backup write failed");
                }
            }
        }

        if self.config.enable_cloud_upload {
            if let Some(uploader) = self.uploader.as_mut() {
                if uploader.upload_frame_batch(&self.buffer, &filename) {
                    info!(samples = self.buffer.len(), file = %filename, "uploaded batch");
                } else {
                    warn!(
                        samples = self.buffer.len(),
                        file = %filename,
                        "batch upload failed; batch dropped"
                    );
                }
            }
        }

        self.buffer.clear();
        self.current_file_index += 1;
    }

    fn write_backup(&self, path: &Path) -> std::io::Result<()> {
        let mut content = String::with_capacity((self.buffer.len() + 1) * 192);
        content.push_str(codec::CSV_HEADER);
        content.push('\n');
        for sample in &self.buffer {
            content.push_str(&codec::encode_row(sample));
            content.push('\n');
        }
        std::fs::write(path, content)
    }

    /// Whether the pipeline is active and holding an uploader
    pub fn is_ready(&self) -> bool {
        self.state == PipelineState::Active && self.uploader.is_some()
    }

    /// Session identifier, or `"no_session"` when no uploader is held
    pub fn session_id(&self) -> &str {
        self.uploader
            .as_ref()
            .map(|u| u.session_id())
            .unwrap_or("no_session")
    }

    /// Samples recorded over the whole session, flushed or not
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    /// Number of buffer flushes completed so far
    pub fn current_file_index(&self) -> u32 {
        self.current_file_index
    }

    /// Samples currently waiting in the buffer
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Session-scoped base filename (empty before initialization)
    pub fn base_filename(&self) -> &str {
        &self.base_filename
    }

    /// Filename the next flush will write
    pub fn current_filename(&self) -> String {
        session::part_filename(&self.base_filename, self.current_file_index)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Replace the configuration wholesale; takes effect from the next
    /// flush decision onward
    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
        self.config.max_samples_per_file = self.config.max_samples_per_file.max(1);
    }
}

impl Default for TelemetryPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TelemetryPipeline {
    fn drop(&mut self) {
        // last-chance flush for hosts that drop the pipeline while active
        self.shutdown();
    }
}
