//! GPU context handed in by the host, plus a headless device for tools and tests.

use texforge_core::{IngestError, Result};

use crate::error::{RenderError, RenderResult};

/// The device and queue the pipeline works against.
///
/// Both are owned by the host rendering framework; the pipeline only borrows them.
#[derive(Clone, Copy)]
pub struct GpuContext<'a> {
    /// The wgpu device (resource allocation).
    pub device: &'a wgpu::Device,
    /// The wgpu queue (uploads, copies, submissions).
    pub queue: &'a wgpu::Queue,
}

impl<'a> GpuContext<'a> {
    #[must_use]
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> Self {
        Self { device, queue }
    }

    /// Submits `encoder` and blocks until the GPU has finished it.
    ///
    /// Validation and out-of-memory errors raised by the submission are
    /// reported as [`IngestError::ResourceCreation`].
    pub fn submit_and_wait(&self, encoder: wgpu::CommandEncoder, what: &str) -> Result<()> {
        with_error_scope(self.device, what, || {
            self.queue.submit(std::iter::once(encoder.finish()));
        })?;
        let _ = self.device.poll(wgpu::PollType::wait_indefinitely());
        Ok(())
    }
}

/// Runs `f` inside validation and out-of-memory error scopes.
pub(crate) fn with_error_scope<T>(device: &wgpu::Device, what: &str, f: impl FnOnce() -> T) -> Result<T> {
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let value = f();

    let validation = pollster::block_on(device.pop_error_scope());
    let out_of_memory = pollster::block_on(device.pop_error_scope());

    match validation.or(out_of_memory) {
        Some(err) => Err(IngestError::ResourceCreation(format!("{what}: {err}"))),
        None => Ok(value),
    }
}

/// A device and queue created without a window.
pub struct HeadlessGpu {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl HeadlessGpu {
    /// Creates a headless device on any available adapter.
    pub async fn new() -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..wgpu::InstanceDescriptor::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterCreationFailed)?;

        log::info!("headless adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("texforge device (headless)"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;

        Ok(Self { device, queue })
    }

    /// Borrows the device and queue as a [`GpuContext`].
    #[must_use]
    pub fn context(&self) -> GpuContext<'_> {
        GpuContext::new(&self.device, &self.queue)
    }
}
