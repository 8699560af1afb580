use std::time::Duration;

use crate::layers::GradientLayer;
use crate::markup::Element;
use crate::renderer::{GradientRenderer, RenderError};

/// What the capability probe learned about the selected adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterSummary {
    pub name: String,
    pub backend: String,
    pub software: bool,
}

pub type ProbeFn = Box<dyn Fn() -> Result<AdapterSummary, RenderError>>;

/// Requests any GPU adapter without a surface. Failing to get one means the
/// animated background has no graphics context to run on.
#[cfg(feature = "gpu-probe")]
pub fn probe_adapter() -> Result<AdapterSummary, RenderError> {
    let instance = wgpu::Instance::default();
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::LowPower,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .map_err(|err| RenderError::Unsupported(format!("no GPU adapter available: {err}")))?;

    let info = adapter.get_info();
    let lower_name = info.name.to_ascii_lowercase();
    let lower_driver = info.driver.to_ascii_lowercase();
    let software = matches!(info.device_type, wgpu::DeviceType::Cpu)
        || lower_name.contains("llvmpipe")
        || lower_name.contains("softpipe")
        || lower_driver.contains("llvmpipe");

    Ok(AdapterSummary {
        name: info.name,
        backend: format!("{:?}", info.backend),
        software,
    })
}

/// Mounts the inner renderer only when the probe reports an adapter.
pub struct GpuGatedRenderer<R> {
    inner: R,
    probe: ProbeFn,
    adapter: Option<AdapterSummary>,
}

impl<R: GradientRenderer> GpuGatedRenderer<R> {
    #[cfg(feature = "gpu-probe")]
    pub fn new(inner: R) -> Self {
        Self::with_probe(inner, Box::new(probe_adapter))
    }

    pub fn with_probe(inner: R, probe: ProbeFn) -> Self {
        Self {
            inner,
            probe,
            adapter: None,
        }
    }

    pub fn adapter(&self) -> Option<&AdapterSummary> {
        self.adapter.as_ref()
    }
}

impl<R: GradientRenderer> GradientRenderer for GpuGatedRenderer<R> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn mount(&mut self, layers: &[GradientLayer]) -> Result<(), RenderError> {
        let adapter = (self.probe)()?;
        if adapter.software {
            tracing::info!(adapter = %adapter.name, "software rasterizer detected; effects may be slow");
        } else {
            tracing::debug!(adapter = %adapter.name, backend = %adapter.backend, "GPU adapter available");
        }
        self.adapter = Some(adapter);
        self.inner.mount(layers)
    }

    fn render(
        &mut self,
        layers: &[GradientLayer],
        period: Duration,
    ) -> Result<Element, RenderError> {
        if self.adapter.is_none() {
            return Err(RenderError::Render("graphics context was not acquired".into()));
        }
        self.inner.render(layers, period)
    }

    fn release(&mut self) {
        self.adapter = None;
        self.inner.release();
    }
}
