use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use backdrop::{
    BoxedRenderer, Element, GradientLayer, GradientRenderer, Node, RenderError, SvgMeshRenderer,
};
use boundary::{theme_provider, Boundary, DeferredQueue, RendererFactory, Resolution, Tier};
use tracing_subscriber::EnvFilter;

use crate::cli::{RenderArgs, SimulatedFailure};
use crate::paths::AppPaths;
use crate::theme::LoadedTheme;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Renders the backdrop once through the boundary and writes the markup.
pub fn render(args: RenderArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let loaded = LoadedTheme::load(&paths, args.theme.as_deref())?;
    let mode = loaded.build_mode(args.dev);
    tracing::debug!(
        config = %paths.config_dir().display(),
        theme = ?loaded.path,
        ?mode,
        "resolved momentum configuration"
    );

    let queue = DeferredQueue::new();
    let mut boundary = Boundary::new(
        renderer_factory(args.simulate_failure, args.gpu_probe),
        theme_provider(loaded.resolver()),
    )
    .with_children(content_nodes(&args.content))
    .with_settings(loaded.settings())
    .with_mode(mode)
    .with_resolution(if args.immediate {
        Resolution::Immediate
    } else {
        Resolution::Deferred
    })
    .with_retry_hook(|| tracing::info!("retry requested"));

    boundary.mount(&queue);
    if !args.loading {
        queue.run_pending();
    }
    let mut view = boundary.view();

    let mut retries = args.retries;
    while view.tier == Tier::ErrorFallback && retries > 0 {
        if !boundary.click_retry(&queue) {
            break;
        }
        retries -= 1;
        queue.run_pending();
        view = boundary.view();
    }

    tracing::info!(
        tier = %view.tier,
        state = boundary.state().label(),
        attempts = boundary.attempts(),
        "rendered backdrop"
    );
    let markup = view.element.render().context("failed to serialise markup")?;
    boundary.unmount();
    write_output(args.output.as_deref(), &markup)
}

fn content_nodes(content: &[String]) -> Vec<Node> {
    content
        .iter()
        .map(|text| Element::new("p").text(text.as_str()).into())
        .collect()
}

fn renderer_factory(failure: SimulatedFailure, gpu_probe: bool) -> RendererFactory {
    let mut attempt = 0;
    Box::new(move || {
        attempt += 1;
        let renderer = SimulatedRenderer {
            inner: SvgMeshRenderer::new(),
            fail: failure.fails(attempt),
        };
        gated(renderer, gpu_probe)
    })
}

#[cfg(feature = "gpu-probe")]
fn gated(renderer: SimulatedRenderer, gpu_probe: bool) -> BoxedRenderer {
    if gpu_probe {
        Box::new(backdrop::GpuGatedRenderer::new(renderer))
    } else {
        Box::new(renderer)
    }
}

#[cfg(not(feature = "gpu-probe"))]
fn gated(renderer: SimulatedRenderer, gpu_probe: bool) -> BoxedRenderer {
    if gpu_probe {
        tracing::warn!("--gpu-probe ignored; built without the gpu-probe feature");
    }
    Box::new(renderer)
}

/// Mesh renderer that can be told to fail its mount.
struct SimulatedRenderer {
    inner: SvgMeshRenderer,
    fail: bool,
}

impl GradientRenderer for SimulatedRenderer {
    fn name(&self) -> &str {
        if self.fail {
            "simulated-failure"
        } else {
            self.inner.name()
        }
    }

    fn mount(&mut self, layers: &[GradientLayer]) -> Result<(), RenderError> {
        if self.fail {
            return Err(RenderError::Init("simulated renderer failure".into()));
        }
        self.inner.mount(layers)
    }

    fn render(
        &mut self,
        layers: &[GradientLayer],
        period: Duration,
    ) -> Result<Element, RenderError> {
        self.inner.render(layers, period)
    }

    fn release(&mut self) {
        self.inner.release();
    }
}

fn write_output(path: Option<&Path>, markup: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(path, markup)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = markup.len(), "wrote backdrop markup");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{markup}").context("failed to write markup to stdout")?;
        }
    }
    Ok(())
}
