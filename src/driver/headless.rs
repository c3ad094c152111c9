use std::time::Instant;

use log::info;

use crate::{
    error::FieldError,
    host::Host,
    surface::{HeadlessSurface, Surface},
    ParticleBackground, RunOptions,
};

/// Renders `options.frames` frames off-screen and returns how many ran.
pub fn run_headless(options: &RunOptions) -> Result<u64, FieldError> {
    let host = Host::new(options.viewport);
    let style = options.style.clone();
    let mut background = ParticleBackground::mount(&host, &options.config, move |viewport| {
        if viewport.is_empty() {
            return Err(FieldError::SurfaceUnavailable(format!(
                "cannot render into a {} viewport",
                viewport
            )));
        }
        Ok(Box::new(HeadlessSurface::new(viewport, style)) as Box<dyn Surface>)
    });

    let started = Instant::now();
    let mut frames = 0;
    while frames < options.frames && host.run_frame() > 0 {
        frames += 1;
    }
    let links = background.with_scene(|scene| scene.edges().len());
    background.teardown();

    info!(
        "headless run: {} frames in {:.2?}, {} links in the last frame",
        frames,
        started.elapsed(),
        links.unwrap_or(0)
    );
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::Viewport, DisplayTarget};

    fn options(viewport: Viewport, frames: u64) -> RunOptions {
        let mut options = RunOptions {
            target: DisplayTarget::Headless,
            viewport,
            frames,
            ..RunOptions::default()
        };
        options.config.seed = Some(8);
        options
    }

    #[test]
    fn runs_the_requested_number_of_frames() {
        let ran = run_headless(&options(Viewport::new(64, 48), 10)).unwrap();
        assert_eq!(ran, 10);
    }

    #[test]
    fn empty_viewport_degrades_to_nothing() {
        let ran = run_headless(&options(Viewport::new(0, 48), 10)).unwrap();
        assert_eq!(ran, 0);
    }
}
