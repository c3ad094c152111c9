//! The particle background as a mountable component.
//!
//! Mounting wires a [`Scene`] and a [`Surface`] into a [`Host`]: a pointer
//! listener, a resize listener, and a self-renewing animation frame. All of it
//! is owned by the returned [`ParticleBackground`] and released by
//! [`ParticleBackground::teardown`] (or by dropping it).

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use log::{debug, info, trace, warn};

use crate::{
    config::FieldConfig,
    core::{Scene, Viewport},
    error::FieldError,
    host::{FrameHandle, Host, Subscription},
    surface::Surface,
    util::format_mat4,
};

struct FieldState {
    scene: Scene,
    surface: Box<dyn Surface>,
}

impl FieldState {
    fn tick(&mut self) {
        self.scene.tick();
        match self.surface.draw(&self.scene) {
            Ok(stats) => trace!(
                "tick {}: {} links, {} drawn",
                self.scene.ticks(),
                self.scene.edges().len(),
                stats.edges_drawn
            ),
            Err(e) => warn!("frame {} not presented: {}", self.scene.ticks(), e),
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        self.scene.resize(viewport);
        self.surface.resize(viewport);
    }
}

struct Mounted {
    state: Rc<RefCell<FieldState>>,
    frame: Rc<Cell<Option<FrameHandle>>>,
    _pointer: Subscription,
    _resize: Subscription,
}

pub struct ParticleBackground {
    host: Weak<Host>,
    mounted: Option<Mounted>,
}

impl ParticleBackground {
    /// Builds the scene for the host's current viewport and starts animating.
    ///
    /// If `make_surface` fails the component comes up inert: nothing is
    /// drawn, nothing is subscribed, and the failure is only logged.
    pub fn mount<F>(host: &Rc<Host>, config: &FieldConfig, make_surface: F) -> Self
    where
        F: FnOnce(Viewport) -> Result<Box<dyn Surface>, FieldError>,
    {
        let viewport = host.viewport();
        let surface = match make_surface(viewport) {
            Ok(surface) => surface,
            Err(e) => {
                warn!("particle field disabled: {}", e);
                return Self {
                    host: Rc::downgrade(host),
                    mounted: None,
                };
            }
        };

        let scene = Scene::new(config, viewport);
        debug!(
            "{}",
            format_mat4("particle field projection", &scene.camera.projection_matrix())
        );
        let state = Rc::new(RefCell::new(FieldState { scene, surface }));

        let pointer_state = Rc::downgrade(&state);
        let pointer = host.on_pointer_move(move |event| {
            if let Some(state) = pointer_state.upgrade() {
                state.borrow_mut().scene.set_pointer(event.x, event.y);
            }
        });

        let resize_state = Rc::downgrade(&state);
        let resize = host.on_resize(move |viewport| {
            if let Some(state) = resize_state.upgrade() {
                debug!("particle field resized to {}", viewport);
                state.borrow_mut().resize(*viewport);
            }
        });

        let frame = Rc::new(Cell::new(None));
        schedule_frame(host, Rc::downgrade(&state), Rc::clone(&frame));

        info!(
            "particle field mounted: {} particles at {}",
            config.particle_count, viewport
        );

        Self {
            host: Rc::downgrade(host),
            mounted: Some(Mounted {
                state,
                frame,
                _pointer: pointer,
                _resize: resize,
            }),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Read access to the live scene, `None` once torn down or when inert.
    pub fn with_scene<R>(&self, f: impl FnOnce(&Scene) -> R) -> Option<R> {
        self.mounted
            .as_ref()
            .map(|mounted| f(&mounted.state.borrow().scene))
    }

    /// Stops the animation and detaches from the host. The pending frame is
    /// cancelled before this returns, so no tick can follow. Further calls
    /// do nothing.
    pub fn teardown(&mut self) {
        let Some(mounted) = self.mounted.take() else {
            return;
        };

        if let (Some(handle), Some(host)) = (mounted.frame.take(), self.host.upgrade()) {
            host.cancel_frame(handle);
        }
        let ticks = mounted.state.borrow().scene.ticks();
        drop(mounted);

        info!("particle field torn down after {} ticks", ticks);
    }
}

impl Drop for ParticleBackground {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn schedule_frame(
    host: &Rc<Host>,
    state: Weak<RefCell<FieldState>>,
    slot: Rc<Cell<Option<FrameHandle>>>,
) {
    let weak_host = Rc::downgrade(host);
    let next_slot = Rc::clone(&slot);
    let handle = host.request_frame(move || {
        next_slot.set(None);
        let (Some(host), Some(state)) = (weak_host.upgrade(), state.upgrade()) else {
            return;
        };
        state.borrow_mut().tick();
        schedule_frame(&host, Rc::downgrade(&state), next_slot);
    });
    slot.set(Some(handle));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Style, pipeline::FrameStats, surface::HeadlessSurface};

    #[derive(Default)]
    struct Probe {
        draws: Cell<usize>,
        resizes: RefCell<Vec<Viewport>>,
        released: Cell<usize>,
    }

    struct ProbeSurface(Rc<Probe>);

    impl Surface for ProbeSurface {
        fn resize(&mut self, viewport: Viewport) {
            self.0.resizes.borrow_mut().push(viewport);
        }

        fn draw(&mut self, scene: &Scene) -> Result<FrameStats, FieldError> {
            self.0.draws.set(self.0.draws.get() + 1);
            Ok(FrameStats {
                points_drawn: scene.points().len(),
                edges_drawn: scene.edges().len(),
            })
        }
    }

    impl Drop for ProbeSurface {
        fn drop(&mut self) {
            self.0.released.set(self.0.released.get() + 1);
        }
    }

    fn config() -> FieldConfig {
        FieldConfig {
            seed: Some(99),
            ..FieldConfig::default()
        }
    }

    fn mount_probe(host: &Rc<Host>) -> (ParticleBackground, Rc<Probe>) {
        let probe = Rc::new(Probe::default());
        let surface_probe = Rc::clone(&probe);
        let background = ParticleBackground::mount(host, &config(), move |_| {
            Ok(Box::new(ProbeSurface(surface_probe)) as Box<dyn Surface>)
        });
        (background, probe)
    }

    #[test]
    fn mount_generates_the_cloud_and_starts_animating() {
        let host = Host::new(Viewport::new(800, 600));
        let (background, probe) = mount_probe(&host);

        assert!(background.is_mounted());
        assert_eq!(host.listener_count(), 2);
        assert_eq!(host.pending_frames(), 1);
        let count = background.with_scene(|s| s.base_points().len());
        assert_eq!(count, Some(150));

        for _ in 0..5 {
            assert_eq!(host.run_frame(), 1);
        }
        assert_eq!(probe.draws.get(), 5);
        assert_eq!(background.with_scene(|s| s.ticks()), Some(5));
        assert_eq!(host.pending_frames(), 1);
    }

    #[test]
    fn pointer_moves_take_effect_on_next_tick() {
        let host = Host::new(Viewport::new(800, 600));
        let (background, _probe) = mount_probe(&host);

        host.dispatch_pointer_move(800.0, 600.0);
        assert_eq!(background.with_scene(|s| s.rotation().y), Some(0.0));

        host.run_frame();
        let rot = background.with_scene(|s| s.rotation()).unwrap();
        assert!((rot.y - (0.001 + 0.5 * 0.01)).abs() < 1e-7);
        assert!((rot.x - (0.0005 + 0.5 * 0.01)).abs() < 1e-7);
    }

    #[test]
    fn resize_reaches_camera_and_surface_but_keeps_the_cloud() {
        let host = Host::new(Viewport::new(800, 600));
        let (background, probe) = mount_probe(&host);
        host.run_frame();
        let points = background.with_scene(|s| s.points().to_vec()).unwrap();
        let rotation = background.with_scene(|s| s.rotation()).unwrap();

        host.dispatch_resize(Viewport::new(1024, 768));

        assert_eq!(
            background.with_scene(|s| s.camera.aspect_ratio()),
            Some(1024.0 / 768.0)
        );
        assert_eq!(background.with_scene(|s| s.points().to_vec()), Some(points));
        assert_eq!(background.with_scene(|s| s.rotation()), Some(rotation));
        assert_eq!(*probe.resizes.borrow(), vec![Viewport::new(1024, 768)]);
    }

    #[test]
    fn teardown_leaves_nothing_behind() {
        let host = Host::new(Viewport::new(800, 600));
        let (mut background, probe) = mount_probe(&host);
        host.run_frame();
        host.run_frame();

        background.teardown();

        assert!(!background.is_mounted());
        assert_eq!(host.listener_count(), 0);
        assert_eq!(host.pending_frames(), 0);
        assert_eq!(probe.released.get(), 1);

        assert_eq!(host.dispatch_pointer_move(10.0, 10.0), 0);
        assert_eq!(host.dispatch_resize(Viewport::new(640, 480)), 0);
        assert_eq!(host.run_frame(), 0);
        assert_eq!(probe.draws.get(), 2);
        assert!(probe.resizes.borrow().is_empty());
    }

    #[test]
    fn teardown_twice_is_a_no_op() {
        let host = Host::new(Viewport::new(800, 600));
        let (mut background, probe) = mount_probe(&host);

        background.teardown();
        background.teardown();
        drop(background);

        assert_eq!(probe.released.get(), 1);
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn dropping_the_component_tears_it_down() {
        let host = Host::new(Viewport::new(800, 600));
        let (background, probe) = mount_probe(&host);
        drop(background);

        assert_eq!(host.listener_count(), 0);
        assert_eq!(host.pending_frames(), 0);
        assert_eq!(probe.released.get(), 1);
    }

    #[test]
    fn teardown_from_an_earlier_frame_callback_prevents_the_tick() {
        let host = Host::new(Viewport::new(800, 600));
        let slot: Rc<RefCell<Option<ParticleBackground>>> = Rc::new(RefCell::new(None));

        // queued ahead of the component's first frame
        let victim = Rc::clone(&slot);
        host.request_frame(move || {
            if let Some(background) = victim.borrow_mut().as_mut() {
                background.teardown();
            }
        });
        let (background, probe) = mount_probe(&host);
        *slot.borrow_mut() = Some(background);

        assert_eq!(host.run_frame(), 1);
        assert_eq!(probe.draws.get(), 0);
        assert_eq!(host.pending_frames(), 0);
    }

    #[test]
    fn failed_surface_mounts_inert() {
        let host = Host::new(Viewport::new(800, 600));
        let mut background = ParticleBackground::mount(&host, &config(), |_| {
            Err(FieldError::SurfaceUnavailable("no context".into()))
        });

        assert!(!background.is_mounted());
        assert_eq!(host.listener_count(), 0);
        assert_eq!(host.pending_frames(), 0);
        assert_eq!(background.with_scene(|s| s.ticks()), None);
        background.teardown();
    }

    #[test]
    fn mounts_on_one_host_are_independent() {
        let host = Host::new(Viewport::new(800, 600));
        let (mut first, first_probe) = mount_probe(&host);
        let (second, second_probe) = mount_probe(&host);

        host.run_frame();
        first.teardown();
        host.run_frame();

        assert_eq!(first_probe.draws.get(), 1);
        assert_eq!(second_probe.draws.get(), 2);
        assert_eq!(host.listener_count(), 2);
        assert!(second.is_mounted());
    }

    #[test]
    fn headless_surface_renders_real_frames() {
        let host = Host::new(Viewport::new(160, 120));
        let mut background = ParticleBackground::mount(&host, &config(), |vp| {
            Ok(Box::new(HeadlessSurface::new(vp, Style::default())) as Box<dyn Surface>)
        });
        for _ in 0..3 {
            host.run_frame();
        }
        assert_eq!(background.with_scene(|s| s.ticks()), Some(3));
        background.teardown();
        assert_eq!(host.pending_frames(), 0);
    }
}
