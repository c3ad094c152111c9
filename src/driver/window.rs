use std::{
    cell::{OnceCell, RefCell},
    rc::Rc,
};

use log::{debug, info};
use minifb::{Key, MouseMode, Scale, Window, WindowOptions};

use crate::{
    config::Style,
    core::{Scene, Viewport},
    error::FieldError,
    host::Host,
    pipeline::{Buffer, FrameBuffer, FrameStats, Pipeline},
    surface::Surface,
    Metrics, ParticleBackground, RunOptions,
};

/// Full-window surface. The window itself is shared with the event loop,
/// which polls it for input between frames.
pub struct WindowSurface {
    window: Rc<RefCell<Window>>,
    pipeline: Pipeline<FrameBuffer>,
    metrics: Metrics,
}

impl WindowSurface {
    pub fn new(window: Rc<RefCell<Window>>, viewport: Viewport, style: Style) -> Self {
        Self {
            window,
            pipeline: Pipeline::new(viewport, style),
            metrics: Metrics::new(),
        }
    }
}

impl Surface for WindowSurface {
    fn resize(&mut self, viewport: Viewport) {
        self.pipeline.resize(viewport);
    }

    fn draw(&mut self, scene: &Scene) -> Result<FrameStats, FieldError> {
        let stats = self.pipeline.render(scene);
        let buffer = self.pipeline.buffer();

        let mut window = self.window.borrow_mut();
        window.update_with_buffer(buffer.data(), buffer.width(), buffer.height())?;

        self.metrics.tick();
        window.set_title(&format!(
            "particle_field | {} | {} links",
            self.metrics, stats.edges_drawn
        ));
        Ok(stats)
    }
}

impl Drop for WindowSurface {
    fn drop(&mut self) {
        debug!("window surface released");
    }
}

struct Input {
    quit: bool,
    size: (usize, usize),
    mouse: Option<(f32, f32)>,
}

fn poll(window: &RefCell<Window>) -> Input {
    let window = window.borrow();
    Input {
        quit: !window.is_open() || window.is_key_down(Key::Escape) || window.is_key_down(Key::Q),
        size: window.get_size(),
        mouse: window.get_mouse_pos(MouseMode::Pass),
    }
}

fn open_window(viewport: Viewport, fps: usize) -> Result<Window, FieldError> {
    let mut window = Window::new(
        "particle_field",
        viewport.width,
        viewport.height,
        WindowOptions {
            resize: true,
            scale: Scale::X1,
            ..WindowOptions::default()
        },
    )
    .map_err(|e| FieldError::SurfaceUnavailable(e.to_string()))?;
    window.set_target_fps(fps);
    Ok(window)
}

/// Mounts the field on a window opened by the surface factory itself, so a
/// window that cannot be opened leaves the component inert. The window is
/// handed back for the event loop when it exists.
fn mount_on_window<W, O, S>(
    host: &Rc<Host>,
    options: &RunOptions,
    open: O,
    wrap: S,
) -> (ParticleBackground, Option<Rc<RefCell<W>>>)
where
    W: 'static,
    O: FnOnce(Viewport) -> Result<W, FieldError>,
    S: FnOnce(Rc<RefCell<W>>, Viewport) -> Box<dyn Surface>,
{
    let opened: Rc<OnceCell<Rc<RefCell<W>>>> = Rc::new(OnceCell::new());
    let slot = Rc::clone(&opened);
    let background = ParticleBackground::mount(host, &options.config, move |viewport| {
        let window = Rc::new(RefCell::new(open(viewport)?));
        let _ = slot.set(Rc::clone(&window));
        Ok(wrap(window, viewport))
    });
    let window = opened.get().cloned();
    (background, window)
}

pub fn run_window(options: &RunOptions) -> Result<(), FieldError> {
    let host = Host::new(options.viewport);
    let style = options.style.clone();
    let fps = options.fps;
    let (mut background, window) = mount_on_window(
        &host,
        options,
        |viewport| open_window(viewport, fps),
        move |window, viewport| {
            Box::new(WindowSurface::new(window, viewport, style)) as Box<dyn Surface>
        },
    );

    // the component already logged why it came up inert
    let Some(window) = window else {
        return Err(FieldError::SurfaceUnavailable(
            "no window could be opened, particle field is inert".into(),
        ));
    };
    let Viewport { width, height } = options.viewport;
    info!("window driver started at {}x{}", width, height);

    let mut last_size = (width, height);
    let mut last_mouse = None;
    loop {
        // no borrow of the window may be held across dispatch or run_frame
        let input = poll(&window);
        if input.quit {
            break;
        }

        if input.size != last_size && input.size.0 > 0 && input.size.1 > 0 {
            last_size = input.size;
            host.dispatch_resize(Viewport::new(input.size.0, input.size.1));
        }
        if input.mouse.is_some() && input.mouse != last_mouse {
            last_mouse = input.mouse;
            if let Some((x, y)) = input.mouse {
                host.dispatch_pointer_move(x, y);
            }
        }

        if host.run_frame() == 0 {
            // nothing presented this round; keep the window's events flowing
            window.borrow_mut().update();
        }
    }

    background.teardown();
    info!("window driver stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;

    #[test]
    fn unopenable_window_leaves_the_field_inert() {
        let host = Host::new(Viewport::new(320, 200));
        let (background, window) = mount_on_window(
            &host,
            &RunOptions::default(),
            |_| -> Result<(), FieldError> {
                Err(FieldError::SurfaceUnavailable("no display".into()))
            },
            |_, viewport| Box::new(HeadlessSurface::new(viewport, Style::default())) as Box<dyn Surface>,
        );

        assert!(window.is_none());
        assert!(!background.is_mounted());
        assert_eq!(host.listener_count(), 0);
        assert_eq!(host.pending_frames(), 0);
    }

    #[test]
    fn opened_window_is_shared_with_the_event_loop() {
        let host = Host::new(Viewport::new(320, 200));
        let (mut background, window) = mount_on_window(
            &host,
            &RunOptions::default(),
            |viewport| Ok(viewport),
            |_, viewport| Box::new(HeadlessSurface::new(viewport, Style::default())) as Box<dyn Surface>,
        );

        assert_eq!(window.as_ref().map(|w| *w.borrow()), Some(Viewport::new(320, 200)));
        assert!(background.is_mounted());
        assert_eq!(host.run_frame(), 1);
        background.teardown();
    }
}
