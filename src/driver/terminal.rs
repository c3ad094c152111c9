use crossterm::{
    cursor::{Hide, Show},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use log::{error, info};
use std::{
    io::{self, stdout},
    panic,
    time::{Duration, Instant},
};

use crate::{
    config::Style,
    core::{Scene, Viewport},
    error::FieldError,
    host::Host,
    pipeline::{FrameStats, Pipeline, TermBuffer},
    surface::Surface,
    ParticleBackground, RunOptions,
};

/// Each terminal cell carries two vertically stacked pixels.
pub fn viewport_for(cols: u16, rows: u16) -> Viewport {
    Viewport::new(cols as usize, rows as usize * 2)
}

pub struct TerminalSurface {
    pipeline: Pipeline<TermBuffer>,
}

impl TerminalSurface {
    pub fn new(viewport: Viewport, style: Style) -> Result<Self, FieldError> {
        if viewport.is_empty() {
            return Err(FieldError::SurfaceUnavailable(format!(
                "terminal too small ({})",
                viewport
            )));
        }
        Ok(Self {
            pipeline: Pipeline::new(viewport, style),
        })
    }
}

impl Surface for TerminalSurface {
    fn resize(&mut self, viewport: Viewport) {
        self.pipeline.resize(viewport);
    }

    fn draw(&mut self, scene: &Scene) -> Result<FrameStats, FieldError> {
        let stats = self.pipeline.render(scene);
        let mut out = stdout().lock();
        self.pipeline.buffer().present(&mut out)?;
        Ok(stats)
    }
}

fn cleanup_terminal() -> io::Result<()> {
    let mut stdout = stdout();
    disable_raw_mode()?;
    execute!(stdout, Show, DisableMouseCapture, LeaveAlternateScreen)?;
    Ok(())
}

/// Raw mode, alternate screen and mouse capture for as long as it lives.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        // Set up panic hook for terminal cleanup
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = cleanup_terminal();
            error!("Panic occurred: {:?}", panic_info);
            original_hook(panic_info);
        }));

        enable_raw_mode()?;
        execute!(
            stdout(),
            EnterAlternateScreen,
            Hide,
            EnableMouseCapture,
            Clear(ClearType::All)
        )?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = cleanup_terminal() {
            error!("failed to restore terminal: {}", e);
        }
    }
}

fn is_quit(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

pub fn run_terminal(options: &RunOptions) -> Result<(), FieldError> {
    let _guard = TerminalGuard::enter()?;

    let (cols, rows) = terminal::size()?;
    let host = Host::new(viewport_for(cols, rows));
    let style = options.style.clone();
    let mut background = ParticleBackground::mount(&host, &options.config, move |viewport| {
        TerminalSurface::new(viewport, style).map(|s| Box::new(s) as Box<dyn Surface>)
    });
    info!("terminal driver started at {}x{} cells", cols, rows);

    let frame_budget = Duration::from_secs_f64(1.0 / options.fps.max(1) as f64);
    let mut frame_start = Instant::now();

    'mainloop: loop {
        let timeout = frame_budget.saturating_sub(frame_start.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if is_quit(key.code, key.modifiers) {
                        break 'mainloop;
                    }
                }
                Event::Mouse(mouse) => {
                    if matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) {
                        host.dispatch_pointer_move(mouse.column as f32, mouse.row as f32 * 2.0);
                    }
                }
                Event::Resize(cols, rows) => {
                    host.dispatch_resize(viewport_for(cols, rows));
                }
                _ => {}
            }
            continue;
        }

        host.run_frame();
        frame_start = Instant::now();
    }

    background.teardown();
    info!("terminal driver stopped");
    Ok(())
}
