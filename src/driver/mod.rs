//! Native event loops. Each one owns a [`Host`](crate::host::Host), mounts a
//! [`ParticleBackground`](crate::ParticleBackground) on it and pumps real
//! input, resize and frame events into it until the user quits.

pub mod headless;
pub mod terminal;
pub mod window;

use crate::{error::FieldError, DisplayTarget, RunOptions};

pub fn run(options: &RunOptions) -> Result<(), FieldError> {
    match options.target {
        DisplayTarget::Window => window::run_window(options),
        DisplayTarget::Terminal => terminal::run_terminal(options),
        DisplayTarget::Headless => headless::run_headless(options).map(|_| ()),
    }
}
