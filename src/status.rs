//! Progress lines for long-running steps.
//!
//! A step prints `Message...` when it starts and `done (12.3s)` or `failed`
//! when it ends, so a hung bitbake is visible as an unfinished line.

use std::io::Write;
use std::time::Instant;

/// A running step. Finish it with [`Status::done`] or [`Status::failed`].
pub struct Status {
    start: Instant,
}

impl Status {
    /// Print the step message and start timing it.
    pub fn start(message: impl Into<String>) -> Self {
        print!("{}...", message.into());
        let _ = std::io::stdout().flush();
        Self {
            start: Instant::now(),
        }
    }

    /// Mark the step as finished successfully.
    pub fn done(self) {
        println!("done ({})", format_elapsed(self.start.elapsed().as_secs_f64()));
    }

    /// Mark the step as failed.
    pub fn failed(self) {
        println!("failed ({})", format_elapsed(self.start.elapsed().as_secs_f64()));
    }
}

/// Run `f` as a named step, reporting whether it succeeded.
pub fn step<T, E>(message: impl Into<String>, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    let status = Status::start(message);
    match f() {
        Ok(value) => {
            status.done();
            Ok(value)
        }
        Err(e) => {
            status.failed();
            Err(e)
        }
    }
}

fn format_elapsed(secs: f64) -> String {
    if secs >= 60.0 {
        format!("{:.1}m", secs / 60.0)
    } else {
        format!("{:.1}s", secs)
    }
}
