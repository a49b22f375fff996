use super::Result;
use std::{thread, time};

/// Interval between two frames, roughly 60 per second.
pub const FRAME_INTERVAL_MS: u64 = 16;

pub enum Step {
    Cont,
    Done,
}

/// Calls `f` once per frame until it returns `Step::Done` or fails.
pub fn start_loop<F>(f: F) -> Result<()>
where
    F: FnMut() -> Result<Step>,
{
    let looper = BlockingLooper;
    looper.start_loop(f)
}

trait Looper {
    fn start_loop<F>(self, f: F) -> Result<()>
    where
        F: FnMut() -> Result<Step>;
}

struct BlockingLooper;

impl Looper for BlockingLooper {
    fn start_loop<F>(self, mut f: F) -> Result<()>
    where
        F: FnMut() -> Result<Step>,
    {
        let frame_interval = time::Duration::from_millis(FRAME_INTERVAL_MS);
        loop {
            let frame_start = time::Instant::now();

            match f()? {
                Step::Cont => {
                    if let Some(delay) = frame_interval.checked_sub(frame_start.elapsed()) {
                        thread::sleep(delay)
                    }
                }
                Step::Done => return Ok(()),
            }
        }
    }
}
