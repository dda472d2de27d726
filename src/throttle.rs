//! Randomized politeness delay between requests.
//!
//! Each delay is `min + Exp(mean - min)`: never below `min`, `mean` on
//! average.

use std::time::Duration;

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

pub trait Sleeper {
    fn sleep(&mut self, delay: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

pub struct Throttle<S = ThreadSleeper> {
    min: Duration,
    jitter_mean_secs: f64,
    rng: StdRng,
    sleeper: S,
}

impl Throttle<ThreadSleeper> {
    pub fn new(min: Duration, mean: Duration) -> Result<Self> {
        Self::with_parts(min, mean, StdRng::from_entropy(), ThreadSleeper)
    }
}

impl<S: Sleeper> Throttle<S> {
    pub fn with_parts(min: Duration, mean: Duration, rng: StdRng, sleeper: S) -> Result<Self> {
        if mean < min {
            bail!(
                "Mean delay {:.1}s is below the minimum delay {:.1}s",
                mean.as_secs_f64(),
                min.as_secs_f64()
            );
        }
        Ok(Throttle {
            min,
            jitter_mean_secs: (mean - min).as_secs_f64(),
            rng,
            sleeper,
        })
    }

    /// Draw the next delay without sleeping.
    pub fn next_delay(&mut self) -> Duration {
        if self.jitter_mean_secs == 0.0 {
            return self.min;
        }
        // Inverse CDF of the exponential; 1 - u lies in (0, 1].
        let u: f64 = self.rng.gen();
        let jitter = -self.jitter_mean_secs * (1.0 - u).ln();
        self.min + Duration::from_secs_f64(jitter)
    }

    pub fn wait(&mut self) -> Duration {
        let delay = self.next_delay();
        debug!("Sleep for {:.0} seconds", delay.as_secs_f64());
        self.sleeper.sleep(delay);
        delay
    }

    #[cfg(test)]
    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }
}
