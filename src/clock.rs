use std::cell::Cell;
use std::time::Instant;

/// Host-provided monotonic time source, in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall clock anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Clock advanced by hand; used by tests and fixed-step tools.
#[derive(Debug, Default)]
pub struct ManualClock {
    t: Cell<f64>,
}

impl ManualClock {
    pub fn new(t: f64) -> Self {
        Self { t: Cell::new(t) }
    }

    pub fn advance(&self, dt: f64) {
        self.t.set(self.t.get() + dt);
    }

    pub fn set(&self, t: f64) {
        self.t.set(t);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.t.get()
    }
}

/// Turns successive timestamps into integration steps.
///
/// The first tick yields zero. Timestamps that go backwards or are not finite
/// also yield zero and leave the reference point unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimClock {
    last: Option<f64>,
    elapsed: f64,
    ticks: u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, now: f64) -> f32 {
        self.ticks += 1;
        if !now.is_finite() {
            return 0.0;
        }
        let dt = match self.last {
            None => 0.0,
            Some(prev) if now >= prev => now - prev,
            Some(_) => return 0.0,
        };
        self.last = Some(now);
        self.elapsed += dt;
        dt as f32
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
