use std::fmt::{Display, Formatter};
use std::mem;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::debug;

use crate::Error::TimerThreadError;
use crate::Result;

/// Tick frequencies the periodic timer can run at.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SampleRate {
    Hz500,
    #[default]
    Hz1000,
    Hz2000,
    Hz4000,
    Hz8000,
    Hz16000,
}

impl SampleRate {
    pub const ALL: [SampleRate; 6] = [
        SampleRate::Hz500,
        SampleRate::Hz1000,
        SampleRate::Hz2000,
        SampleRate::Hz4000,
        SampleRate::Hz8000,
        SampleRate::Hz16000,
    ];

    /// Ticks per second.
    pub fn hz(self) -> u32 {
        match self {
            SampleRate::Hz500 => 500,
            SampleRate::Hz1000 => 1000,
            SampleRate::Hz2000 => 2000,
            SampleRate::Hz4000 => 4000,
            SampleRate::Hz8000 => 8000,
            SampleRate::Hz16000 => 16000,
        }
    }

    /// Time between two ticks.
    pub fn period(self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.hz() as u64)
    }
}

impl FromStr for SampleRate {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SampleRate::ALL
            .iter()
            .copied()
            .find(|rate| rate.hz().to_string() == s)
            .ok_or_else(|| format!("{} is not a supported sample rate", s))
    }
}

impl Display for SampleRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Hz", self.hz())
    }
}

/// Work done once per timer tick.
///
/// Implementors must return quickly: a tick that runs longer than the period
/// delays the next one.
pub trait Tick: Send + 'static {
    fn tick(&mut self);
}

enum Driver<T> {
    Idle(T),
    Running {
        halt: Arc<AtomicBool>,
        handle: JoinHandle<T>,
    },
    // the tick state went down with a panicked or unspawned thread
    Faulted,
}

/// Runs a [`Tick`] on a dedicated thread at a fixed [`SampleRate`].
///
/// The tick state moves into the thread on [`start`](PeriodicTimer::start) and
/// comes back on [`stop`](PeriodicTimer::stop), so a restart picks up exactly
/// where the previous run left off.
pub struct PeriodicTimer<T: Tick> {
    rate: SampleRate,
    driver: Driver<T>,
}

impl<T: Tick> PeriodicTimer<T> {
    /// A stopped timer holding `task`.
    pub fn new(rate: SampleRate, task: T) -> Self {
        Self {
            rate,
            driver: Driver::Idle(task),
        }
    }

    pub fn rate(&self) -> SampleRate {
        self.rate
    }

    /// False once the tick thread has exited, even before [`stop`](PeriodicTimer::stop)
    /// has collected it.
    pub fn is_running(&self) -> bool {
        match &self.driver {
            Driver::Running { handle, .. } => !handle.is_finished(),
            _ => false,
        }
    }

    /// The tick state, available while the timer is stopped.
    pub fn task(&self) -> Option<&T> {
        match &self.driver {
            Driver::Idle(task) => Some(task),
            _ => None,
        }
    }

    /// Start ticking. Does nothing if already running.
    ///
    /// A failed thread spawn is terminal: the tick state went into the spawn
    /// closure and is gone, so every later `start` returns an error.
    pub fn start(&mut self) -> Result<()> {
        match mem::replace(&mut self.driver, Driver::Faulted) {
            Driver::Idle(task) => {
                let halt = Arc::new(AtomicBool::new(false));
                let period = self.rate.period();
                let thread_halt = halt.clone();
                let handle = thread::Builder::new()
                    .name("quadrature-tick".to_string())
                    .spawn(move || run(task, period, thread_halt))?;

                debug!("timer started at {}", self.rate);
                self.driver = Driver::Running { halt, handle };
                Ok(())
            }
            running @ Driver::Running { .. } => {
                self.driver = running;
                Ok(())
            }
            Driver::Faulted => Err(TimerThreadError("tick state was lost".to_string())),
        }
    }

    /// Stop ticking and wait for the thread to finish. No tick runs after this
    /// returns. Does nothing if already stopped.
    ///
    /// If a tick panicked the thread cannot be joined cleanly; that is reported
    /// as [`TimerThreadError`](crate::Error::TimerThreadError) and the timer
    /// cannot be started again.
    pub fn stop(&mut self) -> Result<()> {
        match mem::replace(&mut self.driver, Driver::Faulted) {
            Driver::Running { halt, handle } => {
                halt.store(true, Ordering::Release);
                let task = handle
                    .join()
                    .map_err(|_| TimerThreadError("Join failed".to_string()))?;

                debug!("timer stopped");
                self.driver = Driver::Idle(task);
                Ok(())
            }
            other => {
                self.driver = other;
                Ok(())
            }
        }
    }
}

impl<T: Tick> Drop for PeriodicTimer<T> {
    fn drop(&mut self) {
        if let Driver::Running { halt, .. } = &self.driver {
            halt.store(true, Ordering::Release);
        }
    }
}

fn run<T: Tick>(mut task: T, period: Duration, halt: Arc<AtomicBool>) -> T {
    let mut deadline = Instant::now() + period;
    loop {
        let now = Instant::now();
        if now < deadline {
            thread::sleep(deadline - now);
        }
        if halt.load(Ordering::Acquire) {
            break;
        }

        task.tick();

        deadline += period;
        let now = Instant::now();
        if now > deadline + period {
            // fell behind, skip the missed ticks rather than bursting through them
            deadline = now + period;
        }
    }
    task
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    struct Counter(Arc<AtomicUsize>);

    impl Tick for Counter {
        fn tick(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn presets() {
        let hz: Vec<u32> = SampleRate::ALL.iter().map(|r| r.hz()).collect();
        assert_eq!(hz, vec![500, 1000, 2000, 4000, 8000, 16000]);
        assert_eq!(SampleRate::default(), SampleRate::Hz1000);
        assert_eq!(SampleRate::Hz500.period(), Duration::from_millis(2));
        assert_eq!(SampleRate::Hz16000.period(), Duration::from_nanos(62_500));
    }

    #[test]
    fn parse_sample_rate() {
        assert_eq!("4000".parse::<SampleRate>(), Ok(SampleRate::Hz4000));
        assert!("3000".parse::<SampleRate>().is_err());
        assert_eq!(SampleRate::Hz8000.to_string(), "8000 Hz");
    }

    #[test]
    fn ticks_while_running_and_not_after_stop() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut timer = PeriodicTimer::new(SampleRate::Hz1000, Counter(count.clone()));
        assert!(!timer.is_running());

        timer.start().unwrap();
        assert!(timer.is_running());
        thread::sleep(Duration::from_millis(50));
        timer.stop().unwrap();
        assert!(!timer.is_running());

        let after_stop = count.load(Ordering::SeqCst);
        assert!(after_stop > 0);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn restart_resumes_with_same_task() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut timer = PeriodicTimer::new(SampleRate::Hz2000, Counter(count.clone()));

        timer.start().unwrap();
        thread::sleep(Duration::from_millis(20));
        timer.stop().unwrap();
        let first = count.load(Ordering::SeqCst);
        assert!(timer.task().is_some());

        timer.start().unwrap();
        // second start is a no-op
        timer.start().unwrap();
        thread::sleep(Duration::from_millis(20));
        timer.stop().unwrap();
        assert!(count.load(Ordering::SeqCst) > first);
    }

    #[test]
    fn stop_when_idle_is_a_no_op() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut timer = PeriodicTimer::new(SampleRate::Hz500, Counter(count.clone()));
        timer.stop().unwrap();
        assert!(timer.task().is_some());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    struct Boom;

    impl Tick for Boom {
        fn tick(&mut self) {
            panic!("tick failed");
        }
    }

    #[test]
    fn panicking_tick_faults_the_timer() {
        let mut timer = PeriodicTimer::new(SampleRate::Hz1000, Boom);
        timer.start().unwrap();

        let mut waited = 0;
        while timer.is_running() && waited < 200 {
            thread::sleep(Duration::from_millis(5));
            waited += 1;
        }
        assert!(!timer.is_running());

        assert!(matches!(timer.stop(), Err(crate::Error::TimerThreadError(_))));
        assert!(timer.task().is_none());
        assert!(matches!(timer.start(), Err(crate::Error::TimerThreadError(_))));
        assert!(!timer.is_running());
    }

    struct Slow(Arc<Mutex<Vec<Instant>>>);

    impl Tick for Slow {
        fn tick(&mut self) {
            self.0.lock().unwrap().push(Instant::now());
            thread::sleep(Duration::from_millis(3));
        }
    }

    #[test]
    fn overrunning_tick_skips_missed_ticks() {
        let starts = Arc::new(Mutex::new(Vec::new()));
        let mut timer = PeriodicTimer::new(SampleRate::Hz1000, Slow(starts.clone()));

        timer.start().unwrap();
        thread::sleep(Duration::from_millis(60));
        timer.stop().unwrap();

        let starts = starts.lock().unwrap();
        assert!(starts.len() >= 2);
        // every tick overruns, so each next deadline is re-anchored one
        // full period after the slow tick returns
        let period = SampleRate::Hz1000.period();
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(3) + period);
        }
    }
}
