//! Human-facing order numbers: `<prefix>-<epoch millis>-<3 digits>`.

use std::collections::HashSet;

use chrono::Utc;
use parking_lot::Mutex;
use rand::Rng;

const SUFFIXES_PER_MILLI: u16 = 1000;

type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

struct GeneratorState {
    millis: i64,
    used: HashSet<u16>,
}

/// Hands out order numbers that are unique for the life of the generator.
///
/// The millisecond part never goes backwards, and once all suffixes of a
/// millisecond are taken the generator moves on to the next one.
pub struct OrderNumberGenerator {
    prefix: String,
    clock: Clock,
    state: Mutex<GeneratorState>,
}

impl OrderNumberGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_clock(prefix, || Utc::now().timestamp_millis())
    }

    pub fn with_clock(prefix: impl Into<String>, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        Self {
            prefix: prefix.into(),
            clock: Box::new(clock),
            state: Mutex::new(GeneratorState {
                millis: i64::MIN,
                used: HashSet::new(),
            }),
        }
    }

    pub fn next_number(&self) -> String {
        let mut state = self.state.lock();

        let now = (self.clock)().max(state.millis);
        if now != state.millis {
            state.millis = now;
            state.used.clear();
        }
        if state.used.len() >= usize::from(SUFFIXES_PER_MILLI) {
            state.millis += 1;
            state.used.clear();
        }

        let start = rand::thread_rng().gen_range(0..SUFFIXES_PER_MILLI);
        let suffix = (0..SUFFIXES_PER_MILLI)
            .map(|offset| (start + offset) % SUFFIXES_PER_MILLI)
            .find(|candidate| !state.used.contains(candidate))
            .unwrap_or(start);
        state.used.insert(suffix);

        format!("{}-{}-{:03}", self.prefix, state.millis, suffix)
    }
}
