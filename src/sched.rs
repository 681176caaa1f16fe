//! Clock and timer seams realizing the page's single-threaded, cooperative execution model.
//!
//! All relay work is coordinated through timer callbacks; nothing blocks. Hosts pump a
//! [`TimerQueue`] from their own event loop (or provide another [`Scheduler`]), which keeps every
//! delay injectable and every test deterministic.

// std
use std::{
	cmp::{Ordering, Reverse},
	collections::BinaryHeap,
};
// self
use crate::_prelude::*;

/// Deferred unit of work executed by a [`Scheduler`].
pub type Task = Box<dyn FnOnce() + Send>;

/// Time source used for expiry math.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Returns the current instant.
	fn now(&self) -> OffsetDateTime;
}

/// Wall-clock [`Clock`] backed by the system UTC time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// Settable [`Clock`] for deterministic tests and replay.
#[derive(Debug)]
pub struct ManualClock(Mutex<OffsetDateTime>);
impl ManualClock {
	/// Creates a clock frozen at the provided instant.
	pub fn new(start: OffsetDateTime) -> Self {
		Self(Mutex::new(start))
	}

	/// Moves the clock forward by the provided duration.
	pub fn advance(&self, delta: Duration) {
		let mut guard = self.0.lock();

		*guard += delta;
	}

	/// Jumps the clock to an absolute instant.
	pub fn set(&self, instant: OffsetDateTime) {
		*self.0.lock() = instant;
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.0.lock()
	}
}

/// Timer-based scheduling seam; the only suspension mechanism in the relay.
pub trait Scheduler
where
	Self: Send + Sync,
{
	/// Runs the task once the delay elapses. Negative delays are clamped to zero.
	fn schedule(&self, delay: Duration, task: Task);
}

struct TimerEntry {
	deadline: Duration,
	seq: u64,
	task: Task,
}
impl TimerEntry {
	fn key(&self) -> (Duration, u64) {
		(self.deadline, self.seq)
	}
}
impl PartialEq for TimerEntry {
	fn eq(&self, other: &Self) -> bool {
		self.key() == other.key()
	}
}
impl Eq for TimerEntry {}
impl PartialOrd for TimerEntry {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}
impl Ord for TimerEntry {
	fn cmp(&self, other: &Self) -> Ordering {
		self.key().cmp(&other.key())
	}
}

#[derive(Default)]
struct QueueState {
	now: Duration,
	next_seq: u64,
	entries: BinaryHeap<Reverse<TimerEntry>>,
}

/// Cooperative timer queue ordered by deadline, then submission order.
///
/// Hosts call [`TimerQueue::advance`] from their event loop to run every task whose deadline has
/// passed; tasks scheduled while running are honored within the same advance when they fall due.
/// Nothing here can be cancelled once scheduled, matching the page model: a task fired after the
/// page went hidden must simply be harmless.
#[derive(Default)]
pub struct TimerQueue {
	inner: Mutex<QueueState>,
}
impl TimerQueue {
	/// Creates an empty queue at logical time zero.
	pub fn new() -> Self {
		Self::default()
	}

	/// Logical time accumulated through [`TimerQueue::advance`].
	pub fn elapsed(&self) -> Duration {
		self.inner.lock().now
	}

	/// Number of tasks still waiting for their deadline.
	pub fn pending(&self) -> usize {
		self.inner.lock().entries.len()
	}

	/// Moves logical time forward, running due tasks in deadline order.
	///
	/// Tasks run outside the internal lock so they may schedule further work.
	pub fn advance(&self, delta: Duration) {
		let target = {
			let guard = self.inner.lock();

			guard.now + delta.max(Duration::ZERO)
		};

		loop {
			let task = {
				let mut guard = self.inner.lock();
				let due = guard
					.entries
					.peek()
					.is_some_and(|Reverse(entry)| entry.deadline <= target);

				if due {
					if let Some(Reverse(entry)) = guard.entries.pop() {
						guard.now = guard.now.max(entry.deadline);

						Some(entry.task)
					} else {
						None
					}
				} else {
					guard.now = guard.now.max(target);

					None
				}
			};

			match task {
				Some(task) => task(),
				None => break,
			}
		}
	}

	/// Advances until no scheduled work remains, including tasks spawned along the way.
	pub fn run_until_idle(&self) {
		loop {
			let step = {
				let guard = self.inner.lock();

				guard.entries.peek().map(|Reverse(entry)| entry.deadline - guard.now)
			};

			match step {
				Some(delta) => self.advance(delta.max(Duration::ZERO)),
				None => break,
			}
		}
	}
}
impl Scheduler for TimerQueue {
	fn schedule(&self, delay: Duration, task: Task) {
		let mut guard = self.inner.lock();
		let deadline = guard.now + delay.max(Duration::ZERO);
		let seq = guard.next_seq;

		guard.next_seq += 1;
		guard.entries.push(Reverse(TimerEntry { deadline, seq, task }));
	}
}
impl Debug for TimerQueue {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let guard = self.inner.lock();

		f.debug_struct("TimerQueue")
			.field("now", &guard.now)
			.field("pending", &guard.entries.len())
			.finish()
	}
}
