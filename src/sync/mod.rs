//! Playback state synchronization
//!
//! - `engine`: cached state, poll cycle, change detection
//! - `bus`: subscriber fan-out
//! - `debounce`: coalesces bursts of changes into one push
//! - `backoff`: Retry-After handling for rate-limited fetches
//! - `poller`: the recurring poll timer

mod backoff;
mod bus;
mod debounce;
mod engine;
mod poller;

pub use backoff::{RateLimitBackoff, DEFAULT_MAX_RETRIES, DEFAULT_MAX_WAIT};
pub use bus::{EventBus, Subscriber, SubscriberId};
pub use debounce::{Debouncer, DEFAULT_QUIET_PERIOD};
pub use engine::{EngineOptions, PollOutcome, PublishStrategy, SyncEngine};
pub use poller::spawn_poller;
