// Copyright 2019 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use super::*;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Tracks recently-seen inbound `(message_id, peer)` pairs.
///
/// The [`UdpResponseTracker`] already de-dupes a response against its still-live exchange by
/// token/message-ID, but once an exchange completes and is dropped there is nothing left to
/// match a late retransmission of that same response against. This table closes that gap: it
/// remembers message-IDs this endpoint has already acted on, independent of whether an exchange
/// is still around to claim them, so a duplicate that arrives after its exchange is gone is
/// still recognized as a duplicate (RFC 7252 §4.5) instead of being silently mismatched or
/// re-delivered to the caller.
#[derive(Debug)]
pub(crate) struct InboundDeduplicator<SA> {
    seen: Mutex<HashMap<(MsgId, SA), Instant>>,
}

impl<SA> InboundDeduplicator<SA>
where
    SA: Eq + core::hash::Hash + Copy,
{
    pub(crate) fn new() -> InboundDeduplicator<SA> {
        InboundDeduplicator {
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Records `(msg_id, peer)` as seen and returns true if it was already present within
    /// `lifetime`. Also opportunistically sweeps entries older than `lifetime` from the table,
    /// since the single-consumer receive loop gives us a natural place to do this without a
    /// separate periodic task.
    pub(crate) fn check_and_mark(&self, msg_id: MsgId, peer: SA, lifetime: Duration) -> bool {
        let now = Instant::now();
        let mut seen = match self.seen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                debug!("Recovering from mutex poisoning");
                poisoned.into_inner()
            }
        };

        seen.retain(|_, &mut timestamp| now.saturating_duration_since(timestamp) < lifetime);

        seen.insert((msg_id, peer), now).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sighting_is_not_a_duplicate() {
        let dedup = InboundDeduplicator::new();
        assert_eq!(
            false,
            dedup.check_and_mark(1234, "peer-a", Duration::from_secs(247))
        );
    }

    #[test]
    fn repeat_sighting_is_a_duplicate() {
        let dedup = InboundDeduplicator::new();
        assert_eq!(
            false,
            dedup.check_and_mark(1234, "peer-a", Duration::from_secs(247))
        );
        assert_eq!(
            true,
            dedup.check_and_mark(1234, "peer-a", Duration::from_secs(247))
        );
    }

    #[test]
    fn different_peers_do_not_collide() {
        let dedup = InboundDeduplicator::new();
        assert_eq!(
            false,
            dedup.check_and_mark(1234, "peer-a", Duration::from_secs(247))
        );
        assert_eq!(
            false,
            dedup.check_and_mark(1234, "peer-b", Duration::from_secs(247))
        );
    }

    #[test]
    fn expired_entries_are_swept() {
        let dedup = InboundDeduplicator::new();
        assert_eq!(
            false,
            dedup.check_and_mark(1234, "peer-a", Duration::from_millis(1))
        );
        std::thread::sleep(Duration::from_millis(20));
        // The previous entry is older than the lifetime, so this is treated as a fresh sighting.
        assert_eq!(
            false,
            dedup.check_and_mark(1234, "peer-a", Duration::from_millis(1))
        );
    }
}
