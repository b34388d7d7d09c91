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

use std::time::{Duration, Instant};

/// Window, in seconds, past which a newer notification is always considered fresh regardless
/// of its `Observe` sequence number. See [RFC 7641 Section 3.4][rfc].
///
/// [rfc]: https://tools.ietf.org/html/rfc7641#section-3.4
const NOTIFICATION_REORDERING_WINDOW: Duration = Duration::from_secs(128);

/// Bound past which the 24-bit `Observe` sequence number is assumed to have wrapped around.
const WRAPAROUND_THRESHOLD: u32 = 1 << 23;

/// Applies the [RFC 7641 Section 3.4][rfc] freshness test to a sequence of `Observe`
/// notifications, rejecting ones that arrive out of order.
///
/// [rfc]: https://tools.ietf.org/html/rfc7641#section-3.4
#[derive(Debug)]
pub(crate) struct ObserveOrderer {
    last: Option<(u32, Instant)>,
}

impl ObserveOrderer {
    pub(crate) fn new() -> ObserveOrderer {
        ObserveOrderer { last: None }
    }

    /// Determines if a notification with sequence number `v2`, received at `t2`, is fresher
    /// than the last notification accepted by this orderer. If so, `v2`/`t2` become the new
    /// reference point and `true` is returned; otherwise the orderer is left unchanged and
    /// `false` is returned.
    pub(crate) fn accept(&mut self, v2: u32, t2: Instant) -> bool {
        let is_fresh = match self.last {
            None => true,
            Some((v1, t1)) => {
                let fresh_by_seq = (v1 < v2 && v2 - v1 < WRAPAROUND_THRESHOLD)
                    || (v1 > v2 && v1 - v2 > WRAPAROUND_THRESHOLD);
                let fresh_by_age = t2 > t1 + NOTIFICATION_REORDERING_WINDOW;
                fresh_by_seq || fresh_by_age
            }
        };

        if is_fresh {
            self.last = Some((v2, t2));
        }

        is_fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_notification_is_always_fresh() {
        let mut orderer = ObserveOrderer::new();
        assert!(orderer.accept(42, Instant::now()));
    }

    #[test]
    fn strictly_increasing_sequence_is_fresh() {
        let mut orderer = ObserveOrderer::new();
        let t0 = Instant::now();
        assert!(orderer.accept(1, t0));
        assert!(orderer.accept(2, t0));
        assert!(orderer.accept(3, t0));
    }

    #[test]
    fn stale_notification_is_rejected() {
        let mut orderer = ObserveOrderer::new();
        let t0 = Instant::now();
        assert!(orderer.accept(5, t0));
        assert!(!orderer.accept(3, t0));
        assert!(!orderer.accept(5, t0));
    }

    #[test]
    fn sequence_wraparound_is_handled() {
        // Scenario S4: 16777214, 16777215, 0, 1 all delivered in order; a late arrival of
        // 16777213 after 1 is dropped.
        let mut orderer = ObserveOrderer::new();
        let t0 = Instant::now();
        assert!(orderer.accept(16_777_214, t0));
        assert!(orderer.accept(16_777_215, t0));
        assert!(orderer.accept(0, t0));
        assert!(orderer.accept(1, t0));
        assert!(!orderer.accept(16_777_213, t0));
    }

    #[test]
    fn stale_sequence_accepted_after_reordering_window() {
        let mut orderer = ObserveOrderer::new();
        let t0 = Instant::now();
        assert!(orderer.accept(10, t0));
        let t1 = t0 + NOTIFICATION_REORDERING_WINDOW + Duration::from_secs(1);
        assert!(orderer.accept(9, t1));
    }
}
