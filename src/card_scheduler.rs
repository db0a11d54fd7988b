//! Working set of candidate cards for a single review.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::types::{Card, Rating, ReviewLog, SchedulingInfo, State};

/// Holds the four hypothetical next states of a card, one per rating,
/// for the duration of one `Scheduler::repeat` call.
#[derive(Debug, Clone)]
pub struct CardScheduler {
    pub again: Card,
    pub hard: Card,
    pub good: Card,
    pub easy: Card,
}

impl CardScheduler {
    /// Clone the card under review into four independent branches.
    pub fn new(card: &Card) -> Self {
        Self {
            again: card.clone(),
            hard: card.clone(),
            good: card.clone(),
            easy: card.clone(),
        }
    }

    /// Apply the state transition table for the card's pre-review state.
    ///
    /// A lapse (review state rated again) also increments that branch's
    /// lapse count.
    pub fn update_state(&mut self, state: State) {
        match state {
            State::New => {
                self.again.state = State::Learning;
                self.hard.state = State::Learning;
                self.good.state = State::Learning;
                self.easy.state = State::Review;
            }
            State::Learning | State::Relearning => {
                self.again.state = state;
                self.hard.state = state;
                self.good.state = State::Review;
                self.easy.state = State::Review;
            }
            State::Review => {
                self.again.state = State::Relearning;
                self.hard.state = State::Review;
                self.good.state = State::Review;
                self.easy.state = State::Review;
                self.again.lapses += 1;
            }
        }
    }

    /// Set scheduled days and due dates from the computed day intervals.
    ///
    /// The again branch is rescheduled within minutes rather than days;
    /// a non-positive hard interval falls back to a ten-minute retry.
    pub fn schedule(
        &mut self,
        now: DateTime<Utc>,
        hard_interval: i64,
        good_interval: i64,
        easy_interval: i64,
    ) {
        self.again.scheduled_days = 0;
        self.hard.scheduled_days = hard_interval;
        self.good.scheduled_days = good_interval;
        self.easy.scheduled_days = easy_interval;

        self.again.due = now + Duration::minutes(5);
        self.hard.due = if hard_interval > 0 {
            now + Duration::days(hard_interval)
        } else {
            now + Duration::minutes(10)
        };
        self.good.due = now + Duration::days(good_interval);
        self.easy.due = now + Duration::days(easy_interval);
    }

    /// Pair each branch with a log of the transition that produced it.
    ///
    /// Each log carries the branch's own scheduled days but the prior
    /// card's elapsed days and state.
    pub fn record_log(self, prior: &Card, now: DateTime<Utc>) -> HashMap<Rating, SchedulingInfo> {
        let mut map = HashMap::with_capacity(4);
        for (rating, card) in [
            (Rating::Again, self.again),
            (Rating::Hard, self.hard),
            (Rating::Good, self.good),
            (Rating::Easy, self.easy),
        ] {
            let review_log = ReviewLog {
                rating,
                scheduled_days: card.scheduled_days,
                elapsed_days: prior.elapsed_days,
                review: now,
                state: prior.state,
            };
            map.insert(rating, SchedulingInfo { card, review_log });
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 4, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn new_state_transitions() {
        let mut s = CardScheduler::new(&Card::new());
        s.update_state(State::New);

        assert_eq!(s.again.state, State::Learning);
        assert_eq!(s.hard.state, State::Learning);
        assert_eq!(s.good.state, State::Learning);
        assert_eq!(s.easy.state, State::Review);
        assert_eq!(s.again.lapses, 0);
    }

    #[test]
    fn learning_and_relearning_transitions() {
        for state in [State::Learning, State::Relearning] {
            let mut card = Card::new();
            card.state = state;
            let mut s = CardScheduler::new(&card);
            s.update_state(state);

            assert_eq!(s.again.state, state);
            assert_eq!(s.hard.state, state);
            assert_eq!(s.good.state, State::Review);
            assert_eq!(s.easy.state, State::Review);
        }
    }

    #[test]
    fn review_lapse_transition_increments_lapses() {
        let mut card = Card::new();
        card.state = State::Review;
        card.lapses = 2;
        let mut s = CardScheduler::new(&card);
        s.update_state(State::Review);

        assert_eq!(s.again.state, State::Relearning);
        assert_eq!(s.again.lapses, 3);
        assert_eq!(s.hard.state, State::Review);
        assert_eq!(s.good.state, State::Review);
        assert_eq!(s.easy.state, State::Review);
        assert_eq!(s.hard.lapses, 2);
        assert_eq!(s.good.lapses, 2);
        assert_eq!(s.easy.lapses, 2);
    }

    #[test]
    fn schedule_sets_days_and_due_dates() {
        let now = now();
        let mut s = CardScheduler::new(&Card::new());
        s.schedule(now, 3, 7, 12);

        assert_eq!(s.again.scheduled_days, 0);
        assert_eq!(s.hard.scheduled_days, 3);
        assert_eq!(s.good.scheduled_days, 7);
        assert_eq!(s.easy.scheduled_days, 12);

        assert_eq!(s.again.due, now + Duration::minutes(5));
        assert_eq!(s.hard.due, now + Duration::days(3));
        assert_eq!(s.good.due, now + Duration::days(7));
        assert_eq!(s.easy.due, now + Duration::days(12));
    }

    #[test]
    fn schedule_hard_fallback_when_interval_is_zero() {
        let now = now();
        let mut s = CardScheduler::new(&Card::new());
        s.schedule(now, 0, 1, 2);

        assert_eq!(s.hard.scheduled_days, 0);
        assert_eq!(s.hard.due, now + Duration::minutes(10));
    }

    #[test]
    fn record_log_uses_prior_card_state() {
        let now = now();
        let mut prior = Card::new();
        prior.state = State::Review;
        prior.elapsed_days = 4;

        let mut s = CardScheduler::new(&prior);
        s.update_state(State::Review);
        s.schedule(now, 2, 5, 9);
        let logs = s.record_log(&prior, now);

        assert_eq!(logs.len(), 4);
        let good = &logs[&Rating::Good];
        assert_eq!(good.review_log.rating, Rating::Good);
        assert_eq!(good.review_log.scheduled_days, 5);
        assert_eq!(good.review_log.elapsed_days, 4);
        assert_eq!(good.review_log.review, now);
        assert_eq!(good.review_log.state, State::Review);
        assert_eq!(logs[&Rating::Again].review_log.scheduled_days, 0);
        assert_eq!(logs[&Rating::Easy].review_log.scheduled_days, 9);
    }
}
