//! FSRS scheduler: orchestration and the memory-model formulas.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::card_scheduler::CardScheduler;
use crate::error::{FsrsError, Result};
use crate::types::{Card, Parameters, Rating, SchedulingInfo, State};

/// Drives a card through one review, producing the four candidate next
/// states.
///
/// `decay` and `factor` are persisted verbatim on serialization; callers
/// that mutate `decay` must recompute `factor` themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheduler {
    pub p: Parameters,
    pub decay: f64,
    pub factor: f64,
}

impl Scheduler {
    pub fn new() -> Self {
        let decay = -0.5;
        Self {
            p: Parameters::new(),
            decay,
            factor: 0.9_f64.powf(1.0 / decay) - 1.0,
        }
    }

    /// Compute the four candidate next states of `card` for a review at
    /// `now`.
    ///
    /// `now` must be timezone-aware UTC; any other offset aborts the call
    /// before the card is cloned. The input card is never mutated.
    pub fn repeat<Tz: TimeZone>(
        &self,
        card: &Card,
        now: DateTime<Tz>,
    ) -> Result<HashMap<Rating, SchedulingInfo>> {
        if now.offset().fix().local_minus_utc() != 0 {
            return Err(FsrsError::InvalidReviewTimestamp);
        }
        let now = now.with_timezone(&Utc);

        let mut card = card.clone();
        card.elapsed_days = self.card_elapsed_days(&card, now);
        card.last_review = Some(now);
        card.reps += 1;

        let mut s = CardScheduler::new(&card);
        s.update_state(card.state);

        match card.state {
            State::New => self.schedule_new_state(&mut s, now),
            State::Learning | State::Relearning => {
                self.schedule_learning_relearning_state(&mut s, now)
            }
            State::Review => self.schedule_review_state(&mut s, &card, now),
        }

        Ok(s.record_log(&card, now))
    }

    /// Whole days since the last review, truncated toward zero.
    fn card_elapsed_days(&self, card: &Card, now: DateTime<Utc>) -> i64 {
        match (card.state, card.last_review) {
            (State::New, _) | (_, None) => 0,
            (_, Some(last_review)) => (now - last_review).num_days(),
        }
    }

    /// First review: seed difficulty/stability per rating and reschedule
    /// within minutes, except easy which graduates straight to a day-based
    /// interval.
    fn schedule_new_state(&self, s: &mut CardScheduler, now: DateTime<Utc>) {
        self.init_ds(s);

        s.again.due = now + Duration::seconds(60);
        s.hard.due = now + Duration::seconds(5 * 60);
        s.good.due = now + Duration::seconds(10 * 60);
        let easy_interval = self.next_interval(s.easy.stability);
        s.easy.scheduled_days = easy_interval;
        s.easy.due = now + Duration::days(easy_interval);
    }

    fn schedule_learning_relearning_state(&self, s: &mut CardScheduler, now: DateTime<Utc>) {
        let hard_interval = 0;
        let good_interval = self.next_interval(s.good.stability);
        let easy_interval = self
            .next_interval(s.easy.stability)
            .max(good_interval + 1);
        s.schedule(now, hard_interval, good_interval, easy_interval);
    }

    fn schedule_review_state(&self, s: &mut CardScheduler, card: &Card, now: DateTime<Utc>) {
        let interval = card.elapsed_days;
        let last_d = card.difficulty;
        let last_s = card.stability;
        let retrievability = self.forgetting_curve(interval as f64, last_s);
        self.next_ds(s, last_d, last_s, retrievability);

        let mut hard_interval = self.next_interval(s.hard.stability);
        let mut good_interval = self.next_interval(s.good.stability);
        hard_interval = hard_interval.min(good_interval);
        good_interval = good_interval.max(hard_interval + 1);
        let easy_interval = self
            .next_interval(s.easy.stability)
            .max(good_interval + 1);

        s.schedule(now, hard_interval, good_interval, easy_interval);
    }

    fn init_ds(&self, s: &mut CardScheduler) {
        s.again.difficulty = self.init_difficulty(Rating::Again);
        s.again.stability = self.init_stability(Rating::Again);
        s.hard.difficulty = self.init_difficulty(Rating::Hard);
        s.hard.stability = self.init_stability(Rating::Hard);
        s.good.difficulty = self.init_difficulty(Rating::Good);
        s.good.stability = self.init_stability(Rating::Good);
        s.easy.difficulty = self.init_difficulty(Rating::Easy);
        s.easy.stability = self.init_stability(Rating::Easy);
    }

    /// S0(G) = w[G-1], floored at 0.1.
    fn init_stability(&self, rating: Rating) -> f64 {
        self.p.w[rating.to_value() as usize - 1].max(0.1)
    }

    /// D0(G) = w[4] - w[5] * (G - 3), clamped to [1, 10].
    fn init_difficulty(&self, rating: Rating) -> f64 {
        let r = f64::from(rating.to_value());
        (self.p.w[4] - self.p.w[5] * (r - 3.0)).clamp(1.0, 10.0)
    }

    /// Predicted recall probability after `elapsed_days` at `stability`.
    pub fn forgetting_curve(&self, elapsed_days: f64, stability: f64) -> f64 {
        (1.0 + self.factor * elapsed_days / stability).powf(self.decay)
    }

    /// Days until retrievability decays to the requested retention, rounded
    /// and clamped to [1, maximum_interval].
    ///
    /// A non-finite intermediate (zero or negative stability feeding the
    /// power) saturates to the one-day minimum.
    pub fn next_interval(&self, stability: f64) -> i64 {
        let interval =
            stability / self.factor * (self.p.request_retention.powf(1.0 / self.decay) - 1.0);
        if !interval.is_finite() {
            return 1;
        }
        (interval.round() as i64).clamp(1, self.p.maximum_interval)
    }

    /// Blend a new difficulty toward the population-average initial
    /// difficulty to dampen drift.
    fn mean_reversion(&self, init: f64, current: f64) -> f64 {
        self.p.w[7] * init + (1.0 - self.p.w[7]) * current
    }

    fn next_difficulty(&self, d: f64, rating: Rating) -> f64 {
        let r = f64::from(rating.to_value());
        let next_d = d - self.p.w[6] * (r - 3.0);
        self.mean_reversion(self.p.w[4], next_d).clamp(1.0, 10.0)
    }

    fn next_recall_stability(&self, d: f64, s: f64, r: f64, rating: Rating) -> f64 {
        let hard_penalty = if rating == Rating::Hard {
            self.p.w[15]
        } else {
            1.0
        };
        let easy_bonus = if rating == Rating::Easy {
            self.p.w[16]
        } else {
            1.0
        };
        s * (1.0
            + self.p.w[8].exp()
                * (11.0 - d)
                * s.powf(-self.p.w[9])
                * (((1.0 - r) * self.p.w[10]).exp() - 1.0)
                * hard_penalty
                * easy_bonus)
    }

    fn next_forget_stability(&self, d: f64, s: f64, r: f64) -> f64 {
        self.p.w[11]
            * d.powf(-self.p.w[12])
            * ((s + 1.0).powf(self.p.w[13]) - 1.0)
            * ((1.0 - r) * self.p.w[14]).exp()
    }

    /// Recompute difficulty and stability on all four branches: the again
    /// branch takes the post-lapse stability, the rest the recall stability
    /// for their rating.
    fn next_ds(&self, s: &mut CardScheduler, last_d: f64, last_s: f64, retrievability: f64) {
        s.again.difficulty = self.next_difficulty(last_d, Rating::Again);
        s.again.stability = self.next_forget_stability(last_d, last_s, retrievability);
        s.hard.difficulty = self.next_difficulty(last_d, Rating::Hard);
        s.hard.stability = self.next_recall_stability(last_d, last_s, retrievability, Rating::Hard);
        s.good.difficulty = self.next_difficulty(last_d, Rating::Good);
        s.good.stability = self.next_recall_stability(last_d, last_s, retrievability, Rating::Good);
        s.easy.difficulty = self.next_difficulty(last_d, Rating::Easy);
        s.easy.stability = self.next_recall_stability(last_d, last_s, retrievability, Rating::Easy);
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
