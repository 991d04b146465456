use super::super::domain::{VerifiedWork, DEFAULT_COMPLEXITY};

/// Ratings and complexities share the same 1-5 scale.
const SCALE_MAX: u8 = 5;
const NEUTRAL_DELIVERY: f64 = 50.0;
/// Mean assumed for a dimension with no observations.
const NEUTRAL_MEAN: f64 = 3.0;
const CONSISTENCY_BASE: f64 = 50.0;
const CONSISTENCY_PER_PROJECT: f64 = 5.0;
const CONSISTENCY_CAP: f64 = 100.0;

/// Order-insensitive aggregates over a verified work set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WorkTally {
    pub total: u32,
    pub on_time: u32,
    rating_sum: u32,
    rating_count: u32,
    complexity_sum: u32,
}

impl WorkTally {
    pub(crate) fn from_work(verified_work: &[VerifiedWork]) -> Self {
        verified_work.iter().fold(Self::default(), |mut tally, work| {
            tally.total += 1;
            if work.delivered_on_time == Some(true) {
                tally.on_time += 1;
            }
            // zero means unrated
            if let Some(rating) = work.quality_rating.filter(|rating| *rating > 0) {
                tally.rating_sum += u32::from(rating.min(SCALE_MAX));
                tally.rating_count += 1;
            }
            let complexity = match work.project_complexity {
                0 => DEFAULT_COMPLEXITY,
                value => value.min(SCALE_MAX),
            };
            tally.complexity_sum += u32::from(complexity);
            tally
        })
    }
}

fn mean_or_default(sum: u32, count: u32) -> f64 {
    if count == 0 {
        NEUTRAL_MEAN
    } else {
        f64::from(sum) / f64::from(count)
    }
}

fn scale_percent(mean: f64) -> f64 {
    mean / f64::from(SCALE_MAX) * 100.0
}

pub(crate) fn delivery_score(tally: &WorkTally) -> f64 {
    if tally.total == 0 {
        return NEUTRAL_DELIVERY;
    }
    f64::from(tally.on_time) / f64::from(tally.total) * 100.0
}

/// Missing ratings count as a middling 3 out of 5.
pub(crate) fn quality_score(tally: &WorkTally) -> f64 {
    scale_percent(mean_or_default(tally.rating_sum, tally.rating_count))
}

pub(crate) fn consistency_score(tally: &WorkTally) -> f64 {
    (CONSISTENCY_BASE + f64::from(tally.total) * CONSISTENCY_PER_PROJECT).min(CONSISTENCY_CAP)
}

pub(crate) fn skill_match_score(tally: &WorkTally) -> f64 {
    scale_percent(mean_or_default(tally.complexity_sum, tally.total))
}

pub(crate) fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work(on_time: Option<bool>, rating: Option<u8>, complexity: u8) -> VerifiedWork {
        VerifiedWork {
            delivered_on_time: on_time,
            quality_rating: rating,
            project_complexity: complexity,
        }
    }

    #[test]
    fn tally_ignores_null_and_zero_ratings() {
        let tally = WorkTally::from_work(&[
            work(Some(true), Some(4), 3),
            work(None, None, 3),
            work(Some(false), Some(0), 3),
        ]);

        assert_eq!(tally.total, 3);
        assert_eq!(tally.on_time, 1);
        assert_eq!(quality_score(&tally), 80.0);
    }

    #[test]
    fn out_of_scale_inputs_are_clamped() {
        let tally = WorkTally::from_work(&[work(Some(true), Some(9), 12)]);

        assert_eq!(quality_score(&tally), 100.0);
        assert_eq!(skill_match_score(&tally), 100.0);
    }

    #[test]
    fn zero_complexity_falls_back_to_default() {
        let tally = WorkTally::from_work(&[work(Some(true), Some(5), 0)]);
        assert_eq!(skill_match_score(&tally), 60.0);
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round_to_cents(66.666_666), 66.67);
        assert_eq!(round_to_cents(33.333_333), 33.33);
        assert_eq!(round_to_cents(12.5), 12.5);
    }
}
