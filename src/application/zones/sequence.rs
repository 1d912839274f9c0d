use crate::domain::zones::models::SequenceSummary;
use crate::domain::zones::{ZoneInfo, ZoneKind};

/// Summarizes the kind-to-kind transition structure of the zone sequence.
pub fn summarize(zones: &[ZoneInfo]) -> SequenceSummary {
    let mut summary = SequenceSummary::default();

    for pair in zones.windows(2) {
        match (pair[0].kind, pair[1].kind) {
            (ZoneKind::Bull, ZoneKind::Bull) => summary.bull_to_bull += 1,
            (ZoneKind::Bull, ZoneKind::Bear) => summary.bull_to_bear += 1,
            (ZoneKind::Bear, ZoneKind::Bull) => summary.bear_to_bull += 1,
            (ZoneKind::Bear, ZoneKind::Bear) => summary.bear_to_bear += 1,
        }
    }

    let transitions =
        summary.bull_to_bull + summary.bull_to_bear + summary.bear_to_bull + summary.bear_to_bear;
    if transitions > 0 {
        summary.continuation_prob =
            Some((summary.bull_to_bull + summary.bear_to_bear) as f64 / transitions as f64);
    }

    let mut streak = 0usize;
    let mut prev: Option<ZoneKind> = None;
    for z in zones {
        streak = match prev {
            Some(k) if k == z.kind => streak + 1,
            _ => 1,
        };
        match z.kind {
            ZoneKind::Bull => summary.longest_bull_streak = summary.longest_bull_streak.max(streak),
            ZoneKind::Bear => summary.longest_bear_streak = summary.longest_bear_streak.max(streak),
        }
        prev = Some(z.kind);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn zones_of(kinds: &[ZoneKind]) -> Vec<ZoneInfo> {
        kinds
            .iter()
            .enumerate()
            .map(|(i, k)| {
                let t = Utc.timestamp_opt(i as i64 * 3600, 0).unwrap();
                ZoneInfo::new(i, *k, i * 2, i * 2 + 1, t, t)
            })
            .collect()
    }

    #[test]
    fn test_alternating_sequence() {
        use ZoneKind::*;
        let zones = zones_of(&[Bull, Bear, Bull, Bear]);
        let s = summarize(&zones);

        assert_eq!(s.bull_to_bear, 2);
        assert_eq!(s.bear_to_bull, 1);
        assert_eq!(s.continuation_prob, Some(0.0));
        assert_eq!(s.longest_bull_streak, 1);
    }

    #[test]
    fn test_streaks() {
        use ZoneKind::*;
        let zones = zones_of(&[Bull, Bull, Bull, Bear, Bear, Bull]);
        let s = summarize(&zones);

        assert_eq!(s.longest_bull_streak, 3);
        assert_eq!(s.longest_bear_streak, 2);
        assert_eq!(s.bull_to_bull, 2);
        assert_eq!(s.continuation_prob, Some(3.0 / 5.0));
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(summarize(&[]).continuation_prob, None);
        let s = summarize(&zones_of(&[ZoneKind::Bull]));
        assert_eq!(s.continuation_prob, None);
        assert_eq!(s.longest_bull_streak, 1);
    }
}
