//! Dashboard figures, derived from the full registration set on every call.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::contract::model::{DailyCount, MunicipalityCount, Registration, Statistics};

/// Shown as `top_kommune` when nobody registered today.
pub const NO_DATA: &str = "Ingen data";
/// Shown as `last_registration` when nothing was registered at all.
pub const NONE_YET: &str = "Ingen endnu";

pub struct StatsAggregator {
    offset: FixedOffset,
    breakdown_days: usize,
}

impl StatsAggregator {
    pub fn new(offset: FixedOffset, breakdown_days: usize) -> Self {
        Self {
            offset,
            breakdown_days,
        }
    }

    pub fn compute(
        &self,
        registrations: &[Registration],
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Statistics {
        let mut today_total = 0i64;
        let mut today_registrations = 0i64;
        let mut total_visitors = 0i64;
        let mut by_municipality: HashMap<&str, i64> = HashMap::new();
        let mut by_day: BTreeMap<NaiveDate, DailyCount> = BTreeMap::new();
        let mut latest: Option<DateTime<Utc>> = None;

        for r in registrations {
            let size = i64::from(r.party_size);
            total_visitors += size;

            let day = by_day.entry(r.date_key).or_insert_with(|| DailyCount {
                date: r.date_key,
                registrations: 0,
                visitors: 0,
            });
            day.registrations += 1;
            day.visitors += size;

            if r.date_key == today {
                today_total += size;
                today_registrations += 1;
                *by_municipality.entry(r.municipality.as_str()).or_default() += size;
            }

            if latest.map_or(true, |l| r.created_at > l) {
                latest = Some(r.created_at);
            }
        }

        let mut kommune_stats: Vec<MunicipalityCount> = by_municipality
            .into_iter()
            .map(|(municipality, count)| MunicipalityCount {
                municipality: municipality.to_string(),
                count,
            })
            .collect();
        kommune_stats.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.municipality.cmp(&b.municipality))
        });

        let top_kommune = kommune_stats
            .first()
            .map(|m| m.municipality.clone())
            .unwrap_or_else(|| NO_DATA.to_string());

        let total_days = (by_day.len() as i64).max(1);
        let skip = by_day.len().saturating_sub(self.breakdown_days);
        let daily_breakdown = by_day.into_values().skip(skip).collect();

        let last_registration = latest
            .map(|t| t.with_timezone(&self.offset).format("%H:%M").to_string())
            .unwrap_or_else(|| NONE_YET.to_string());

        Statistics {
            today_total,
            total_visitors,
            total_days,
            avg_daily: rounded_div(total_visitors, total_days),
            total_registrations: registrations.len() as i64,
            today_registrations,
            kommune_stats,
            top_kommune,
            daily_breakdown,
            last_registration,
            last_update: now,
        }
    }
}

/// `numerator / denominator` rounded half up; both are non-negative here.
fn rounded_div(numerator: i64, denominator: i64) -> i64 {
    if denominator <= 0 {
        return 0;
    }
    (numerator + denominator / 2) / denominator
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn cet() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn reg(municipality: &str, size: i32, date: NaiveDate, hour: u32, minute: u32) -> Registration {
        Registration {
            id: Uuid::new_v4(),
            municipality: municipality.to_string(),
            party_size: size,
            fingerprint: Uuid::new_v4().simple().to_string(),
            date_key: date,
            created_at: Utc
                .from_utc_datetime(&date.and_hms_opt(hour, minute, 0).unwrap()),
        }
    }

    #[test]
    fn empty_store_uses_sentinels() {
        let agg = StatsAggregator::new(cet(), 30);
        let s = agg.compute(&[], day(10), Utc::now());
        assert_eq!(s.today_total, 0);
        assert_eq!(s.total_visitors, 0);
        assert_eq!(s.total_days, 1);
        assert_eq!(s.avg_daily, 0);
        assert_eq!(s.top_kommune, NO_DATA);
        assert_eq!(s.last_registration, NONE_YET);
        assert!(s.kommune_stats.is_empty());
        assert!(s.daily_breakdown.is_empty());
    }

    #[test]
    fn today_total_only_counts_today() {
        let agg = StatsAggregator::new(cet(), 30);
        let rows = vec![
            reg("Aalborg", 3, day(10), 9, 0),
            reg("Rebild", 4, day(10), 10, 0),
            reg("Aalborg", 7, day(9), 12, 0),
        ];
        let s = agg.compute(&rows, day(10), Utc::now());
        assert_eq!(s.today_total, 7);
        assert_eq!(s.today_registrations, 2);
        assert_eq!(s.total_visitors, 14);
        assert_eq!(s.total_registrations, 3);
        assert_eq!(s.total_days, 2);
        assert_eq!(s.avg_daily, 7);
    }

    #[test]
    fn average_rounds_half_up() {
        let agg = StatsAggregator::new(cet(), 30);
        // 5 visitors over 2 days -> 2.5 -> 3
        let rows = vec![reg("Morsø", 2, day(1), 8, 0), reg("Morsø", 3, day(2), 8, 0)];
        assert_eq!(agg.compute(&rows, day(2), Utc::now()).avg_daily, 3);

        // 4 visitors over 3 days -> 1.33 -> 1
        let rows = vec![
            reg("Morsø", 2, day(1), 8, 0),
            reg("Morsø", 1, day(2), 8, 0),
            reg("Morsø", 1, day(3), 8, 0),
        ];
        assert_eq!(agg.compute(&rows, day(3), Utc::now()).avg_daily, 1);
    }

    #[test]
    fn top_kommune_follows_the_leader() {
        let agg = StatsAggregator::new(cet(), 30);
        let mut rows = vec![reg("Aalborg", 3, day(10), 9, 0)];
        assert_eq!(agg.compute(&rows, day(10), Utc::now()).top_kommune, "Aalborg");

        rows.push(reg("Thisted", 5, day(10), 9, 5));
        let s = agg.compute(&rows, day(10), Utc::now());
        assert_eq!(s.top_kommune, "Thisted");
        assert_eq!(
            s.kommune_stats,
            vec![
                MunicipalityCount {
                    municipality: "Thisted".into(),
                    count: 5
                },
                MunicipalityCount {
                    municipality: "Aalborg".into(),
                    count: 3
                },
            ]
        );
    }

    #[test]
    fn ties_are_broken_by_name() {
        let agg = StatsAggregator::new(cet(), 30);
        let rows = vec![reg("Thisted", 2, day(10), 9, 0), reg("Hjørring", 2, day(10), 9, 1)];
        assert_eq!(agg.compute(&rows, day(10), Utc::now()).top_kommune, "Hjørring");
    }

    #[test]
    fn yesterday_does_not_make_a_leader() {
        let agg = StatsAggregator::new(cet(), 30);
        let rows = vec![reg("Aalborg", 3, day(9), 9, 0)];
        let s = agg.compute(&rows, day(10), Utc::now());
        assert_eq!(s.top_kommune, NO_DATA);
        assert_eq!(s.today_total, 0);
    }

    #[test]
    fn daily_breakdown_keeps_most_recent_days_in_order() {
        let agg = StatsAggregator::new(cet(), 2);
        let rows = vec![
            reg("Læsø", 1, day(3), 8, 0),
            reg("Læsø", 2, day(1), 8, 0),
            reg("Læsø", 4, day(2), 8, 0),
            reg("Rebild", 5, day(3), 9, 0),
        ];
        let s = agg.compute(&rows, day(3), Utc::now());
        assert_eq!(
            s.daily_breakdown,
            vec![
                DailyCount {
                    date: day(2),
                    registrations: 1,
                    visitors: 4
                },
                DailyCount {
                    date: day(3),
                    registrations: 2,
                    visitors: 6
                },
            ]
        );
        // The window trims the breakdown only; day counts cover every day.
        assert_eq!(s.total_days, 3);
        assert_eq!(s.avg_daily, 4);
    }

    #[test]
    fn last_registration_is_local_hh_mm() {
        let agg = StatsAggregator::new(cet(), 30);
        let rows = vec![reg("Aalborg", 1, day(10), 7, 5), reg("Aalborg", 1, day(10), 13, 42)];
        // 13:42 UTC is 14:42 at +01:00
        assert_eq!(agg.compute(&rows, day(10), Utc::now()).last_registration, "14:42");
    }
}
