use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::db::schema::Availability;
use crate::meeting::aggregate::Tally;

#[derive(Debug, Clone, PartialEq)]
pub struct BestDay<'a> {
    pub date: NaiveDate,
    pub participants: Vec<&'a Availability>,
}

/// Tie-break rule: more participants first, then the sooner date.
pub fn popularity_then_soonest(a: (&NaiveDate, usize), b: (&NaiveDate, usize)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0))
}

/// Picks the winning date, or `None` when no date is left to choose from.
pub fn best_day<'a>(tally: &Tally<'a>) -> Option<BestDay<'a>> {
    tally.iter()
        .min_by(|a, b| popularity_then_soonest((a.0, a.1.len()), (b.0, b.1.len())))
        .map(|(date, participants)| BestDay {
            date: *date,
            participants: participants.clone(),
        })
}

/// "Today", "Tomorrow", or e.g. "Monday (6/10)".
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_owned(),
        1 => "Tomorrow".to_owned(),
        _ => date.format("%A (%-m/%-d)").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meeting::aggregate::aggregate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn availability(ident: &str, dates: &[&str]) -> Availability {
        Availability {
            id_meeting: 1,
            user_ident: format!("user:{}", ident),
            user_name: ident.to_owned(),
            dates: dates.iter().map(|d| date(d)).collect(),
        }
    }

    #[test]
    fn picks_most_popular_date() {
        let rows = vec![
            availability("A", &["2024-06-10", "2024-06-11"]),
            availability("B", &["2024-06-10"]),
        ];
        let tally = aggregate(&rows, date("2024-06-09"));

        let best = best_day(&tally).unwrap();

        assert_eq!(best.date, date("2024-06-10"));
        let names: Vec<_> = best.participants.iter().map(|a| a.user_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn ties_go_to_the_soonest_date() {
        let rows = vec![
            availability("A", &["2024-06-13", "2024-06-11"]),
            availability("B", &["2024-06-11", "2024-06-13"]),
            availability("C", &["2024-06-12"]),
        ];
        let tally = aggregate(&rows, date("2024-06-09"));

        assert_eq!(best_day(&tally).unwrap().date, date("2024-06-11"));
    }

    #[test]
    fn same_input_same_winner() {
        let rows = vec![
            availability("A", &["2024-06-12", "2024-06-10"]),
            availability("B", &["2024-06-10", "2024-06-12"]),
        ];
        let first = best_day(&aggregate(&rows, date("2024-06-09"))).unwrap().date;

        for _ in 0..10 {
            assert_eq!(best_day(&aggregate(&rows, date("2024-06-09"))).unwrap().date, first);
        }
    }

    #[test]
    fn adding_to_the_winner_never_lowers_its_count() {
        let mut rows = vec![
            availability("A", &["2024-06-10"]),
            availability("B", &["2024-06-10", "2024-06-11"]),
        ];
        let before = best_day(&aggregate(&rows, date("2024-06-09"))).unwrap();
        let before = (before.date, before.participants.len());

        rows.push(availability("C", &["2024-06-10"]));
        let after = best_day(&aggregate(&rows, date("2024-06-09"))).unwrap();

        assert_eq!(after.date, before.0);
        assert!(after.participants.len() >= before.1);
    }

    #[test]
    fn no_decision_without_dates() {
        assert_eq!(best_day(&Tally::new()), None);
    }

    #[test]
    fn comparator_orders_by_count_then_date() {
        let (d1, d2) = (date("2024-06-10"), date("2024-06-11"));

        assert_eq!(popularity_then_soonest((&d2, 3), (&d1, 2)), Ordering::Less);
        assert_eq!(popularity_then_soonest((&d1, 2), (&d2, 2)), Ordering::Less);
        assert_eq!(popularity_then_soonest((&d1, 2), (&d1, 2)), Ordering::Equal);
    }

    #[test]
    fn labels_relative_days() {
        let today = date("2024-06-09");

        assert_eq!(day_label(today, today), "Today");
        assert_eq!(day_label(date("2024-06-10"), today), "Tomorrow");
        assert_eq!(day_label(date("2024-06-11"), today), "Tuesday (6/11)");
    }
}
