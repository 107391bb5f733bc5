use std::collections::BTreeMap;

use chrono::NaiveDate;
use itertools::Itertools;

use crate::db::schema::Availability;

/// Participants available on each date, earliest date first.
pub type Tally<'a> = BTreeMap<NaiveDate, Vec<&'a Availability>>;

/// Groups every response by the dates it offers. Dates before `today` are
/// dropped, and a date listed twice by one participant counts once.
pub fn aggregate(availabilities: &[Availability], today: NaiveDate) -> Tally<'_> {
    let mut tally = Tally::new();

    for availability in availabilities {
        for date in availability.dates.iter().filter(|d| **d >= today).unique() {
            tally.entry(*date).or_insert_with(Vec::new).push(availability);
        }
    }

    tally
}
