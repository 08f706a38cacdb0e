use chrono::{Days, NaiveDate};
use phasewise_core::model::Phase;
use proptest::prelude::*;

pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date")
}

/// Any date within roughly a decade of 2020-01-01.
pub fn arb_date() -> impl Strategy<Value = NaiveDate> + Clone {
    (0u64..3650).prop_map(|offset| epoch() + Days::new(offset))
}

/// A phase with both dates, possibly inverted.
pub fn arb_dated_phase(name: String) -> impl Strategy<Value = Phase> {
    (arb_date(), arb_date()).prop_map(move |(start, end)| {
        Phase::new(name.clone(), "1 week").with_dates(start, end)
    })
}

/// A phase with independent optional dates.
pub fn arb_phase(name: String) -> impl Strategy<Value = Phase> {
    (
        proptest::option::of(arb_date()),
        proptest::option::of(arb_date()),
    )
        .prop_map(move |(start, end)| {
            let mut phase = Phase::new(name.clone(), "2 weeks");
            phase.start_date = start;
            phase.end_date = end;
            phase
        })
}

/// Between 1 and `max` phases with unique names `p0`, `p1`, ...
pub fn arb_phases(max: usize) -> impl Strategy<Value = Vec<Phase>> {
    (1..=max).prop_flat_map(|len| {
        (0..len)
            .map(|i| arb_phase(format!("p{i}")).boxed())
            .collect::<Vec<_>>()
    })
}

/// Between 1 and `max` phases that all carry both dates.
pub fn arb_dated_phases(max: usize) -> impl Strategy<Value = Vec<Phase>> {
    (1..=max).prop_flat_map(|len| {
        (0..len)
            .map(|i| arb_dated_phase(format!("p{i}")).boxed())
            .collect::<Vec<_>>()
    })
}
