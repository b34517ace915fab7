//! Natural-language summaries of the filtered data.
//!
//! Sentences come out in a fixed order: year-over-year change (only with two
//! or more years), leading state, electric share, leading vehicle class and
//! peak month. Empty input yields the single [`NO_DATA`] sentence instead.

use crate::aggregate::{electric_share, peak_period, summary_stats, year_over_year};
use crate::types::{Record, YearChange};
use crate::util::format_int;

pub const NO_DATA: &str = "No data available for analysis";

pub fn generate_insights(records: &[Record]) -> Vec<String> {
    if records.is_empty() {
        return vec![NO_DATA.to_string()];
    }

    let mut insights = Vec::with_capacity(5);
    let summary = summary_stats(records);

    if let Some(change) = year_over_year(records) {
        insights.push(year_change_sentence(&change));
    }
    if let Some(state) = summary.top_state {
        insights.push(format!(
            "{} leads in vehicle registrations with {} vehicles",
            state.label,
            format_int(state.total)
        ));
    }
    insights.push(format!(
        "Electric vehicles account for {:.1}% of total registrations",
        electric_share(records)
    ));
    if let Some(class) = summary.top_vehicle_class {
        insights.push(format!(
            "{} is the most popular vehicle class with {} registrations",
            class.label,
            format_int(class.total)
        ));
    }
    if let Some(peak) = peak_period(records) {
        insights.push(format!(
            "Peak registration month was {} with {} vehicles",
            peak.label,
            format_int(peak.total)
        ));
    }
    insights
}

fn year_change_sentence(change: &YearChange) -> String {
    // The word follows the figure as printed, one decimal place.
    let shown = (change.change_pct * 10.0).round() / 10.0;
    let direction = if shown > 0.0 { "increased" } else { "decreased" };
    format!(
        "Vehicle registrations {} by {:.1}% from {} to {}",
        direction,
        shown.abs(),
        change.previous_year,
        change.latest_year
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i32, month: u32, state: &str, class: &str, fuel: &str, value: u64) -> Record {
        Record {
            year,
            month,
            state: state.to_string(),
            rto: String::new(),
            vehicle_class: class.to_string(),
            fuel: fuel.to_string(),
            value,
        }
    }

    #[test]
    fn test_empty_input_short_circuits() {
        assert_eq!(generate_insights(&[]), vec![NO_DATA.to_string()]);
    }

    #[test]
    fn test_full_sequence_with_two_years() {
        let data = vec![
            rec(2021, 5, "Karnataka", "MOTOR CAR", "PETROL", 100),
            rec(2022, 3, "Karnataka", "MOTOR CYCLE", "ELECTRIC", 1_000),
            rec(2022, 4, "Goa", "MOTOR CAR", "DIESEL", 500),
        ];
        let insights = generate_insights(&data);
        assert_eq!(
            insights,
            vec![
                "Vehicle registrations increased by 1400.0% from 2021 to 2022",
                "Karnataka leads in vehicle registrations with 1,100 vehicles",
                "Electric vehicles account for 62.5% of total registrations",
                "MOTOR CYCLE is the most popular vehicle class with 1,000 registrations",
                "Peak registration month was 2022-03 with 1,000 vehicles",
            ]
        );
    }

    #[test]
    fn test_year_over_year_phrasing() {
        let up = vec![
            rec(2021, 1, "A", "C", "PETROL", 100),
            rec(2022, 1, "A", "C", "PETROL", 150),
        ];
        assert_eq!(
            generate_insights(&up)[0],
            "Vehicle registrations increased by 50.0% from 2021 to 2022"
        );

        let down = vec![
            rec(2020, 1, "A", "C", "PETROL", 999),
            rec(2021, 1, "A", "C", "PETROL", 200),
            rec(2022, 1, "A", "C", "PETROL", 150),
        ];
        assert_eq!(
            generate_insights(&down)[0],
            "Vehicle registrations decreased by 25.0% from 2021 to 2022"
        );
    }

    #[test]
    fn test_change_that_rounds_to_zero_reads_decreased() {
        let flat = vec![
            rec(2021, 1, "A", "C", "PETROL", 100_000),
            rec(2022, 1, "A", "C", "PETROL", 100_040),
        ];
        assert_eq!(
            generate_insights(&flat)[0],
            "Vehicle registrations decreased by 0.0% from 2021 to 2022"
        );

        let slight = vec![
            rec(2021, 1, "A", "C", "PETROL", 100_000),
            rec(2022, 1, "A", "C", "PETROL", 100_060),
        ];
        assert_eq!(
            generate_insights(&slight)[0],
            "Vehicle registrations increased by 0.1% from 2021 to 2022"
        );
    }

    #[test]
    fn test_single_year_skips_change_sentence() {
        let data = vec![
            rec(2021, 1, "A", "MOTOR CAR", "PETROL", 10),
            rec(2021, 1, "A", "MOTOR CAR", "ELECTRIC", 5),
        ];
        let insights = generate_insights(&data);
        assert_eq!(insights.len(), 4);
        assert!(insights[0].starts_with("A leads"));
        assert_eq!(
            insights[1],
            "Electric vehicles account for 33.3% of total registrations"
        );
    }

    #[test]
    fn test_zero_electric_share_still_reported() {
        let data = vec![rec(2021, 1, "A", "BUS", "DIESEL", 0)];
        let insights = generate_insights(&data);
        let share = "Electric vehicles account for 0.0% of total registrations".to_string();
        assert!(insights.contains(&share));
    }
}
