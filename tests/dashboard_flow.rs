use std::io::Write;

use vahan_report::aggregate::{
    electric_split, fuel_distribution, summary_stats, time_series, unique_values,
};
use vahan_report::filter::filter_records;
use vahan_report::insights::{generate_insights, NO_DATA};
use vahan_report::loader::parse_records;
use vahan_report::output::export_snapshot;
use vahan_report::{Dashboard, FilterCriteria, FilterUpdate};

const CSV: &str = "year,month,state,rto,vehicle_class,fuel,value
2021,1,A,A01,MOTOR CAR,PETROL,10
2021,1,A,A01,MOTOR CAR,ELECTRIC,5
2021,6,B,B02,BUS,DIESEL,85
2022,3,B,B02,MOTOR CAR,ELECTRIC,90
2022,4,C,C01,MOTOR CYCLE,PETROL,60
2022,4,C,C01,MOTOR CYCLE,not-a-fuel,oops
";

fn write_source() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CSV.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_filter_aggregate() {
    let file = write_source();
    let mut dashboard = Dashboard::load(file.path());
    assert_eq!(dashboard.records().len(), 6);
    assert_eq!(dashboard.load_report().defaulted_fields, 1);

    let all = dashboard.records().to_vec();
    assert_eq!(filter_records(&all, &FilterCriteria::default()), all);

    let total = summary_stats(&all).total_registrations;
    assert_eq!(total, 250);
    assert_eq!(fuel_distribution(&all).iter().map(|r| r.total).sum::<u64>(), total);
    assert_eq!(time_series(&all).iter().map(|p| p.total).sum::<u64>(), total);
    let split = electric_split(&all);
    assert_eq!(split.electric + split.non_electric, total);

    // Year 2021 only: the example records plus one bus in B.
    dashboard.filters_mut().set_filters(FilterUpdate {
        years: Some([2021].into()),
        ..Default::default()
    });
    let snapshot = dashboard.snapshot();
    assert_eq!(snapshot.summary.total_registrations, 100);
    assert_eq!(snapshot.insights.len(), 4);
    assert_eq!(
        snapshot.insights[0],
        "B leads in vehicle registrations with 85 vehicles"
    );

    // Option lists do not shrink with the filter.
    assert_eq!(dashboard.options(), &unique_values(&all));
    assert_eq!(dashboard.options().years, vec![2021, 2022]);
}

#[test]
fn test_example_records() {
    let file = write_source();
    let mut dashboard = Dashboard::load(file.path());
    dashboard.filters_mut().set_filters(FilterUpdate {
        states: Some(["A".to_string()].into()),
        ..Default::default()
    });
    let snapshot = dashboard.snapshot();
    assert_eq!(snapshot.summary.total_registrations, 15);
    assert_eq!(snapshot.summary.top_fuel.as_ref().unwrap().label, "PETROL");
    assert_eq!(snapshot.electric_split.electric, 5);
    assert_eq!(snapshot.electric_split.non_electric, 10);
    assert!(snapshot
        .insights
        .contains(&"Electric vehicles account for 33.3% of total registrations".to_string()));
}

#[test]
fn test_year_over_year_and_empty_state() {
    let file = write_source();
    let mut dashboard = Dashboard::load(file.path());
    let insights = dashboard.snapshot().insights.clone();
    assert_eq!(
        insights[0],
        "Vehicle registrations increased by 50.0% from 2021 to 2022"
    );
    assert_eq!(insights.len(), 5);

    dashboard.filters_mut().set_electric_only(Some(true));
    dashboard.filters_mut().toggle_state("C");
    assert_eq!(dashboard.snapshot().insights, vec![NO_DATA.to_string()]);
    assert_eq!(generate_insights(&[]), vec![NO_DATA.to_string()]);

    dashboard.filters_mut().reset_filters();
    assert_eq!(dashboard.snapshot().overview.records, 6);
}

#[test]
fn test_export_snapshot() {
    let file = write_source();
    let out = tempfile::tempdir().unwrap();
    let mut dashboard = Dashboard::load(file.path());
    let written = export_snapshot(out.path(), dashboard.snapshot()).unwrap();
    assert_eq!(written.len(), 7);
    assert!(written.iter().all(|p| p.exists()));

    let json = std::fs::read_to_string(out.path().join("snapshot.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["summary"]["total_registrations"], 250);
    assert_eq!(value["electric_split"]["electric"], 95);

    let split = std::fs::read_to_string(out.path().join("electric_split.csv")).unwrap();
    assert_eq!(split, "Label,Total\nElectric,95\nNon-Electric,155\n");
}

#[test]
fn test_huge_counts_do_not_overflow() {
    let csv = "year,month,state,rto,vehicle_class,fuel,value
2021,1,A,A01,MOTOR CAR,PETROL,9223372036854775807
2021,2,A,A01,MOTOR CAR,ELECTRIC,9223372036854775807
2022,1,B,B01,BUS,DIESEL,9223372036854775807
";
    let (records, report) = parse_records(csv.as_bytes()).unwrap();
    assert_eq!(report.defaulted_fields, 0);

    let total = summary_stats(&records).total_registrations;
    assert_eq!(total, u64::MAX);
    assert_eq!(time_series(&records).len(), 3);
    let split = electric_split(&records);
    assert_eq!(split.electric + split.non_electric, total);
    assert_eq!(generate_insights(&records).len(), 5);
}
