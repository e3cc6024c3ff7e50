//! Bolus and daily-dosing scenarios on a two-compartment absorption model.

use std::fs;

use pbk_core::{
    Compartment, Event, EventAssignment, ExchangeDocument, Expr, Parameter, Reaction,
    SimulationResult, Species, SpeciesReference,
};
use pbk_harness::{
    BolusDosing, DailyDosing, HarnessError, LiveModel, Scenario, ScenarioRunner,
    load_parametrisation,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;

const FREQUENCY: u32 = 24;

fn species(id: &str, compartment: &str) -> Species {
    Species {
        id: id.into(),
        compartment: compartment.into(),
        initial_amount: 0.0,
        constant: false,
        boundary: false,
        unit: None,
        annotations: Vec::new(),
    }
}

fn parameter(id: &str, value: f64, constant: bool) -> Parameter {
    Parameter {
        id: id.into(),
        value,
        constant,
        unit: None,
        annotations: Vec::new(),
    }
}

fn reaction(id: &str, from: &str, to: Option<&str>, rate: &str) -> Reaction {
    let reference = |s: &str| SpeciesReference {
        species: s.into(),
        stoichiometry: 1.0,
    };
    Reaction {
        id: id.into(),
        reactants: vec![reference(from)],
        products: to.map(reference).into_iter().collect(),
        rate: Expr::parse(rate).unwrap(),
        annotations: Vec::new(),
    }
}

/// Gut → Blood → eliminated, first order. `AGut` starts as a boundary
/// species so dosing has to release it.
fn pbk_model() -> ExchangeDocument {
    let mut doc = ExchangeDocument::new("PBK_demo");
    for (id, size) in [("Gut", 1.0), ("Blood", 5.6)] {
        doc.compartments.push(Compartment {
            id: id.into(),
            size,
            unit: None,
            annotations: Vec::new(),
        });
    }
    let mut gut = species("AGut", "Gut");
    gut.boundary = true;
    doc.species.push(gut);
    doc.species.push(species("ABlood", "Blood"));
    doc.parameters.push(parameter("BW", 70.0, true));
    doc.parameters.push(parameter("ka", 1.2, true));
    doc.parameters.push(parameter("kel", 0.05, true));
    doc.reactions.push(reaction("absorption", "AGut", Some("ABlood"), "ka * AGut"));
    doc.reactions.push(reaction("elimination", "ABlood", None, "kel * ABlood"));
    doc
}

fn column(result: &SimulationResult, name: &str) -> Vec<f64> {
    result.column(name).unwrap()
}

fn close(lhs: f64, rhs: f64) -> bool {
    (lhs - rhs).abs() <= 1e-6 * rhs.abs().max(1.0)
}

#[test]
fn single_oral_bolus_decays_from_intake() {
    let out = TempDir::new().unwrap();
    let mut model = LiveModel::new(&pbk_model());
    BolusDosing::new("AGut", 1.0).install(&mut model).unwrap();
    let regenerated = model.regenerate().unwrap();

    let scenario = Scenario {
        id: "single_bolus_scenario_1".into(),
        duration: 2.0,
        frequency: FREQUENCY,
        selections: model.default_selections(),
    };
    let output = ScenarioRunner::new(out.path()).run(&regenerated, &scenario).unwrap();

    assert_eq!(output.samples, 49);
    let time = column(&output.result, "time");
    assert_eq!(time[0], 0.0);
    assert_eq!(time[48], 2.0);
    for pair in time.windows(2) {
        assert!(close(pair[1] - pair[0], 1.0 / 24.0));
    }

    let gut = column(&output.result, "AGut");
    assert_eq!(gut[0], 1.0);
    assert!(gut.windows(2).all(|pair| pair[1] < pair[0]));
    assert!(close(gut[24], (-1.2_f64).exp()));

    let csv = fs::read_to_string(out.path().join("single_bolus_scenario_1.csv")).unwrap();
    assert!(csv.starts_with("time,AGut,ABlood\n"));
    assert_eq!(csv.lines().count(), 50);
    assert!(out.path().join("single_bolus_scenario_1.svg").is_file());
}

#[rstest]
#[case(1, 10)]
#[case(2, 100)]
#[case(3, 1000)]
fn daily_oral_bolus(#[case] id_scenario: u32, #[case] days_of_exposure: u32) {
    let out = TempDir::new().unwrap();
    let params = out.path().join("PFOA_Human.csv");
    fs::write(
        &params,
        "idModelInstance,Parameter,Value,Unit\nHuman,BW,60,kg\nHuman,ka,1.0,1/d\nRat,BW,0.25,kg\n",
    )
    .unwrap();

    let mut model = LiveModel::new(&pbk_model());
    assert_eq!(load_parametrisation(&mut model, &params, "Human").unwrap(), 2);
    let plan = DailyDosing::new("AGut", 1.0, "BW", days_of_exposure)
        .install(&mut model)
        .unwrap();
    let regenerated = model.regenerate().unwrap();

    let total_days = days_of_exposure + days_of_exposure / 10;
    assert_eq!(plan.total_days(), total_days);

    let mut selections = model.default_selections();
    selections.push("BW".into());
    let scenario = Scenario {
        id: format!("test_daily_oral_bolus_{id_scenario}"),
        duration: f64::from(plan.total_days()),
        frequency: FREQUENCY,
        selections,
    };
    let output = ScenarioRunner::new(out.path()).run(&regenerated, &scenario).unwrap();

    let samples = (total_days * FREQUENCY + 1) as usize;
    assert_eq!(output.samples, samples);
    let gut = column(&output.result, "AGut");
    assert!(column(&output.result, "BW").iter().all(|&bw| bw == 60.0));

    // A dose of 1 * BW lands at the start of every exposure day.
    assert!(close(gut[0], 60.0));
    let last_dose = ((days_of_exposure - 1) * FREQUENCY) as usize;
    assert!(gut[last_dose] - gut[last_dose - 1] > 55.0);

    // No dosing during washout.
    let washout_start = (days_of_exposure * FREQUENCY) as usize;
    assert!(gut[washout_start..].windows(2).all(|pair| pair[1] <= pair[0]));

    assert!(out.path().join(format!("{}.csv", scenario.id)).is_file());
    assert!(out.path().join(format!("{}.svg", scenario.id)).is_file());
}

/// `AGut` without any reaction: every dose simply accumulates.
fn accumulator() -> ExchangeDocument {
    let mut doc = pbk_model();
    doc.reactions.clear();
    doc.parameters[0].constant = false;
    doc
}

#[test]
fn ten_day_exposure_doses_exactly_ten_times() {
    let mut model = LiveModel::new(&accumulator());
    DailyDosing::new("AGut", 1.0, "BW", 10).install(&mut model).unwrap();
    let scenario = Scenario {
        id: "scope".into(),
        duration: 11.0,
        frequency: FREQUENCY,
        selections: vec!["time".into(), "AGut".into()],
    };
    let result = ScenarioRunner::new("unused")
        .simulate(&model.regenerate().unwrap(), &scenario)
        .unwrap();

    let gut = column(&result, "AGut");
    for day in 0..10_u32 {
        let index = (day * FREQUENCY) as usize;
        assert!(close(gut[index], 70.0 * f64::from(day + 1)), "day {day}");
        assert!(close(gut[index + 12], 70.0 * f64::from(day + 1)), "mid-day {day}");
    }
    assert!(close(gut[10 * FREQUENCY as usize], 700.0));
    assert!(close(*gut.last().unwrap(), 700.0));
}

#[test]
fn one_sample_per_day_still_doses_every_day() {
    let mut model = LiveModel::new(&accumulator());
    DailyDosing::new("AGut", 1.0, "BW", 3).install(&mut model).unwrap();
    let scenario = Scenario {
        id: "daily_samples".into(),
        duration: 3.0,
        frequency: 1,
        selections: vec!["AGut".into()],
    };
    let result = ScenarioRunner::new("unused")
        .simulate(&model.regenerate().unwrap(), &scenario)
        .unwrap();

    let gut = column(&result, "AGut");
    assert_eq!(gut.len(), 4);
    for (sample, expected) in gut.iter().zip([70.0, 140.0, 210.0, 210.0]) {
        assert!(close(*sample, expected), "got {sample}, expected {expected}");
    }
}

#[test]
fn daily_dosing_ignores_a_compiled_initial_amount() {
    let mut doc = accumulator();
    doc.species[0].initial_amount = 5.0;
    let mut model = LiveModel::new(&doc);
    DailyDosing::new("AGut", 1.0, "BW", 3).install(&mut model).unwrap();
    let scenario = Scenario {
        id: "preloaded".into(),
        duration: 3.0,
        frequency: 1,
        selections: vec!["time".into(), "AGut".into()],
    };
    let result = ScenarioRunner::new("unused")
        .simulate(&model.regenerate().unwrap(), &scenario)
        .unwrap();

    let gut = column(&result, "AGut");
    assert!(close(gut[0], 70.0), "got {}", gut[0]);
    assert!(close(gut[3], 210.0), "got {}", gut[3]);
}

#[test]
fn outputs_always_carry_a_time_axis() {
    let out = TempDir::new().unwrap();
    let mut model = LiveModel::new(&pbk_model());
    BolusDosing::new("AGut", 10.0).install(&mut model).unwrap();
    let scenario = Scenario {
        id: "no_time".into(),
        duration: 1.0,
        frequency: 4,
        selections: vec!["AGut".into()],
    };
    let output = ScenarioRunner::new(out.path())
        .run(&model.regenerate().unwrap(), &scenario)
        .unwrap();

    assert_eq!(output.result.columns, vec!["time".to_string(), "AGut".to_string()]);
    assert_eq!(column(&output.result, "time"), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    let table = fs::read_to_string(&output.table).unwrap();
    assert!(table.starts_with("time,AGut\n"), "{table}");

    let chart = fs::read_to_string(&output.chart).unwrap();
    assert_eq!(chart.matches("<polyline").count(), 1);
    assert!(!chart.contains("points=\"\""), "{chart}");
}

#[test]
fn zero_exposure_runs_without_events() {
    let mut model = LiveModel::new(&accumulator());
    let plan = DailyDosing::new("AGut", 1.0, "BW", 0).install(&mut model).unwrap();
    let scenario = Scenario {
        id: "none".into(),
        duration: f64::from(plan.total_days()),
        frequency: FREQUENCY,
        selections: vec!["time".into(), "AGut".into()],
    };
    let result = ScenarioRunner::new("unused")
        .simulate(&model.regenerate().unwrap(), &scenario)
        .unwrap();
    assert_eq!(result.rows, vec![vec![0.0, 0.0]]);
}

/// A growth event declared before the dosing event raises `BW` by 10 at every
/// whole day, in the same instant the dose fires.
fn growing_model(snapshot: bool) -> LiveModel {
    let mut model = LiveModel::new(&accumulator());
    model
        .add_event(Event {
            id: "growth".into(),
            trigger: Expr::parse("time % 1 == 0").unwrap(),
            assignments: vec![EventAssignment {
                variable: "BW".into(),
                math: Expr::parse("BW + 10").unwrap(),
            }],
            use_values_from_trigger_time: false,
        })
        .unwrap();
    let dosing = DailyDosing::new("AGut", 1.0, "BW", 2);
    let mut event = dosing.plan().unwrap().event.unwrap();
    event.use_values_from_trigger_time = snapshot;
    model.set_boundary("AGut", false).unwrap();
    model.add_event(event).unwrap();
    model
}

#[rstest]
#[case(true, 70.0 + 80.0)]
#[case(false, 80.0 + 90.0)]
fn dose_uses_covariate_captured_at_trigger(#[case] snapshot: bool, #[case] expected: f64) {
    let model = growing_model(snapshot);
    let scenario = Scenario {
        id: "growth".into(),
        duration: 2.0,
        frequency: 4,
        selections: vec!["AGut".into(), "BW".into()],
    };
    let result = ScenarioRunner::new("unused")
        .simulate(&model.regenerate().unwrap(), &scenario)
        .unwrap();

    let gut = column(&result, "AGut");
    assert!(close(gut[7], expected), "got {}", gut[7]);
    assert_eq!(column(&result, "BW")[8], 100.0);
}

#[test]
fn unknown_selection_is_a_configuration_error() {
    let model = LiveModel::new(&pbk_model());
    let scenario = Scenario {
        id: "bad".into(),
        duration: 1.0,
        frequency: 1,
        selections: vec!["time".into(), "CLiver".into()],
    };
    let result = ScenarioRunner::new("unused").simulate(&model.regenerate().unwrap(), &scenario);
    assert!(matches!(result, Err(HarnessError::Configuration(_))));
}
