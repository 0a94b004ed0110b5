mod common;

use energy_scenarios::analysis::columns::{ColumnKind, ColumnRequest, resolve};
use energy_scenarios::analysis::learning_curve::adjust;
use energy_scenarios::analysis::scenario::{ProjectionConfig, project};
use energy_scenarios::analysis::series::prepare_series;
use energy_scenarios::config::PipelineConfig;
use energy_scenarios::error::AnalysisError;
use energy_scenarios::table::Value;

#[test]
fn resolve_returns_existing_columns_unchanged() {
    let table = common::table(common::COST_CSV);
    for column in table.columns() {
        for kind in [ColumnKind::Grouping, ColumnKind::Numeric] {
            let request = ColumnRequest::new(column.as_str(), kind).with_patterns(["year", "cost"]);
            let resolved = resolve(&table, &request).expect("existing column should resolve");
            assert_eq!(resolved.name(), column);
        }
    }
}

#[test]
fn projection_is_scenario_major_with_n_times_m_rows() {
    let table = common::table(common::CONSUMPTION_CSV);
    let cfg = PipelineConfig::baseline();
    let out = project(&table, &cfg.scenarios, &ProjectionConfig::default())
        .expect("projection should succeed");

    let m = table.len();
    let n = cfg.scenarios.len();
    assert_eq!(out.len(), n * m);

    let labels: Vec<String> = out
        .column("scenario")
        .expect("scenario column should exist")
        .map(ToString::to_string)
        .collect();
    for (i, scenario) in cfg.scenarios.iter().enumerate() {
        assert!(
            labels[i * m..(i + 1) * m].iter().all(|l| *l == scenario.name),
            "block {i} should belong to {}",
            scenario.name
        );
    }
}

#[test]
fn baseline_adjustment_matches_reference_value() {
    let table = common::table(common::CONSUMPTION_CSV);
    let cfg = PipelineConfig::baseline();
    let out = project(&table, &cfg.scenarios[..1], &ProjectionConfig::default())
        .expect("projection should succeed");

    let first = out.get(0, "cons_adj").and_then(Value::as_f64).unwrap_or_default();
    assert!((first - 98.095_238_095).abs() < 1e-6, "got {first}");
    assert_eq!(out.get(1, "cons_adj"), Some(&Value::Missing));
    // input consumption is left as read
    assert_eq!(out.get(0, "primary_energy_consumption"), Some(&Value::Number(100.0)));
}

#[test]
fn projection_rejects_incomplete_scenarios_before_computing() {
    let table = common::table(common::CONSUMPTION_CSV);
    let mut scenarios = PipelineConfig::baseline().scenarios;
    scenarios[2].gdp_growth = None;
    let err = project(&table, &scenarios, &ProjectionConfig::default());
    assert_eq!(
        err,
        Err(AnalysisError::MissingField {
            scenario: "low_policy".to_string(),
            field: "gdp_growth",
        })
    );
}

#[test]
fn equal_capacities_leave_costs_unchanged() {
    let costs = [120.0, 110.0, 95.0];
    let adjusted = adjust(&costs, &[Some(40.0); 3], 0.3).expect("adjust should succeed");
    for (a, c) in adjusted.iter().zip(costs) {
        assert!((a - c).abs() < 1e-12);
    }
}

#[test]
fn adjustment_is_invariant_to_capacity_scale() {
    let costs = [100.0, 90.0, 80.0];
    let caps = [Some(10.0), Some(25.0), Some(70.0)];
    let scaled: Vec<Option<f64>> = caps.iter().map(|c| c.map(|v| v * 7.5)).collect();

    let a = adjust(&costs, &caps, 0.2).expect("adjust should succeed");
    let b = adjust(&costs, &scaled, 0.2).expect("adjust should succeed");
    for (x, y) in a.iter().zip(&b) {
        assert!((x - y).abs() < 1e-9);
    }
}

#[test]
fn leading_missing_capacity_takes_next_value_as_base() {
    let adjusted =
        adjust(&[100.0, 100.0, 100.0], &[None, Some(10.0), Some(20.0)], 0.5).expect("adjust");
    assert!((adjusted[0] - 100.0).abs() < 1e-12);
    assert!((adjusted[1] - 100.0).abs() < 1e-12);
    assert!((adjusted[2] - 100.0 * 0.5_f64.sqrt()).abs() < 1e-9);
}

#[test]
fn cost_series_groups_sorts_and_adjusts() {
    let table = common::table(common::COST_CSV);
    let cm = PipelineConfig::baseline().cost_model;
    let series = prepare_series(&table, &cm.series_request(), &cm.learning_curve())
        .expect("series should be prepared");

    let techs: Vec<&str> = series.keys().map(String::as_str).collect();
    assert_eq!(techs, ["wind", "solar"]);

    let wind = &series["wind"];
    assert_eq!(wind.iter().map(|p| p.year).collect::<Vec<_>>(), [2020.0, 2021.0]);
    assert_eq!(wind.iter().map(|p| p.cost).collect::<Vec<_>>(), [100.0, 90.0]);

    let solar = &series["solar"];
    assert!((solar[0].cost - 200.0).abs() < 1e-12);
    assert!((solar[1].cost - 180.0 * 0.5_f64.powf(0.1)).abs() < 1e-9);
}
