use std::path::Path;

use sigma_quant::config::Config;
use sigma_quant::regressor::ModelKind;

#[test]
fn shipped_default_toml_matches_builtin_defaults() {
    let config = Config::load(Some(Path::new("config/default.toml"))).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.training.model.kind, ModelKind::Ridge);
    assert!((config.training.model.ridge.alpha - 10.0).abs() < f64::EPSILON);
    assert_eq!(config.training.model.forest.n_estimators, 300);
    assert_eq!(config.training.model.forest.max_depth, None);
    assert_eq!(config.prediction.horizon_days, 21);
}

#[test]
fn pricing_defaults_build_valid_parameters() {
    let params = Config::default().pricing.base_parameters().unwrap();
    assert!((params.spot - 100.0).abs() < f64::EPSILON);
    assert!((params.strike - 100.0).abs() < f64::EPSILON);
    assert!((params.time_to_maturity - 1.0).abs() < f64::EPSILON);
    assert!((params.volatility - 0.2).abs() < f64::EPSILON);
    assert!((params.risk_free_rate - 0.05).abs() < f64::EPSILON);
}

#[test]
fn unknown_model_kind_is_a_parse_error() {
    let err = Config::from_toml("[training.model]\nkind = \"svm\"\n").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn pipeline_config_carries_every_section() {
    let config = Config::from_toml(
        r#"
[features]
min_history_days = 300

[training]
n_splits = 3

[prediction]
horizon_days = 7
min_sigma = 0.05
tail_rows = 50
"#,
    )
    .unwrap();
    let p = config.pipeline();
    assert_eq!(p.features.min_history_days, 300);
    assert_eq!(p.training.n_splits, 3);
    assert_eq!(p.horizon_days, 7);
    assert!((p.bounds.min - 0.05).abs() < f64::EPSILON);
    assert!((p.bounds.max - 3.0).abs() < f64::EPSILON);
    assert_eq!(p.tail_rows, 50);
}
