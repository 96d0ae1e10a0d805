use approx::assert_relative_eq;
use sales_forecast::config::ForecastPolicy;
use sales_forecast::metrics::{evaluate_in_sample, history_flag};
use sales_forecast::models::{AccuracyScope, QualityFlag};
use sales_forecast::ForecastError;

#[test]
fn test_exact_predictions_have_zero_error() {
    let actual = vec![10.0, 20.0, 30.0];
    let (metric, flags) = evaluate_in_sample(&actual, &actual, &ForecastPolicy::default()).unwrap();

    assert_eq!(metric.mape, Some(0.0));
    assert_eq!(metric.evaluated, 3);
    assert_eq!(metric.scope, AccuracyScope::InSample);
    assert!(flags.is_empty());
}

#[test]
fn test_known_error() {
    let actual = vec![10.0, 20.0, 40.0, 50.0];
    let predicted = vec![12.0, 18.0, 44.0, 50.0];

    let (metric, _) = evaluate_in_sample(&actual, &predicted, &ForecastPolicy::default()).unwrap();

    // (20% + 10% + 10% + 0%) / 4
    assert_relative_eq!(metric.mape.unwrap(), 10.0, epsilon = 1e-9);
}

#[test]
fn test_zero_actual_is_skipped_and_flagged() {
    let actual = vec![10.0, 0.0, 20.0];
    let predicted = vec![11.0, 5.0, 22.0];

    let (metric, flags) = evaluate_in_sample(&actual, &predicted, &ForecastPolicy::default()).unwrap();

    assert_relative_eq!(metric.mape.unwrap(), 10.0, epsilon = 1e-9);
    assert_eq!(metric.evaluated, 2);
    assert_eq!(metric.skipped, 1);
    assert_eq!(
        flags,
        vec![QualityFlag::ZeroActualsSkipped {
            skipped: 1,
            evaluated: 2
        }]
    );
}

#[test]
fn test_all_zero_actuals_leave_metric_undefined() {
    let (metric, flags) =
        evaluate_in_sample(&[0.0, 0.0], &[1.0, 2.0], &ForecastPolicy::default()).unwrap();

    assert_eq!(metric.mape, None);
    assert_eq!(metric.skipped, 2);
    assert_eq!(flags, vec![QualityFlag::MetricUndefined]);
}

#[test]
fn test_huge_mape_is_flagged_not_clamped() {
    let actual = vec![0.001, 10.0];
    let predicted = vec![1000.0, 10.0];

    let (metric, flags) = evaluate_in_sample(&actual, &predicted, &ForecastPolicy::default()).unwrap();

    let mape = metric.mape.unwrap();
    assert!(mape > 1e5);
    assert_eq!(
        flags,
        vec![QualityFlag::MapeUnreliable {
            mape,
            threshold: 1e5
        }]
    );
}

#[test]
fn test_mismatched_lengths_are_rejected() {
    let result = evaluate_in_sample(&[1.0, 2.0], &[1.0], &ForecastPolicy::default());
    assert!(matches!(result, Err(ForecastError::ForecastFailure(_))));

    let empty: Vec<f64> = vec![];
    assert!(matches!(
        evaluate_in_sample(&empty, &empty, &ForecastPolicy::default()),
        Err(ForecastError::ForecastFailure(_))
    ));
}

#[test]
fn test_history_flag() {
    assert_eq!(
        history_flag(5, 20),
        Some(QualityFlag::BelowRecommendedHistory {
            observed: 5,
            recommended: 20
        })
    );
    assert_eq!(history_flag(20, 20), None);
}

#[test]
fn test_flag_messages() {
    let flag = QualityFlag::MapeUnreliable {
        mape: 123456.0,
        threshold: 1e5,
    };
    assert!(flag.to_string().contains("not reliable"));
    assert!(QualityFlag::MetricUndefined.to_string().contains("undefined"));
}
