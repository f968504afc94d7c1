use sigma_quant::indicator::{rolling, RollingWindow};

#[test]
fn basic_mean() {
    let mut w = RollingWindow::new(3);
    w.push(1.0);
    w.push(2.0);
    assert!(!w.is_ready());
    assert_eq!(w.mean(), None);

    w.push(3.0);
    assert!((w.mean().unwrap() - 2.0).abs() < f64::EPSILON);

    w.push(4.0);
    assert!((w.mean().unwrap() - 3.0).abs() < f64::EPSILON);
}

#[test]
fn ring_buffer_wraps_correctly() {
    let mut w = RollingWindow::new(3);
    for v in [10.0, 20.0, 30.0, 40.0, 50.0] {
        w.push(v);
    }
    assert_eq!(w.values().collect::<Vec<_>>(), vec![30.0, 40.0, 50.0]);
    assert!((w.mean().unwrap() - 40.0).abs() < f64::EPSILON);
    assert!((w.std().unwrap() - 10.0).abs() < 1e-12);
}

#[test]
fn no_drift_after_many_pushes() {
    let mut w = RollingWindow::new(10);
    let mut naive_buf: Vec<f64> = Vec::new();

    for i in 0..10_000u64 {
        let val = (i as f64) * 0.1 + 0.01;
        w.push(val);
        naive_buf.push(val);
        if naive_buf.len() > 10 {
            naive_buf.remove(0);
        }

        if let Some(ring_avg) = w.mean() {
            let naive_avg: f64 = naive_buf.iter().sum::<f64>() / naive_buf.len() as f64;
            assert!(
                (ring_avg - naive_avg).abs() < 1e-8,
                "Drift at i={}: ring={} naive={}",
                i,
                ring_avg,
                naive_avg
            );
        }
    }
}

#[test]
fn gaps_restart_the_window() {
    let values = [Some(1.0), Some(2.0), None, Some(3.0), Some(5.0), Some(7.0)];
    let out = rolling(&values, 2, RollingWindow::mean);
    assert_eq!(out, vec![None, Some(1.5), None, None, Some(4.0), Some(6.0)]);
}

#[test]
fn zeros_after_moving_values_average_to_exactly_zero() {
    let mut w = RollingWindow::new(14);
    for i in 0..50u32 {
        w.push(0.1 * f64::from(i % 7) + 0.013 * f64::from(i) + 1e-3);
    }
    for _ in 0..20 {
        w.push(0.0);
    }
    assert_eq!(w.mean(), Some(0.0));
    assert_eq!(w.std(), Some(0.0));
}
