use approx::assert_abs_diff_eq;

use super::*;
use crate::action::actions_to_lines;

fn acts(pairs: &[(f64, f64)]) -> Vec<Action> {
  pairs.iter().map(|&(at, pos)| Action::new(at, pos)).collect()
}

fn ats(actions: &[Action]) -> Vec<f64> {
  actions.iter().map(|a| a.at).collect()
}

#[test]
fn segments_are_peak_bounded() {
  let actions = acts(&[
    (0.0, 0.0),
    (50.0, 40.0),
    (100.0, 100.0),
    (150.0, 50.0),
    (200.0, 0.0),
    (300.0, 100.0),
  ]);
  let segments = split_to_segments(&actions);
  assert_eq!(segments.len(), 3);
  assert_eq!(ats(&segments[0]), vec![0.0, 50.0, 100.0]);
  assert_eq!(ats(&segments[1]), vec![100.0, 150.0, 200.0]);
  assert_eq!(ats(&segments[2]), vec![200.0, 300.0]);
}

#[test]
fn connect_inverts_split() {
  let actions = acts(&[
    (0.0, 0.0),
    (50.0, 40.0),
    (100.0, 100.0),
    (200.0, 0.0),
    (300.0, 100.0),
  ]);
  let rejoined = connect_segments(&split_to_segments(&actions));
  assert_eq!(rejoined, actions);
}

#[test]
fn split_of_degenerate_curves() {
  assert!(split_to_segments(&[]).is_empty());
  assert!(split_to_segments(&[Action::new(0.0, 50.0)]).is_empty());
  let pair = acts(&[(0.0, 0.0), (100.0, 100.0)]);
  assert_eq!(split_to_segments(&pair), vec![pair]);
}

#[test]
fn deviation_of_straight_line_is_zero() {
  let actions = acts(&[(0.0, 0.0), (50.0, 25.0), (100.0, 50.0)]);
  assert_abs_diff_eq!(line_deviation(&actions), 0.0);
}

#[test]
fn deviation_measures_worst_point() {
  let actions = acts(&[(0.0, 0.0), (25.0, 30.0), (50.0, 27.0), (100.0, 100.0)]);
  // expected positions on the line are 25 and 50
  assert_abs_diff_eq!(line_deviation(&actions), 23.0);
  assert_eq!(line_deviation(&actions[..2]), 0.0);
}

#[test]
fn simplify_collapses_straight_runs() {
  let actions = acts(&[
    (0.0, 0.0),
    (25.0, 25.5),
    (50.0, 50.0),
    (75.0, 74.5),
    (100.0, 100.0),
    (200.0, 0.0),
  ]);
  let simplified = simplify_linear_curve(&actions, 1.0);
  assert_eq!(ats(&simplified), vec![0.0, 100.0, 200.0]);
}

#[test]
fn simplify_keeps_real_knees() {
  let actions = acts(&[(0.0, 0.0), (50.0, 80.0), (100.0, 100.0), (200.0, 0.0)]);
  let simplified = simplify_linear_curve(&actions, 3.0);
  assert_eq!(ats(&simplified), vec![0.0, 50.0, 100.0, 200.0]);
}

#[test]
fn simplify_removed_points_stay_within_threshold() {
  let actions = acts(&[
    (0.0, 0.0),
    (30.0, 28.0),
    (60.0, 62.0),
    (100.0, 100.0),
    (150.0, 52.0),
    (200.0, 0.0),
  ]);
  let threshold = 4.0;
  let simplified = simplify_linear_curve(&actions, threshold);

  for window in simplified.windows(2) {
    let removed: Vec<Action> = actions
      .iter()
      .copied()
      .filter(|a| a.at >= window[0].at && a.at <= window[1].at)
      .collect();
    assert!(line_deviation(&removed) <= threshold);
  }
}

#[test]
fn smoothing_pulls_outliers_in() {
  let mut curve = acts(&[
    (0.0, 50.0),
    (20.0, 50.0),
    (40.0, 100.0),
    (60.0, 50.0),
    (80.0, 50.0),
  ]);
  smooth_curve(&mut curve, 50.0, 1, false);
  assert!(curve[2].pos < 100.0);
  assert!(curve[1].pos > 50.0);
  // timestamps never move
  assert_eq!(ats(&curve), vec![0.0, 20.0, 40.0, 60.0, 80.0]);
}

#[test]
fn smoothing_can_preserve_ends() {
  let mut curve = acts(&[(0.0, 0.0), (30.0, 100.0), (60.0, 0.0)]);
  smooth_curve(&mut curve, 50.0, 2, true);
  assert_eq!(curve[0].pos, 0.0);
  assert_eq!(curve[2].pos, 0.0);
  assert!(curve[1].pos < 100.0);
}

#[test]
fn smoothing_outside_time_radius_is_identity() {
  let mut curve = acts(&[(0.0, 10.0), (1000.0, 90.0), (2000.0, 10.0)]);
  smooth_curve(&mut curve, 50.0, 3, false);
  assert_eq!(curve, acts(&[(0.0, 10.0), (1000.0, 90.0), (2000.0, 10.0)]));
}

#[test]
fn windowed_average_smoothing() {
  let actions = acts(&[(0.0, 0.0), (10.0, 100.0), (20.0, 0.0)]);
  let smoothed = smooth_actions(&actions, 3);
  assert_abs_diff_eq!(smoothed[1].pos, 100.0 / 3.0, epsilon = 1e-9);
  assert_eq!(smooth_actions(&actions, 1), actions);
}

#[test]
fn line_merging_averages_short_same_sign_runs() {
  let actions = acts(&[(0.0, 0.0), (100.0, 10.0), (300.0, 90.0), (400.0, 0.0)]);
  let mut lines = actions_to_lines(&actions);
  merge_lines_speed(&mut lines, 500.0);

  // first two lines rise and together span 300ms <= limit
  let expected = (100.0 * 100.0 + 400.0 * 200.0) / 300.0;
  assert_abs_diff_eq!(lines[0].abs_speed, expected, epsilon = 1e-9);
  assert_abs_diff_eq!(lines[1].abs_speed, expected, epsilon = 1e-9);
  // the falling line is untouched
  assert_abs_diff_eq!(lines[2].abs_speed, 900.0, epsilon = 1e-9);
}

#[test]
fn line_merging_respects_limit_and_zero() {
  let actions = acts(&[(0.0, 0.0), (400.0, 40.0), (900.0, 90.0)]);
  let mut lines = actions_to_lines(&actions);
  let before: Vec<f64> = lines.iter().map(|l| l.abs_speed).collect();

  // run spans 900ms > 500ms limit
  merge_lines_speed(&mut lines, 500.0);
  assert_eq!(lines.iter().map(|l| l.abs_speed).collect::<Vec<_>>(), before);

  // zero limit disables merging entirely
  merge_lines_speed(&mut lines, 0.0);
  assert_eq!(lines.iter().map(|l| l.abs_speed).collect::<Vec<_>>(), before);
}

#[test]
fn peak_limiting_converges_in_one_pass() {
  let actions = acts(&[(0.0, 0.0), (50.0, 100.0), (100.0, 0.0)]);
  let limited = limit_peak_speed(&actions, 500.0);

  assert_eq!(limited.len(), 3);
  assert_abs_diff_eq!(limited[0].pos, 37.5, epsilon = 1e-9);
  assert_abs_diff_eq!(limited[1].pos, 25.0, epsilon = 1e-9);
  assert_abs_diff_eq!(limited[2].pos, 37.5, epsilon = 1e-9);
}

#[test]
fn peak_limiting_bounds_all_pairs() {
  let actions = acts(&[
    (0.0, 0.0),
    (40.0, 95.0),
    (90.0, 5.0),
    (130.0, 100.0),
    (200.0, 0.0),
  ]);
  let max_speed = 600.0;
  let limited = limit_peak_speed(&actions, max_speed);

  for w in actions_to_zigzag(&limited).windows(2) {
    // allow fixed-point round-off from the capped pass count
    assert!(abs_speed_between(w[0], w[1]) <= max_speed + 1.0);
  }
}

#[test]
fn peak_limiting_is_identity_below_limit() {
  let actions = acts(&[(0.0, 0.0), (500.0, 100.0), (1000.0, 0.0)]);
  assert_eq!(limit_peak_speed(&actions, 500.0), actions);
}

#[test]
fn peak_limiting_reinterpolates_interior() {
  let actions = acts(&[(0.0, 0.0), (25.0, 50.0), (50.0, 100.0), (100.0, 0.0)]);
  let limited = limit_peak_speed(&actions, 1000.0);

  // interior point keeps its at, moves onto the new segment line
  let mid = limited.iter().find(|a| a.at == 25.0).unwrap();
  let left = limited[0];
  let right = limited.iter().find(|a| a.at == 50.0).unwrap();
  assert_abs_diff_eq!(mid.pos, (left.pos + right.pos) / 2.0, epsilon = 1e-9);
}

#[test]
fn handy_smoothing_caps_speed() {
  let actions = acts(&[(0.0, 0.0), (50.0, 100.0), (100.0, 0.0), (150.0, 100.0)]);
  let smoothed = handy_smooth(&actions);

  // the final integer rounding can add up to 1000/dat u/s on top of the cap
  for w in smoothed.windows(2) {
    assert!(abs_speed_between(w[0], w[1]) <= HANDY_MAX_SPEED + 25.0);
  }
  // everything is integral
  for a in &smoothed {
    assert_eq!(a.at, a.at.round());
    assert_eq!(a.pos, a.pos.round());
  }
}

#[test]
fn handy_smoothing_drops_crowded_interiors() {
  // interior points 10ms from the endpoints violate the min interval
  let actions = acts(&[(0.0, 0.0), (10.0, 20.0), (190.0, 80.0), (200.0, 100.0)]);
  let smoothed = handy_smooth(&actions);
  assert_eq!(ats(&smoothed), vec![0.0, 200.0]);
}

#[test]
fn handy_smoothing_straightens_within_threshold() {
  let actions = acts(&[(0.0, 0.0), (100.0, 51.0), (200.0, 100.0)]);
  let smoothed = handy_smooth(&actions);
  assert_eq!(ats(&smoothed), vec![0.0, 200.0]);
}

#[test]
fn handy_smoothing_keeps_slow_scripts_intact() {
  let actions = acts(&[(0.0, 0.0), (500.0, 100.0), (1000.0, 0.0), (1500.0, 100.0)]);
  assert_eq!(handy_smooth(&actions), actions);
}
