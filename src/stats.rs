//! Statistical summaries of a motion curve: the speed a device actually
//! has to sustain, the time-weighted average speed, and the stat block the
//! renderer prints.

use itertools::Itertools;

use crate::action::{abs_speed_between, actions_to_zigzag, is_peak, Action, Line};
use crate::time::seconds_to_duration;

/// Time-weighted mean of the display speeds of a set of lines.
pub fn weighted_speed(lines: &[Line]) -> f64 {
  let total: f64 = lines.iter().map(|l| l.dat).sum();
  if total == 0.0 {
    return 0.0;
  }
  lines.iter().map(|l| l.abs_speed * l.dat).sum::<f64>() / total
}

/// The highest speed the device must sustain for at least 50 ms.
///
/// A script's instantaneous max speed overstates what a device needs: it
/// only has to arrive at the next peak on time. For every action this
/// takes the speed to the next peak, then picks the fastest one held for
/// 50 ms or more.
pub fn actions_required_max_speed(actions: &[Action]) -> f64 {
  if actions.len() < 2 {
    return 0.0;
  }

  let mut required: Vec<(f64, f64)> = Vec::new();
  let mut next_peak = 0usize;

  for i in 0..actions.len() {
    if next_peak == i {
      match (i + 1..actions.len()).find(|&idx| is_peak(actions, idx) != 0) {
        Some(idx) => next_peak = idx,
        None => break,
      }
    }
    let peak = actions[next_peak];
    required.push((abs_speed_between(actions[i], peak), peak.at - actions[i].at));
  }

  required.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

  required
    .iter()
    .find(|&&(_, dat)| dat >= 50.0)
    .map_or(0.0, |&(speed, _)| speed)
}

/// Time-weighted average of the peak-to-peak speeds, ignoring transitions
/// at or below 30 u/s (holds and drift). Each transition between
/// consecutive fast peaks is weighted by its own span. 0 when the curve has
/// no fast transitions.
pub fn actions_average_speed(actions: &[Action]) -> f64 {
  let zigzag = actions_to_zigzag(actions);
  let fast: Vec<Action> = zigzag
    .iter()
    .tuple_windows()
    .filter(|(a, b)| abs_speed_between(**a, **b) > 30.0)
    .map(|(_, b)| *b)
    .collect();

  let denominator: f64 = fast.iter().tuple_windows().map(|(a, b)| b.at - a.at).sum();
  if denominator == 0.0 {
    return 0.0;
  }
  let numerator: f64 = fast
    .iter()
    .tuple_windows()
    .map(|(a, b)| abs_speed_between(*a, *b) * (b.at - a.at))
    .sum();

  numerator / denominator
}

/// The stat block a rendered heatmap prints, in display form.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
  pub duration: String,
  pub actions: usize,
  pub max_speed: f64,
  pub avg_speed: f64,
}

pub fn to_stats(actions: &[Action], duration_seconds: f64) -> Stats {
  Stats {
    duration: seconds_to_duration(duration_seconds),
    actions: (0..actions.len()).filter(|&i| is_peak(actions, i) != 0).count(),
    max_speed: actions_required_max_speed(actions).round(),
    avg_speed: actions_average_speed(actions).round(),
  }
}
