//! Curve-manipulation kernels: segment split/join, smoothing,
//! simplification and speed limiting, plus the composed pipeline for the
//! Handy's device constraints.

#[cfg(test)]
mod tests;

use log::warn;

use crate::action::{abs_speed_between, actions_to_zigzag, is_peak, Action, Line};
use crate::util::{lerp, unlerp};

/// Top speed the Handy can track, in position units per second.
pub const HANDY_MAX_SPEED: f64 = 550.0;
/// Shortest interval between samples the device accepts, in ms.
pub const HANDY_MIN_INTERVAL: f64 = 60.0;
/// Deviation under which a run of samples is flattened to a line.
pub const HANDY_MAX_STRAIGHT_THRESHOLD: f64 = 3.0;

/// Splits a curve into peak-bounded segments. Each segment runs from one
/// peak to the next, inclusive, so neighboring segments share their border
/// peak.
pub fn split_to_segments(actions: &[Action]) -> Vec<Vec<Action>> {
  let mut segments = Vec::new();
  let mut prev_peak: Option<usize> = None;

  for i in 0..actions.len() {
    if is_peak(actions, i) != 0 {
      if let Some(start) = prev_peak {
        segments.push(actions[start..=i].to_vec());
      }
      prev_peak = Some(i);
    }
  }

  segments
}

/// Joins segments back into one curve, dropping the duplicated border
/// peaks.
pub fn connect_segments(segments: &[Vec<Action>]) -> Vec<Action> {
  let mut result: Vec<Action> = Vec::new();
  for segment in segments {
    for &action in segment {
      if result.last() != Some(&action) {
        result.push(action);
      }
    }
  }
  result
}

/// Maximum vertical distance of interior points from the straight line
/// through a segment's endpoints, parameterized by `at`.
pub fn line_deviation(segment: &[Action]) -> f64 {
  if segment.len() <= 2 {
    return 0.0;
  }

  let first = segment[0];
  let last = segment[segment.len() - 1];
  if last.at == first.at {
    return 0.0;
  }

  segment[1..segment.len() - 1]
    .iter()
    .map(|action| {
      let t = (action.at - first.at) / (last.at - first.at);
      (action.pos - lerp(first.pos, last.pos, t)).abs()
    })
    .fold(0.0, f64::max)
}

/// Removes points that lie within `threshold` of a straight line, segment
/// by segment. Greedily grows each interval as far as the deviation allows
/// and keeps only its endpoints.
pub fn simplify_linear_curve(curve: &[Action], threshold: f64) -> Vec<Action> {
  if curve.len() <= 2 {
    return curve.to_vec();
  }

  let segments = split_to_segments(curve);
  let mut simplified = Vec::with_capacity(segments.len());

  for segment in &segments {
    if line_deviation(segment) <= threshold {
      simplified.push(vec![segment[0], segment[segment.len() - 1]]);
      continue;
    }

    let mut result = vec![segment[0]];
    let mut start = 0;

    while start < segment.len() - 1 {
      let mut end = start + 2;
      while end <= segment.len() - 1 {
        if line_deviation(&segment[start..=end]) > threshold {
          break;
        }
        end += 1;
      }
      let end = (end - 1).max(start + 1);

      result.push(segment[end]);
      start = end;
    }

    simplified.push(result);
  }

  connect_segments(&simplified)
}

/// Weighted moving average over a window of five neighbors each side.
/// The weight of a neighbor is `max(0, time_radius - |Δat|)`, so samples
/// further than `time_radius` ms away contribute nothing. Each pass reads
/// the positions the pass started from.
pub fn smooth_curve(curve: &mut [Action], time_radius: f64, iterations: usize, preserve_ends: bool) {
  const RADIUS: isize = 5;

  for _ in 0..iterations {
    let positions: Vec<f64> = curve.iter().map(|a| a.pos).collect();

    for i in 0..curve.len() {
      if preserve_ends && (i == 0 || i == curve.len() - 1) {
        continue;
      }

      let mut sum = 0.0;
      let mut weight_sum = 0.0;
      for j in -RADIUS..=RADIUS {
        let index = i as isize + j;
        if index < 0 || index >= curve.len() as isize {
          continue;
        }
        let index = index as usize;
        let weight = (time_radius - (curve[index].at - curve[i].at).abs()).max(0.0);
        sum += positions[index] * weight;
        weight_sum += weight;
      }

      curve[i].pos = sum / weight_sum;
    }
  }
}

/// Plain centered moving average over a fixed-size window. A window under
/// two samples is the identity.
pub fn smooth_actions(actions: &[Action], window_size: usize) -> Vec<Action> {
  if window_size < 2 {
    return actions.to_vec();
  }

  (0..actions.len())
    .map(|i| {
      let start = i.saturating_sub(window_size / 2);
      let end = (start + window_size).min(actions.len());
      let window = &actions[start..end];
      let avg = window.iter().map(|a| a.pos).sum::<f64>() / window.len() as f64;
      Action::new(actions[i].at, avg)
    })
    .collect()
}

/// Replaces the display speed of same-sign runs no longer than
/// `merge_limit` ms with their time-weighted mean, one left-to-right pass
/// over non-overlapping runs. Only `abs_speed` changes; geometry stays.
pub fn merge_lines_speed(lines: &mut [Line], merge_limit: f64) {
  if merge_limit == 0.0 {
    return;
  }

  let mut i = 0;
  while i + 1 < lines.len() {
    let mut j = i;
    while j + 1 < lines.len() && lines[i].sign == lines[j + 1].sign {
      j += 1;
    }

    if i == j {
      i = j + 1;
      continue;
    }
    let run = &lines[i..=j];
    let total_dat: f64 = run.iter().map(|l| l.dat).sum();
    if total_dat > merge_limit {
      i = j + 1;
      continue;
    }

    let avg = run.iter().map(|l| l.abs_speed * l.dat).sum::<f64>() / total_dat;
    for line in &mut lines[i..=j] {
      line.abs_speed = avg;
    }
    i = j + 1;
  }
}

/// Lowers peaks until no adjacent pair of peaks exceeds `max_speed`,
/// then re-interpolates the interior points of each segment against the
/// moved peaks.
///
/// Runs at most 10 fixed-point passes. For each offending pair the height
/// change `(R.pos - L.pos) * (|speed| - max) / |speed|` is split half to
/// each side; a peak pulled the same way from both sides accumulates the
/// sum, a peak pulled both ways keeps the larger pull.
pub fn limit_peak_speed(actions: &[Action], max_speed: f64) -> Vec<Action> {
  let mut peaks = actions_to_zigzag(actions);
  if peaks.len() < 2 {
    return actions.to_vec();
  }

  let mut converged = false;
  for _ in 0..10 {
    let mut lchanges = vec![0.0; peaks.len()];
    let mut rchanges = vec![0.0; peaks.len()];

    for left in 0..peaks.len() - 1 {
      let right = left + 1;
      let abs_speed = abs_speed_between(peaks[left], peaks[right]);
      if abs_speed <= max_speed {
        continue;
      }
      let height = peaks[right].pos - peaks[left].pos;
      let total_change = height * (abs_speed - max_speed) / abs_speed;
      lchanges[left] += total_change / 2.0;
      rchanges[right] -= total_change / 2.0;
    }

    for i in 0..peaks.len() {
      let (l, r) = (lchanges[i], rchanges[i]);
      let change = if l * r < 0.0 {
        // opposing pulls: the stronger side wins
        if l.abs() > r.abs() {
          l
        } else {
          r
        }
      } else {
        l + r
      };
      peaks[i].pos += change;
    }

    let worst = peaks
      .windows(2)
      .map(|w| abs_speed_between(w[0], w[1]))
      .fold(0.0, f64::max);
    if worst <= max_speed {
      converged = true;
      break;
    }
  }
  if !converged {
    warn!("limit_peak_speed: still above {max_speed} u/s after 10 passes");
  }

  // spread the moved peaks back over the interior points
  let mut segments = split_to_segments(actions);
  for (i, segment) in segments.iter_mut().enumerate() {
    let new_left = peaks[i].pos;
    let new_right = peaks[i + 1].pos;
    let left_at = segment[0].at;
    let right_at = segment[segment.len() - 1].at;
    for action in segment.iter_mut() {
      action.pos = lerp(new_left, new_right, unlerp(left_at, right_at, action.at));
    }
  }

  connect_segments(&segments)
}

fn straighten(segment: Vec<Action>) -> Vec<Action> {
  if segment.len() <= 2 {
    return segment;
  }
  if line_deviation(&segment) <= HANDY_MAX_STRAIGHT_THRESHOLD {
    return vec![segment[0], segment[segment.len() - 1]];
  }
  segment
}

fn simplify_handy_segment(segment: &[Action]) -> Vec<Action> {
  if segment.len() <= 2 {
    return segment.to_vec();
  }
  let first = segment[0];
  let last = segment[segment.len() - 1];

  if line_deviation(segment) <= HANDY_MAX_STRAIGHT_THRESHOLD {
    return vec![first, last];
  }
  if abs_speed_between(first, last) > HANDY_MAX_SPEED {
    return vec![first, last];
  }

  // keep interior points that neither force an over-speed hop nor crowd
  // the endpoints
  let middle: Vec<Action> = segment[1..segment.len() - 1]
    .iter()
    .copied()
    .filter(|&e| {
      abs_speed_between(first, e) < HANDY_MAX_SPEED && abs_speed_between(e, last) < HANDY_MAX_SPEED
    })
    .filter(|&e| e.at - first.at >= HANDY_MIN_INTERVAL && last.at - e.at >= HANDY_MIN_INTERVAL)
    .collect();

  if middle.is_empty() {
    return vec![first, last];
  }
  if middle.len() == 1 {
    return straighten(vec![first, middle[0], last]);
  }

  let middle_duration = middle[middle.len() - 1].at - middle[0].at;
  if middle_duration < HANDY_MIN_INTERVAL {
    // room for a single interior point only
    let target = middle_duration / 2.0;
    let closest = middle
      .iter()
      .copied()
      .min_by(|a, b| {
        (a.at - target)
          .abs()
          .partial_cmp(&(b.at - target).abs())
          .unwrap_or(std::cmp::Ordering::Equal)
      })
      .unwrap();
    return straighten(vec![first, closest, last]);
  }

  let mut result = vec![first];
  result.extend(simplify_handy_segment(&middle));
  result.push(last);
  result
}

/// Smooths a curve to fit the Handy's speed and interval constraints.
///
/// Rounds positions, prunes interior points per segment, merges
/// near-stationary neighbors around peaks, clamps peak speeds to
/// [`HANDY_MAX_SPEED`], simplifies, and rounds the result to integers.
pub fn handy_smooth(actions: &[Action]) -> Vec<Action> {
  let mut actions = actions.to_vec();
  for action in &mut actions {
    action.pos = action.pos.round();
  }

  let segments = split_to_segments(&actions);
  let filtered: Vec<Vec<Action>> = segments.iter().map(|s| simplify_handy_segment(s)).collect();
  let mut actions = connect_segments(&filtered);

  // merge stutter around peaks: a peak and its neighbor moving at <= 10 u/s
  // collapse into their midpoint
  let mut i = 1;
  while i < actions.len() {
    if is_peak(&actions, i) == 0 && is_peak(&actions, i - 1) == 0 {
      i += 1;
      continue;
    }
    let (prev, current) = (actions[i - 1], actions[i]);
    if abs_speed_between(prev, current) > 10.0 {
      i += 1;
      continue;
    }

    actions[i - 1].pos = lerp(prev.pos, current.pos, 0.5);
    actions[i - 1].at = lerp(prev.at, current.at, 0.5);
    actions.remove(i);
  }

  let actions = limit_peak_speed(&actions, HANDY_MAX_SPEED);
  let mut actions = simplify_linear_curve(&actions, HANDY_MAX_STRAIGHT_THRESHOLD);

  for action in &mut actions {
    action.at = action.at.round();
    action.pos = action.pos.round();
  }
  actions
}
