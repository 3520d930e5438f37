//! The action value type and the small algebra the kernels build on:
//! speeds between samples, peak classification, interpolation and the
//! line decomposition used by the renderer.

use serde::{Deserialize, Serialize};

use crate::util::clamplerp;

/// One position sample: `pos` (0..=100 after normalization) at `at`
/// milliseconds. Fractional values are legal until a script is normalized.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Action {
  #[serde(default)]
  pub at: f64,
  #[serde(default)]
  pub pos: f64,
}

impl Action {
  pub fn new(at: f64, pos: f64) -> Self {
    Action { at, pos }
  }
}

/// Signed speed from `a` to `b` in position units per second; 0 when the
/// samples share a timestamp.
pub fn speed_between(a: Action, b: Action) -> f64 {
  if a.at == b.at {
    return 0.0;
  }
  (b.pos - a.pos) / (b.at - a.at) * 1000.0
}

pub fn abs_speed_between(a: Action, b: Action) -> f64 {
  speed_between(a, b).abs()
}

/// Speed across a whole segment, first sample to last. 0 for segments
/// shorter than two samples.
pub fn segment_speed(segment: &[Action]) -> f64 {
  match (segment.first(), segment.last()) {
    (Some(&first), Some(&last)) => speed_between(first, last),
    _ => 0.0,
  }
}

pub fn segment_abs_speed(segment: &[Action]) -> f64 {
  segment_speed(segment).abs()
}

/// Classifies the action at `index` as a peak (`1`), a valley (`-1`) or an
/// interior point (`0`).
///
/// Both ends of the array count as peaks. A horizontal run (zero speed) is
/// its own direction class, so entering or leaving a plateau is a reversal.
/// Callers should integer-snap timestamps (normalize) first; float drift
/// near zero speeds can flip the class.
pub fn is_peak(actions: &[Action], index: usize) -> i8 {
  let action = actions[index];
  let prev = index.checked_sub(1).map(|i| actions[i]);
  let next = actions.get(index + 1).copied();

  let (prev, next) = match (prev, next) {
    // corners always carry a peak
    (None, _) | (_, None) => return 1,
    (Some(p), Some(n)) => (p, n),
  };

  let speed_to = speed_between(prev, action);
  let speed_from = speed_between(action, next);

  // Math.sign semantics: zero is neither positive nor negative
  let sign = |v: f64| {
    if v == 0.0 {
      0i8
    } else if v > 0.0 {
      1
    } else {
      -1
    }
  };

  if sign(speed_to) == sign(speed_from) {
    return 0;
  }
  if speed_to > speed_from {
    1
  } else if speed_to < speed_from {
    -1
  } else {
    0
  }
}

/// Rightmost index whose action is at or before `at`. Returns 0 before the
/// first action and `len - 1` past the last.
pub fn binary_find_left_border(actions: &[Action], at: f64) -> usize {
  if actions.len() <= 1 {
    return 0;
  }
  if at < actions[0].at {
    return 0;
  }
  if at > actions[actions.len() - 1].at {
    return actions.len() - 1;
  }

  actions.partition_point(|a| a.at <= at) - 1
}

/// Piecewise-linear interpolation of `pos` at time `at`, clamping at the
/// ends. An empty curve reads as the neutral 50.
pub fn clerp_at(actions: &[Action], at: f64) -> f64 {
  match actions {
    [] => return 50.0,
    [only] => return only.pos,
    _ => {},
  }
  if at <= actions[0].at {
    return actions[0].pos;
  }
  if at >= actions[actions.len() - 1].at {
    return actions[actions.len() - 1].pos;
  }

  let left_index = binary_find_left_border(actions, at);
  let left = actions[left_index];
  if at == left.at || left_index + 1 >= actions.len() {
    return left.pos;
  }
  let right = actions[left_index + 1];

  clamplerp(at, left.at, right.at, left.pos, right.pos)
}

/// A line between two consecutive actions. `abs_speed` starts as
/// `|speed|` but may be replaced by a merged average (see
/// [`crate::curve::merge_lines_speed`]); the renderer colors and sorts by
/// it.
#[derive(Debug, Clone, Copy)]
pub struct Line {
  pub a: Action,
  pub b: Action,
  pub abs_speed: f64,
  pub speed: f64,
  pub sign: i8,
  pub dat: f64,
}

/// Decomposes actions into lines, skipping zero-length pairs.
pub fn actions_to_lines(actions: &[Action]) -> Vec<Line> {
  actions
    .windows(2)
    .filter(|w| w[0].at < w[1].at)
    .map(|w| {
      let speed = speed_between(w[0], w[1]);
      Line {
        a: w[0],
        b: w[1],
        abs_speed: speed.abs(),
        speed,
        sign: if speed == 0.0 {
          0
        } else if speed > 0.0 {
          1
        } else {
          -1
        },
        dat: w[1].at - w[0].at,
      }
    })
    .collect()
}

/// The zigzag of a curve: only its peaks and valleys, copied out.
pub fn actions_to_zigzag(actions: &[Action]) -> Vec<Action> {
  (0..actions.len())
    .filter(|&i| is_peak(actions, i) != 0)
    .map(|i| actions[i])
    .collect()
}
