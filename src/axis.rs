//! The seven motion axes a multi-axis funscript can carry.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::compare_with_order;

/// A motion degree of freedom. `L0` (stroke) is the primary axis; the
/// declaration order is the canonical channel ordering everywhere in the
/// crate.
#[derive(
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Debug,
  strum::EnumString,
  strum::IntoStaticStr,
)]
pub enum Axis {
  #[strum(to_string = "L0", serialize = "stroke")]
  L0,
  #[strum(to_string = "L1", serialize = "surge")]
  L1,
  #[strum(to_string = "L2", serialize = "sway")]
  L2,
  #[strum(to_string = "R0", serialize = "twist")]
  R0,
  #[strum(to_string = "R1", serialize = "roll")]
  R1,
  #[strum(to_string = "R2", serialize = "pitch")]
  R2,
  #[strum(to_string = "A1", serialize = "suck")]
  A1,
}

/// Channel names in canonical axis order.
pub const CHANNEL_NAMES: [&str; 7] = [
  "stroke", "surge", "sway", "twist", "roll", "pitch", "suck",
];

impl Axis {
  pub const ALL: [Axis; 7] = [
    Axis::L0,
    Axis::L1,
    Axis::L2,
    Axis::R0,
    Axis::R1,
    Axis::R2,
    Axis::A1,
  ];

  /// TCode identifier, e.g. `"L0"`.
  pub fn id(self) -> &'static str {
    self.into()
  }

  /// Human channel name, e.g. `"stroke"`.
  pub fn channel_name(self) -> &'static str {
    CHANNEL_NAMES[self as usize]
  }

  /// Legacy numeric ids used by older v1.1 scripts, `0..=6` in axis order.
  pub fn from_numeric(id: u64) -> Option<Axis> {
    Self::ALL.get(id as usize).copied()
  }

  /// Parses any spelling an on-disk script may use: the TCode id, the
  /// channel name, a legacy numeric id, or the `"singleaxis"` alias for the
  /// primary.
  pub fn parse(like: &str) -> Result<Axis> {
    if like == "singleaxis" {
      return Ok(Axis::L0);
    }
    if let Ok(id) = like.parse::<u64>() {
      return Axis::from_numeric(id).ok_or_else(|| Error::UnknownAxis(like.to_owned()));
    }
    Axis::from_str(like).map_err(|_| Error::UnknownAxis(like.to_owned()))
  }
}

impl Display for Axis {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_str(self.id())
  }
}

/// Channel-name mapping for an axis spelling, used when a v1.1 `axes` entry
/// carries an `id` instead of a channel name.
pub fn axis_to_channel_name(like: &str) -> Result<&'static str> {
  Axis::parse(like).map(Axis::channel_name)
}

/// TCode id for a channel name, falling back to the input when the channel
/// is not one of the seven canonical axes.
pub fn channel_name_to_axis(name: &str) -> Option<&'static str> {
  Axis::from_str(name).ok().map(Axis::id)
}

/// Orders channel keys by canonical axis position, unknown names
/// lexicographically after, missing channels last.
pub fn cmp_channels(a: Option<&str>, b: Option<&str>) -> Ordering {
  compare_with_order(a, b, &CHANNEL_NAMES)
}
