//! The in-memory funscript model: metadata, chapters, bookmarks, the
//! parsed file-path info, and the script itself with its secondary
//! channels.

use std::str::FromStr;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::action::Action;
use crate::axis::{cmp_channels, Axis};
use crate::time::{ms_to_time_span, time_span_to_ms};
use crate::util::clamp;

fn zero_time_span() -> String {
  "00:00:00.000".to_owned()
}

/// A named span of the script. Chapters may overlap; the renderer colors
/// them round-robin.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Chapter {
  pub name: String,
  #[serde(rename = "startTime")]
  pub start_time: String,
  #[serde(rename = "endTime")]
  pub end_time: String,
}

impl Default for Chapter {
  fn default() -> Self {
    Chapter {
      name: String::new(),
      start_time: zero_time_span(),
      end_time: zero_time_span(),
    }
  }
}

impl Chapter {
  /// Start in ms. Times are validated at parse; a hand-built bad span
  /// reads as 0.
  pub fn start_at(&self) -> f64 {
    time_span_to_ms(&self.start_time).unwrap_or(0) as f64
  }

  pub fn end_at(&self) -> f64 {
    time_span_to_ms(&self.end_time).unwrap_or(0) as f64
  }

  pub fn set_start_at(&mut self, ms: f64) {
    self.start_time = ms_to_time_span(ms);
  }

  pub fn set_end_at(&mut self, ms: f64) {
    self.end_time = ms_to_time_span(ms);
  }
}

/// A named instant.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Bookmark {
  pub name: String,
  pub time: String,
}

impl Default for Bookmark {
  fn default() -> Self {
    Bookmark {
      name: String::new(),
      time: zero_time_span(),
    }
  }
}

impl Bookmark {
  pub fn at(&self) -> f64 {
    time_span_to_ms(&self.time).unwrap_or(0) as f64
  }
}

/// Script metadata. Unknown keys round-trip through `extra`;
/// `durationTime` is derived from `duration` on serialization and the
/// parsed value is ignored.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Metadata {
  pub title: String,
  pub creator: String,
  pub description: String,
  /// Stored in seconds. Legacy scripts that stored ms are fixed up at
  /// parse time.
  pub duration: f64,
  #[serde(rename = "durationTime")]
  pub duration_time: Option<String>,
  pub chapters: Vec<Chapter>,
  pub bookmarks: Vec<Bookmark>,
  pub license: String,
  pub notes: String,
  pub performers: Vec<String>,
  pub topic_url: String,
  pub script_url: String,
  pub tags: Vec<String>,
  #[serde(rename = "type")]
  pub kind: String,
  pub video_url: String,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// Path information for a script on disk:
/// `<dir><title>[.<channel>].funscript`. A recognized axis suffix is
/// normalized to its channel name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScriptFile {
  pub dir: String,
  pub title: String,
  pub channel: Option<String>,
  /// Paths this file was merged from, informational only.
  pub merged_files: Vec<String>,
}

impl ScriptFile {
  pub fn new(file_path: &str) -> Self {
    let mut parts: Vec<&str> = file_path.split('.').collect();
    if parts.last() == Some(&"funscript") {
      parts.pop();
    }

    // only the exact axis spellings count; numeric ids stay in the title
    let mut channel = None;
    if let Some(axis) = parts.last().and_then(|last| Axis::from_str(last).ok()) {
      parts.pop();
      channel = Some(axis.channel_name().to_owned());
    }

    let stem = parts.join(".");
    let title_start = stem.rfind(|c| c == '/' || c == '\\').map_or(0, |i| i + 1);

    ScriptFile {
      dir: stem[..title_start].to_owned(),
      title: stem[title_start..].to_owned(),
      channel,
      merged_files: Vec::new(),
    }
  }

  pub fn file_path(&self) -> String {
    let channel = self
      .channel
      .as_deref()
      .map(|c| format!(".{c}"))
      .unwrap_or_default();
    format!("{}{}{}.funscript", self.dir, self.title, channel)
  }
}

/// A parsed funscript: one primary actions list plus any secondary
/// channels. Channels are scripts themselves, with `channel` set and no
/// nested channels of their own; they stay sorted in canonical axis order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
  pub channel: Option<String>,
  pub actions: Vec<Action>,
  pub channels: Vec<Script>,
  pub metadata: Metadata,
  pub file: Option<ScriptFile>,
}

impl Script {
  /// Restores the canonical channel ordering after out-of-order inserts.
  pub fn sort_channels(&mut self) {
    self
      .channels
      .sort_by(|a, b| cmp_channels(a.channel.as_deref(), b.channel.as_deref()));
  }

  /// Extent of the actions across the primary and every channel, in
  /// seconds.
  pub fn actions_duration(&self) -> f64 {
    let last_at = |s: &Script| s.actions.last().map_or(0.0, |a| a.at);
    self
      .channels
      .iter()
      .map(last_at)
      .fold(last_at(self), f64::max)
      / 1000.0
  }

  /// Stored duration when present, actions extent otherwise.
  pub fn duration(&self) -> f64 {
    if self.metadata.duration != 0.0 {
      self.metadata.duration
    } else {
      self.actions_duration()
    }
  }

  /// Best guess at the real duration. The stored value wins only when the
  /// actions neither outrun it nor stop short of a third of it.
  pub fn actual_duration(&self) -> f64 {
    let actions = self.actions_duration();
    let stored = self.metadata.duration;
    if stored == 0.0 || actions > stored || actions * 3.0 < stored {
      actions
    } else {
      stored
    }
  }

  /// Normalizes in place; idempotent and never failing.
  ///
  /// Rounds `at`/`pos` to integers and clamps `pos` to 0..=100, sorts by
  /// `at` keeping the last of each duplicate, drops negative timestamps
  /// except the most recent (snapped to 0 when nothing sits at 0 yet),
  /// and recomputes the duration across all channels.
  pub fn normalize(&mut self) -> &mut Self {
    for channel in &mut self.channels {
      channel.normalize();
    }

    for action in &mut self.actions {
      action.at = action.at.round();
      action.pos = clamp(action.pos.round(), 0.0, 100.0);
    }

    self
      .actions
      .sort_by(|a, b| a.at.partial_cmp(&b.at).unwrap_or(std::cmp::Ordering::Equal));
    let mut deduped: Vec<Action> = Vec::with_capacity(self.actions.len());
    for &action in self.actions.iter() {
      match deduped.last_mut() {
        // the later action wins a shared timestamp
        Some(last) if last.at == action.at => *last = action,
        _ => deduped.push(action),
      }
    }
    self.actions = deduped;

    let last_negative = self.actions.iter().rev().find(|a| a.at < 0.0).copied();
    if let Some(mut negative) = last_negative {
      self.actions.retain(|a| a.at >= 0.0);
      if self.actions.first().map_or(true, |first| first.at > 0.0) {
        negative.at = 0.0;
        self.actions.insert(0, negative);
      }
    }

    let duration = (self.actions_duration()).ceil();
    self.metadata.duration = duration;
    for channel in &mut self.channels {
      channel.metadata.duration = duration;
    }

    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn file_path_parsing() {
    let file = ScriptFile::new("/videos/Scene One.funscript");
    assert_eq!(file.dir, "/videos/");
    assert_eq!(file.title, "Scene One");
    assert_eq!(file.channel, None);
    assert_eq!(file.file_path(), "/videos/Scene One.funscript");

    let file = ScriptFile::new("/videos/Scene One.pitch.funscript");
    assert_eq!(file.title, "Scene One");
    assert_eq!(file.channel.as_deref(), Some("pitch"));

    // axis ids normalize to channel names
    let file = ScriptFile::new("clip.R1.funscript");
    assert_eq!(file.dir, "");
    assert_eq!(file.channel.as_deref(), Some("roll"));
    assert_eq!(file.file_path(), "clip.roll.funscript");
  }

  #[test]
  fn file_path_with_dots_in_title() {
    let file = ScriptFile::new("dir/Scene.v2.final.funscript");
    assert_eq!(file.title, "Scene.v2.final");
    assert_eq!(file.channel, None);
  }

  #[test]
  fn chapter_time_views() {
    let mut chapter = Chapter::default();
    chapter.set_start_at(90_000.0);
    chapter.set_end_at(120_500.0);
    assert_eq!(chapter.start_time, "00:01:30.000");
    assert_eq!(chapter.start_at(), 90_000.0);
    assert_eq!(chapter.end_at(), 120_500.0);
  }

  #[test]
  fn normalize_sorts_rounds_and_dedups() {
    let mut script = Script {
      actions: vec![
        Action::new(1000.4, 99.6),
        Action::new(0.0, -3.0),
        Action::new(1000.0, 20.0),
        Action::new(500.0, 120.0),
      ],
      ..Script::default()
    };
    script.normalize();

    assert_eq!(
      script.actions,
      vec![
        Action::new(0.0, 0.0),
        Action::new(500.0, 100.0),
        Action::new(1000.0, 100.0),
      ]
    );
    assert_eq!(script.metadata.duration, 1.0);
  }

  #[test]
  fn normalize_keeps_last_of_duplicate_at() {
    let mut script = Script {
      actions: vec![Action::new(100.0, 10.0), Action::new(100.0, 90.0)],
      ..Script::default()
    };
    script.normalize();
    assert_eq!(script.actions, vec![Action::new(100.0, 90.0)]);
  }

  #[test]
  fn normalize_snaps_last_negative_to_zero() {
    let mut script = Script {
      actions: vec![
        Action::new(-200.0, 10.0),
        Action::new(-50.0, 30.0),
        Action::new(100.0, 80.0),
      ],
      ..Script::default()
    };
    script.normalize();
    assert_eq!(
      script.actions,
      vec![Action::new(0.0, 30.0), Action::new(100.0, 80.0)]
    );
  }

  #[test]
  fn normalize_drops_negatives_when_zero_is_taken() {
    let mut script = Script {
      actions: vec![
        Action::new(-50.0, 30.0),
        Action::new(0.0, 10.0),
        Action::new(100.0, 80.0),
      ],
      ..Script::default()
    };
    script.normalize();
    assert_eq!(
      script.actions,
      vec![Action::new(0.0, 10.0), Action::new(100.0, 80.0)]
    );
  }

  #[test]
  fn normalize_is_idempotent() {
    let mut script = Script {
      actions: vec![
        Action::new(700.7, 55.4),
        Action::new(-10.0, 12.0),
        Action::new(300.2, 99.9),
      ],
      ..Script::default()
    };
    script.normalize();
    let once = script.clone();
    script.normalize();
    assert_eq!(script, once);
  }

  #[test]
  fn normalize_spans_channels() {
    let mut script = Script {
      actions: vec![Action::new(0.0, 0.0), Action::new(1000.0, 100.0)],
      channels: vec![Script {
        channel: Some("pitch".to_owned()),
        actions: vec![Action::new(0.0, 50.0), Action::new(4200.0, 0.0)],
        ..Script::default()
      }],
      ..Script::default()
    };
    script.normalize();

    assert_eq!(script.metadata.duration, 5.0);
    assert_eq!(script.channels[0].metadata.duration, 5.0);
  }

  #[test]
  fn duration_views() {
    let mut script = Script {
      actions: vec![Action::new(0.0, 0.0), Action::new(600_000.0, 100.0)],
      ..Script::default()
    };

    assert_eq!(script.actions_duration(), 600.0);
    assert_eq!(script.duration(), 600.0);

    // stored duration wins while plausible
    script.metadata.duration = 650.0;
    assert_eq!(script.duration(), 650.0);
    assert_eq!(script.actual_duration(), 650.0);

    // actions outrunning the stored value win
    script.metadata.duration = 500.0;
    assert_eq!(script.actual_duration(), 600.0);

    // actions stopping far short of the stored value win too
    script.metadata.duration = 2000.0;
    assert_eq!(script.actual_duration(), 600.0);
  }

  #[test]
  fn channel_sorting() {
    let channel = |name: &str| Script {
      channel: Some(name.to_owned()),
      ..Script::default()
    };
    let mut script = Script {
      channels: vec![channel("suck"), channel("custom"), channel("surge")],
      ..Script::default()
    };
    script.sort_channels();

    let names: Vec<&str> = script
      .channels
      .iter()
      .map(|c| c.channel.as_deref().unwrap())
      .collect();
    assert_eq!(names, vec!["surge", "suck", "custom"]);
  }
}
