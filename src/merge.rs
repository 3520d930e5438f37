//! Merging sibling single-axis scripts into one multi-axis script and
//! splitting a multi-axis script back into standalone v1.0 files.

use serde_json::{Map, Value};

use crate::axis::cmp_channels;
use crate::codec::{parse_value, to_json, ParseOptions, Version};
use crate::error::{Error, Result};
use crate::script::{Script, ScriptFile};

#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
  /// Permit groups with no channel-less primary; the merged script gets an
  /// empty primary actions list.
  pub allow_missing_actions: bool,
  /// Wrap a lone channel-tagged script into a parent of its own instead of
  /// passing it through untouched.
  pub combine_single_secondary_channel: bool,
}

/// Merges single-axis sibling scripts into multi-axis scripts.
///
/// Scripts that already carry channels pass through. The rest group by
/// `(dir, title)`; in each group the channel-less script becomes the
/// primary and every tagged script a secondary. The merged script's `file`
/// records the paths it was built from.
pub fn merge_multi_axis(scripts: Vec<Script>, options: &MergeOptions) -> Result<Vec<Script>> {
  let (multi, single): (Vec<Script>, Vec<Script>) =
    scripts.into_iter().partition(|s| !s.channels.is_empty());

  // group by (dir, title), keeping first-seen order
  let mut groups: Vec<(String, Vec<Script>)> = Vec::new();
  for script in single {
    let key = script
      .file
      .as_ref()
      .map_or_else(|| "[unnamed]".to_owned(), |f| format!("{}{}", f.dir, f.title));
    match groups.iter_mut().find(|(k, _)| *k == key) {
      Some((_, group)) => group.push(script),
      None => groups.push((key, vec![script])),
    }
  }

  let mut merged = multi;
  for (title, mut group) in groups {
    group.sort_by(|a, b| cmp_channels(a.channel.as_deref(), b.channel.as_deref()));

    for (i, script) in group.iter().enumerate() {
      if group[..i].iter().any(|other| other.channel == script.channel) {
        return Err(Error::DuplicateChannel {
          title,
          channel: script.channel.clone().unwrap_or_default(),
        });
      }
    }

    if group.len() == 1 {
      let script = group.pop().expect("group is non-empty");
      if script.channel.is_none() || !options.combine_single_secondary_channel {
        merged.push(script);
        continue;
      }
      let mut parent = Script {
        channel: None,
        actions: Vec::new(),
        metadata: script.metadata.clone(),
        channels: vec![script],
        file: None,
      };
      attach_merged_file(&mut parent);
      merged.push(parent);
      continue;
    }

    let primary_index = group.iter().position(|s| s.channel.is_none());
    let mut parent = match primary_index {
      Some(index) => group.remove(index),
      None if options.allow_missing_actions => Script::default(),
      None => return Err(Error::NoPrimaryScript(title)),
    };
    parent.channels = group;
    attach_merged_file(&mut parent);
    merged.push(parent);
  }

  Ok(merged)
}

/// Rebuilds the merged script's `file` from whichever input carried one,
/// recording every merged path.
fn attach_merged_file(parent: &mut Script) {
  let base = parent
    .file
    .as_ref()
    .or_else(|| parent.channels.iter().find_map(|c| c.file.as_ref()));
  let mut file = match base {
    Some(base) => ScriptFile::new(&base.file_path()),
    None => return,
  };
  file.channel = None;

  file.merged_files = parent
    .file
    .iter()
    .chain(parent.channels.iter().filter_map(|c| c.file.as_ref()))
    .map(ScriptFile::file_path)
    .collect();
  parent.file = Some(file);
}

/// One part of an unmerged script: the v1.0 JSON and the file name it
/// belongs under.
#[derive(Debug, Clone)]
pub struct UnmergedScript {
  pub channel: Option<String>,
  pub file_name: String,
  pub json: Value,
}

/// Splits a multi-axis script into standalone v1.0 parts. Children inherit
/// every parent metadata field they do not override, duration included;
/// the primary keeps its chapters.
pub fn unmerge(script: &Script, base: &str) -> Vec<UnmergedScript> {
  let list = match to_json(script, Some(Version::V10List)) {
    Value::Array(list) => list,
    _ => return Vec::new(),
  };

  let parent_metadata = list
    .first()
    .and_then(|entry| entry.get("metadata"))
    .and_then(Value::as_object)
    .cloned()
    .unwrap_or_default();

  list
    .into_iter()
    .map(|mut entry| {
      let object = entry.as_object_mut().expect("serialized script is an object");
      let channel = object
        .remove("channel")
        .and_then(|v| v.as_str().map(str::to_owned));

      let metadata = object
        .entry("metadata")
        .or_insert_with(|| Value::Object(Map::new()));
      if let Some(metadata) = metadata.as_object_mut() {
        for (key, value) in &parent_metadata {
          if !metadata.contains_key(key) {
            metadata.insert(key.clone(), value.clone());
          }
        }
      }

      let file_name = match &channel {
        Some(channel) => format!("{base}.{channel}.funscript"),
        None => format!("{base}.funscript"),
      };
      UnmergedScript {
        channel,
        file_name,
        json: entry,
      }
    })
    .collect()
}

/// Cross-version conversion: parse, then serialize at `target`.
pub fn convert(json: &Value, target: Version, options: &ParseOptions) -> Result<Value> {
  let script = parse_value(json, options)?;
  Ok(to_json(&script, Some(target)))
}
