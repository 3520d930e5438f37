//! The tri-version funscript codec: version detection, parsing into
//! [`Script`], and serialization back out with the stable trimming and
//! action-packing rules the diff tooling relies on.


use log::{debug, warn};
use serde_json::{json, Map, Value};

use crate::action::Action;
use crate::axis::axis_to_channel_name;
use crate::error::{Error, Result};
use crate::script::{Bookmark, Chapter, Metadata, Script};
use crate::time::{ms_to_time_span, time_span_to_ms};

/// A serialization target. `V10List` exists only as an output form: the
/// primary script followed by one v1.0 script per secondary channel.
#[derive(
  Clone,
  Copy,
  PartialEq,
  Eq,
  Debug,
  strum::EnumString,
  strum::IntoStaticStr,
)]
pub enum Version {
  #[strum(to_string = "1.0")]
  V10,
  #[strum(to_string = "1.0-list")]
  V10List,
  #[strum(to_string = "1.1")]
  V11,
  #[strum(to_string = "2.0")]
  V20,
}

impl std::fmt::Display for Version {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.into())
  }
}

#[derive(Debug, Clone)]
pub struct ParseOptions {
  /// Apply the stored-ms duration fix-up (see [`fix_legacy_duration`]).
  pub fix_ms_duration: bool,
  /// Skip unmappable `axes` entries instead of failing the parse.
  pub allow_missing_actions: bool,
}

impl Default for ParseOptions {
  fn default() -> Self {
    ParseOptions {
      fix_ms_duration: true,
      allow_missing_actions: false,
    }
  }
}

/// Detects the funscript version of a raw JSON object.
///
/// A non-empty `channels` map marks 2.0, a non-empty `axes` array marks
/// 1.1 (as does the legacy form that tucked per-axis actions into
/// `metadata`), anything else reads as 1.0.
pub fn detect_version(json: &Value) -> Version {
  if json
    .get("channels")
    .and_then(Value::as_object)
    .map_or(false, |channels| !channels.is_empty())
  {
    return Version::V20;
  }
  if json
    .get("axes")
    .and_then(Value::as_array)
    .map_or(false, |axes| !axes.is_empty())
  {
    return Version::V11;
  }
  if json.get("metadata").and_then(Value::as_object).map_or(false, |metadata| {
    metadata
      .values()
      .any(|v| v.as_object().map_or(false, |o| o.contains_key("actions")))
  }) {
    return Version::V11;
  }
  Version::V10
}

/// Parses funscript JSON text into a [`Script`].
pub fn parse_script(text: &str, options: &ParseOptions) -> Result<Script> {
  let json: Value = serde_json::from_str(text)?;
  parse_value(&json, options)
}

/// Parses an already-decoded JSON value into a [`Script`].
pub fn parse_value(json: &Value, options: &ParseOptions) -> Result<Script> {
  let object = json
    .as_object()
    .ok_or_else(|| Error::Malformed("root is not an object".into()))?;

  let mut script = parse_body(object, None)?;

  let mut channels: Vec<Script> = Vec::new();
  if let Some(map) = object.get("channels") {
    let map = map
      .as_object()
      .ok_or_else(|| Error::Malformed("channels is not an object".into()))?;
    for (name, body) in map {
      let body = body
        .as_object()
        .ok_or_else(|| Error::Malformed(format!("channel {name:?} is not an object")))?;
      channels.push(parse_body(body, Some(name.clone()))?);
    }
  }

  if let Some(axes) = object.get("axes") {
    if !channels.is_empty() {
      return Err(Error::ChannelCollision);
    }
    let axes = axes
      .as_array()
      .ok_or_else(|| Error::Malformed("axes is not an array".into()))?;
    for entry in axes {
      let body = entry
        .as_object()
        .ok_or_else(|| Error::Malformed("axes entry is not an object".into()))?;
      let name = match axis_entry_channel(body) {
        Ok(name) => name,
        Err(err) if options.allow_missing_actions => {
          warn!("skipping unmappable axis entry: {err}");
          continue;
        },
        Err(err) => return Err(err),
      };
      channels.push(parse_body(body, Some(name))?);
    }
  }

  for (i, channel) in channels.iter().enumerate() {
    if channels[..i].iter().any(|c| c.channel == channel.channel) {
      return Err(Error::DuplicateChannel {
        title: script
          .file
          .as_ref()
          .map_or_else(String::new, |f| f.title.clone()),
        channel: channel.channel.clone().unwrap_or_default(),
      });
    }
  }

  script.channels = channels;
  script.sort_channels();

  if options.fix_ms_duration {
    let extent = script.actions_duration();
    fix_legacy_duration(&mut script.metadata, extent);
    for channel in &mut script.channels {
      let extent = channel.actions_duration();
      fix_legacy_duration(&mut channel.metadata, extent);
    }
  }

  Ok(script)
}

fn axis_entry_channel(body: &Map<String, Value>) -> Result<String> {
  if let Some(channel) = body.get("channel").and_then(Value::as_str) {
    return Ok(channel.to_owned());
  }
  match body.get("id") {
    Some(Value::String(id)) => Ok(axis_to_channel_name(id)?.to_owned()),
    Some(Value::Number(id)) => {
      Ok(axis_to_channel_name(&id.to_string())?.to_owned())
    },
    _ => Err(Error::Malformed("axes entry has no id or channel".into())),
  }
}

fn parse_body(object: &Map<String, Value>, channel: Option<String>) -> Result<Script> {
  if channel.is_some() && (object.contains_key("channels") || object.contains_key("axes")) {
    return Err(Error::Malformed("channels cannot nest".into()));
  }

  let actions: Vec<Action> = match object.get("actions") {
    Some(value) => serde_json::from_value(value.clone())?,
    None => Vec::new(),
  };

  let metadata: Metadata = match object.get("metadata") {
    Some(value) => {
      let metadata: Metadata = serde_json::from_value(value.clone())?;
      validate_metadata(&metadata)?;
      metadata
    },
    None => Metadata::default(),
  };

  let channel = channel.or_else(|| {
    object
      .get("channel")
      .and_then(Value::as_str)
      .map(str::to_owned)
  });

  Ok(Script {
    channel,
    actions,
    metadata,
    ..Script::default()
  })
}

fn validate_metadata(metadata: &Metadata) -> Result<()> {
  if metadata.duration < 0.0 {
    return Err(Error::Malformed("negative duration".into()));
  }
  for chapter in &metadata.chapters {
    time_span_to_ms(&chapter.start_time)?;
    time_span_to_ms(&chapter.end_time)?;
  }
  for bookmark in &metadata.bookmarks {
    time_span_to_ms(&bookmark.time)?;
  }
  Ok(())
}

/// Fixes scripts whose `duration` was stored in ms: anything over an hour
/// whose actions cover less than 1/500th of it is assumed to be ms.
fn fix_legacy_duration(metadata: &mut Metadata, actions_extent_seconds: f64) {
  if metadata.duration > 3600.0
    && actions_extent_seconds != 0.0
    && actions_extent_seconds < 500.0 * metadata.duration
  {
    debug!(
      "treating stored duration {} as milliseconds",
      metadata.duration
    );
    metadata.duration /= 1000.0;
  }
}

/// Serializes a script to its JSON value form. `version` defaults to 2.0
/// for multi-axis scripts and 1.0 otherwise; `V10List` produces an array.
pub fn to_json(script: &Script, version: Option<Version>) -> Value {
  let version = version.unwrap_or(if script.channels.is_empty() {
    Version::V10
  } else {
    Version::V20
  });

  if version == Version::V10List {
    let mut list = vec![script_to_value(script, Version::V10, true, None)];
    for channel in &script.channels {
      list.push(script_to_value(channel, Version::V10, true, None));
    }
    return Value::Array(list);
  }

  script_to_value(script, version, true, None)
}

fn script_to_value(
  script: &Script,
  version: Version,
  root: bool,
  parent: Option<&Script>,
) -> Value {
  let mut out = Map::new();

  if version == Version::V11 && !root {
    if let Some(channel) = script.channel.as_deref() {
      let id = crate::axis::channel_name_to_axis(channel).unwrap_or(channel);
      out.insert("id".into(), json!(id));
    }
  }

  if version == Version::V10 {
    if let Some(channel) = script.channel.as_deref() {
      out.insert("channel".into(), json!(channel));
    }
  }

  let metadata = metadata_to_value(&script.metadata, script.duration());
  let keep_metadata = match parent {
    None => true,
    Some(parent) => {
      let parent_metadata = metadata_to_value(&parent.metadata, parent.duration());
      differs_beyond_duration(&metadata, &parent_metadata)
    },
  };
  if keep_metadata {
    out.insert("metadata".into(), metadata);
  }

  out.insert(
    "actions".into(),
    Value::Array(script.actions.iter().map(action_to_value).collect()),
  );

  if root && version == Version::V11 && !script.channels.is_empty() {
    let axes: Vec<Value> = script
      .channels
      .iter()
      .map(|c| script_to_value(c, Version::V11, false, Some(script)))
      .collect();
    out.insert("axes".into(), Value::Array(axes));
  }

  if root && version == Version::V20 && !script.channels.is_empty() {
    let mut channels = Map::new();
    for c in &script.channels {
      channels.insert(
        c.channel.clone().unwrap_or_default(),
        script_to_value(c, Version::V20, false, Some(script)),
      );
    }
    out.insert("channels".into(), Value::Object(channels));
  }

  if root && version != Version::V10 {
    out.insert("version".into(), json!(version.to_string()));
  }

  Value::Object(out)
}

/// True when `metadata` carries anything the parent's serialized form does
/// not, ignoring the derived duration fields.
fn differs_beyond_duration(metadata: &Value, parent: &Value) -> bool {
  let (metadata, parent) = match (metadata.as_object(), parent.as_object()) {
    (Some(m), Some(p)) => (m, p),
    _ => return metadata != parent,
  };
  metadata.iter().any(|(key, value)| {
    key != "duration" && key != "durationTime" && parent.get(key) != Some(value)
  })
}

fn rounded(value: f64, decimals: u32) -> Value {
  let factor = 10f64.powi(decimals as i32);
  let value = (value * factor).round() / factor;
  if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
    json!(value as i64)
  } else {
    json!(value)
  }
}

fn action_to_value(action: &Action) -> Value {
  let mut out = Map::new();
  out.insert("at".into(), rounded(action.at, 1));
  out.insert("pos".into(), rounded(action.pos, 1));
  Value::Object(out)
}

fn chapter_to_value(chapter: &Chapter) -> Value {
  let mut out = Map::new();
  out.insert("startTime".into(), json!(chapter.start_time));
  out.insert("endTime".into(), json!(chapter.end_time));
  if !chapter.name.is_empty() {
    out.insert("name".into(), json!(chapter.name));
  }
  Value::Object(out)
}

fn bookmark_to_value(bookmark: &Bookmark) -> Value {
  let mut out = Map::new();
  out.insert("time".into(), json!(bookmark.time));
  if !bookmark.name.is_empty() {
    out.insert("name".into(), json!(bookmark.name));
  }
  Value::Object(out)
}

fn metadata_to_value(metadata: &Metadata, duration: f64) -> Value {
  let mut out = Map::new();
  for (key, value) in [
    ("title", &metadata.title),
    ("creator", &metadata.creator),
    ("description", &metadata.description),
  ] {
    if !value.is_empty() {
      out.insert(key.into(), json!(value));
    }
  }
  out.insert("duration".into(), rounded(duration, 3));
  out.insert(
    "durationTime".into(),
    json!(ms_to_time_span(duration * 1000.0)),
  );
  if !metadata.chapters.is_empty() {
    out.insert(
      "chapters".into(),
      Value::Array(metadata.chapters.iter().map(chapter_to_value).collect()),
    );
  }
  if !metadata.bookmarks.is_empty() {
    out.insert(
      "bookmarks".into(),
      Value::Array(metadata.bookmarks.iter().map(bookmark_to_value).collect()),
    );
  }
  if !metadata.license.is_empty() {
    out.insert("license".into(), json!(metadata.license));
  }
  if !metadata.notes.is_empty() {
    out.insert("notes".into(), json!(metadata.notes));
  }
  if !metadata.performers.is_empty() {
    out.insert("performers".into(), json!(metadata.performers));
  }
  if !metadata.topic_url.is_empty() {
    out.insert("topic_url".into(), json!(metadata.topic_url));
  }
  if !metadata.script_url.is_empty() {
    out.insert("script_url".into(), json!(metadata.script_url));
  }
  if !metadata.tags.is_empty() {
    out.insert("tags".into(), json!(metadata.tags));
  }
  if !metadata.kind.is_empty() && metadata.kind != "basic" {
    out.insert("type".into(), json!(metadata.kind));
  }
  if !metadata.video_url.is_empty() {
    out.insert("video_url".into(), json!(metadata.video_url));
  }
  for (key, value) in &metadata.extra {
    if !value.is_null() {
      out.insert(key.clone(), value.clone());
    }
  }

  Value::Object(out)
}

/// Options for the textual rendering of serialized JSON.
#[derive(Debug, Clone)]
pub struct FormatOptions {
  /// Column budget a packed action line should stay within.
  pub line_length: usize,
}

impl Default for FormatOptions {
  fn default() -> Self {
    FormatOptions { line_length: 100 }
  }
}

/// Serializes a script to its on-disk text form: pretty two-space JSON
/// with action arrays packed several-per-line in right-aligned columns.
/// Byte-stable for identical inputs.
pub fn to_json_text(script: &Script, version: Option<Version>, format: &FormatOptions) -> String {
  let json = to_json(script, version);
  let mut out = String::new();
  write_value(&json, 0, format, &mut out);
  out.push('\n');
  out
}

fn write_value(value: &Value, indent: usize, format: &FormatOptions, out: &mut String) {
  match value {
    Value::Object(map) => write_object(map, indent, format, out),
    Value::Array(items) => write_array(items, indent, format, out),
    _ => out.push_str(&value.to_string()),
  }
}

fn write_object(map: &Map<String, Value>, indent: usize, format: &FormatOptions, out: &mut String) {
  if map.is_empty() {
    out.push_str("{}");
    return;
  }
  out.push_str("{\n");
  let inner = indent + 2;
  for (i, (key, value)) in map.iter().enumerate() {
    out.push_str(&" ".repeat(inner));
    out.push_str(&Value::String(key.clone()).to_string());
    out.push_str(": ");
    write_value(value, inner, format, out);
    if i + 1 < map.len() {
      out.push(',');
    }
    out.push('\n');
  }
  out.push_str(&" ".repeat(indent));
  out.push('}');
}

fn write_array(items: &[Value], indent: usize, format: &FormatOptions, out: &mut String) {
  if items.is_empty() {
    out.push_str("[]");
    return;
  }

  if items.iter().all(is_action_object) {
    write_action_array(items, indent, format, out);
    return;
  }

  out.push_str("[\n");
  let inner = indent + 2;
  for (i, item) in items.iter().enumerate() {
    out.push_str(&" ".repeat(inner));
    if is_instant_object(item) {
      out.push_str(&inline_object(item));
    } else {
      write_value(item, inner, format, out);
    }
    if i + 1 < items.len() {
      out.push(',');
    }
    out.push('\n');
  }
  out.push_str(&" ".repeat(indent));
  out.push(']');
}

fn is_action_object(value: &Value) -> bool {
  value
    .as_object()
    .map_or(false, |o| o.contains_key("at") && o.contains_key("pos"))
}

/// Chapters and bookmarks print on one line apiece.
fn is_instant_object(value: &Value) -> bool {
  value
    .as_object()
    .map_or(false, |o| o.contains_key("time") || o.contains_key("startTime"))
}

fn inline_object(value: &Value) -> String {
  let map = match value.as_object() {
    Some(map) => map,
    None => return value.to_string(),
  };
  let fields: Vec<String> = map
    .iter()
    .map(|(k, v)| format!("{}: {}", Value::String(k.clone()), v))
    .collect();
  format!("{{ {} }}", fields.join(", "))
}

/// Packs an actions array several entries per line with the `at` and `pos`
/// columns right-aligned to their widest member, so consecutive renders
/// diff cleanly.
fn write_action_array(items: &[Value], indent: usize, format: &FormatOptions, out: &mut String) {
  let text = |v: &Value| v.to_string();
  let at_width = items
    .iter()
    .filter_map(|i| i.get("at").map(&text))
    .map(|s| s.len())
    .max()
    .unwrap_or(1);
  let pos_width = items
    .iter()
    .filter_map(|i| i.get("pos").map(&text))
    .map(|s| s.len())
    .max()
    .unwrap_or(1);

  let entries: Vec<String> = items
    .iter()
    .map(|item| {
      let at = item.get("at").map(&text).unwrap_or_default();
      let pos = item.get("pos").map(&text).unwrap_or_default();
      format!("{{ \"at\": {at:>at_width$}, \"pos\": {pos:>pos_width$} }}")
    })
    .collect();

  let inner = indent + 2;
  let entry_width = entries[0].len() + 2;
  let per_line = ((format.line_length.saturating_sub(inner)) / entry_width).max(1);

  out.push_str("[\n");
  for (i, chunk) in entries.chunks(per_line).enumerate() {
    out.push_str(&" ".repeat(inner));
    out.push_str(&chunk.join(", "));
    if (i + 1) * per_line < entries.len() {
      out.push(',');
    }
    out.push('\n');
  }
  out.push_str(&" ".repeat(indent));
  out.push(']');
}
