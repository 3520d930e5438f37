//! Conversions between the funscript time representations: integer
//! milliseconds, seconds, and the `"HH:MM:SS.mmm"` time span strings used
//! by chapters, bookmarks and `durationTime`.

use crate::error::{Error, Result};

/// Parses a signed `"HH:MM:SS.mmm"` time span into milliseconds.
///
/// Missing high groups default to zero, so `"12.345"` is 12.345 seconds and
/// `"01:30"` is one minute thirty.
pub fn time_span_to_ms(time_span: &str) -> Result<i64> {
  let (sign, body) = match time_span.strip_prefix('-') {
    Some(rest) => (-1.0, rest),
    None => (1.0, time_span),
  };

  let mut groups = body
    .split(':')
    .map(|s| {
      s.parse::<f64>()
        .map_err(|_| Error::BadTimeSpan(time_span.to_owned()))
    })
    .collect::<Result<Vec<f64>>>()?;
  if groups.is_empty() || groups.len() > 3 {
    return Err(Error::BadTimeSpan(time_span.to_owned()));
  }
  while groups.len() < 3 {
    groups.insert(0, 0.0);
  }

  let (hours, minutes, seconds) = (groups[0], groups[1], groups[2]);
  Ok((sign * (hours * 3600.0 + minutes * 60.0 + seconds) * 1000.0).round() as i64)
}

/// Formats milliseconds as `"HH:MM:SS.mmm"`, with a leading `-` when
/// negative. Hours are not capped at two digits.
pub fn ms_to_time_span(ms: f64) -> String {
  let sign = if ms < 0.0 { "-" } else { "" };
  let ms = ms.abs() as u64;

  let seconds = ms / 1000 % 60;
  let minutes = ms / 1000 / 60 % 60;
  let hours = ms / 1000 / 60 / 60;
  let millis = ms % 1000;

  format!("{sign}{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Short human form used by the renderer stats: `M:SS` under an hour,
/// `H:MM:SS` above.
pub fn seconds_to_duration(seconds: f64) -> String {
  let seconds = seconds.round() as u64;
  if seconds < 3600 {
    format!("{}:{:02}", seconds / 60, seconds % 60)
  } else {
    format!("{}:{:02}:{:02}", seconds / 3600, seconds / 60 % 60, seconds % 60)
  }
}
