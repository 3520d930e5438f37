//! Deterministic SVG heatmap renderer. A pure function of the script and
//! the options: no clocks, no randomness, no environment lookups, so two
//! renders of the same input are byte-identical.

#[cfg(test)]
mod tests;

use log::warn;

use crate::action::{actions_to_lines, actions_to_zigzag, Action, Line};
use crate::axis::channel_name_to_axis;
use crate::color::speed_to_hex_cached;
use crate::curve::merge_lines_speed;
use crate::script::Script;
use crate::stats::to_stats;
use crate::util::{clamp, lerp};

// vertical gap between one script block and the next
const SPACING_BETWEEN_FUNSCRIPTS: f64 = 4.0;
const SPACING_BETWEEN_AXES: f64 = 0.0;
const SVG_PADDING: f64 = 0.0;

const CHAPTER_PALETTE: [&str; 8] = [
  "#ff6b6b", "#4ecdc4", "#45b7d1", "#ffa07a", "#98d8c8", "#f7dc6f", "#bb8fce", "#85c1e2",
];

/// Renderer options. Every field has the documented default; callers build
/// the struct with `..RenderOptions::default()`.
#[derive(Debug, Clone)]
pub struct RenderOptions {
  /// Stroke width of the motion lines.
  pub line_width: f64,
  /// Title override; the script's file path is used when absent.
  pub title: Option<String>,
  /// Icon override; the channel's axis id is used when absent.
  pub icon: Option<String>,
  pub font: String,
  pub icon_font: String,
  /// White outline pass behind the text for legibility.
  pub halo: bool,
  /// Fill the title band with the average-speed color instead of the
  /// gradient.
  pub solid_title_background: bool,
  pub graph_opacity: f64,
  pub title_opacity: f64,
  /// Passed through to [`merge_lines_speed`]; 0 disables merging.
  pub merge_limit: f64,
  /// Normalize a copy of the script before rendering.
  pub normalize: bool,
  /// Truncate an overlong title with an ellipsis.
  pub title_ellipsis: bool,
  /// Allow an overlong title to wrap onto a row of its own.
  pub title_separate_line: bool,
  pub width: f64,
  pub height: f64,
  /// 0 hides the title band.
  pub title_height: f64,
  pub title_spacing: f64,
  /// 0 hides the axis-label column.
  pub icon_width: f64,
  pub icon_spacing: f64,
  /// Override for the x-axis scale; 0 means the script's own duration.
  pub duration_ms: f64,
  pub show_chapters: bool,
  pub chapter_height: f64,
}

impl Default for RenderOptions {
  fn default() -> Self {
    RenderOptions {
      line_width: 0.5,
      title: None,
      icon: None,
      font: "Arial, sans-serif".to_owned(),
      icon_font: "Consolas, monospace".to_owned(),
      halo: true,
      solid_title_background: false,
      graph_opacity: 0.2,
      title_opacity: 0.7,
      merge_limit: 500.0,
      normalize: true,
      title_ellipsis: true,
      title_separate_line: true,
      width: 690.0,
      height: 52.0,
      title_height: 20.0,
      title_spacing: 0.0,
      icon_width: 46.0,
      icon_spacing: 0.0,
      duration_ms: 0.0,
      show_chapters: false,
      chapter_height: 10.0,
    }
  }
}

/// Rounds to two decimals and prints without trailing zeros.
fn fmt2(value: f64) -> String {
  let value = (value * 100.0).round() / 100.0;
  let mut s = format!("{value:.2}");
  while s.ends_with('0') {
    s.pop();
  }
  if s.ends_with('.') {
    s.pop();
  }
  if s == "-0" {
    s = "0".to_owned();
  }
  s
}

/// Escapes text for embedding in SVG markup.
fn escape_text(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      '/' => out.push_str("&#x2F;"),
      _ => out.push(c),
    }
  }
  out
}

/// Deterministic text-width estimate in px. There is no font machinery to
/// ask, so a flat per-character factor stands in; it only drives the
/// wrap/ellipsis decisions.
fn text_width(text: &str, font_size: f64) -> f64 {
  text.chars().count() as f64 * font_size * 0.6
}

fn truncate_with_ellipsis(text: &str, max_width: f64, font_size: f64) -> String {
  if text_width(text, font_size) <= max_width {
    return text.to_owned();
  }
  let mut text: Vec<char> = text.chars().collect();
  while !text.is_empty() {
    let candidate: String = text.iter().collect::<String>() + "…";
    if text_width(&candidate, font_size) <= max_width {
      break;
    }
    text.pop();
  }
  text.into_iter().collect::<String>() + "…"
}

fn gradient_id(script: &Script) -> String {
  format!(
    "funsvg-grad-{}-{}-{}",
    script.channel.as_deref().unwrap_or(""),
    script.actions.len(),
    script.actions.first().map_or(0.0, |a| a.at)
  )
}

/// Builds the `<linearGradient>` for a script: the macro speed envelope.
///
/// Works on the zigzag, slices runs over 2 s down to roughly 1 s pieces,
/// merges sub-second gaps by time-weighted mean, and pads zero-speed stops
/// 100 ms outside the first and last action when they fall inside the
/// canvas.
fn background_gradient(script: &Script, duration_ms: f64, id: &str) -> String {
  let mut lines: Vec<(Action, Action, f64)> = Vec::new();
  for line in actions_to_lines(&actions_to_zigzag(&script.actions)) {
    let length = line.b.at - line.a.at;
    if length < 2000.0 {
      lines.push((line.a, line.b, line.abs_speed));
      continue;
    }
    let pieces = ((length - 500.0) / 1000.0) as usize;
    for i in 0..pieces {
      let t0 = i as f64 / pieces as f64;
      let t1 = (i + 1) as f64 / pieces as f64;
      lines.push((
        Action::new(lerp(line.a.at, line.b.at, t0), lerp(line.a.pos, line.b.pos, t0)),
        Action::new(lerp(line.a.at, line.b.at, t1), lerp(line.a.pos, line.b.pos, t1)),
        line.abs_speed,
      ));
    }
  }

  // merge neighbors until every piece spans at least a second
  let mut i = 0;
  while i + 1 < lines.len() {
    let (a, b, ab) = lines[i];
    let (c, d, cd) = lines[i + 1];
    if d.at - a.at < 1000.0 {
      let speed = (ab * (b.at - a.at) + cd * (d.at - c.at)) / ((b.at - a.at) + (d.at - c.at));
      lines.splice(i..i + 2, [(a, d, speed)]);
      continue;
    }
    i += 1;
  }

  let kept: Vec<&(Action, Action, f64)> = lines
    .iter()
    .enumerate()
    .filter(|&(i, e)| {
      if i == 0 || i + 1 == lines.len() {
        return true;
      }
      !(lines[i - 1].2 == e.2 && e.2 == lines[i + 1].2)
    })
    .map(|(_, e)| e)
    .collect();

  let mut stops: Vec<(f64, f64)> = kept
    .into_iter()
    .map(|&(a, b, speed)| ((a.at + b.at) / 2.0, speed))
    .collect();

  if let (Some(&(first_a, _, first_speed)), Some(&(_, last_b, last_speed))) =
    (lines.first(), lines.last())
  {
    stops.insert(0, (first_a.at, first_speed));
    if first_a.at > 100.0 {
      stops.insert(0, (first_a.at - 100.0, 0.0));
    }
    stops.push((last_b.at, last_speed));
    if last_b.at < duration_ms - 100.0 {
      stops.push((last_b.at + 100.0, 0.0));
    }
  }

  let stops: Vec<(f64, f64)> = stops
    .iter()
    .enumerate()
    .filter(|&(i, e)| {
      if i == 0 || i + 1 == stops.len() {
        return true;
      }
      !(stops[i - 1].1 == e.1 && e.1 == stops[i + 1].1)
    })
    .map(|(_, e)| *e)
    .collect();

  let mut out = format!("<linearGradient id=\"{id}\">");
  for (at, speed) in stops {
    let offset = fmt2(clamp(at / duration_ms, 0.0, 1.0));
    let opacity = if speed >= 100.0 {
      String::new()
    } else {
      format!(" stop-opacity=\"{}\"", fmt2(speed / 100.0))
    };
    out.push_str(&format!(
      "<stop offset=\"{offset}\" stop-color=\"{}\"{opacity}></stop>",
      speed_to_hex_cached(speed)
    ));
  }
  out.push_str("</linearGradient>");
  out
}

/// A standalone gradient-filled background rect, for overlay consumers
/// that draw their own foreground.
pub fn to_svg_background(script: &Script, options: &RenderOptions) -> String {
  let duration_ms = effective_duration_ms(script, options);
  let id = gradient_id(script);
  format!(
    "<defs>{}</defs>\n<rect width=\"{}\" height=\"{}\" fill=\"url(#{id})\" opacity=\"{}\"></rect>",
    background_gradient(script, duration_ms, &id),
    fmt2(options.width),
    fmt2(options.height),
    fmt2(options.graph_opacity),
  )
}

/// Speed-colored `<path>` elements for every consecutive action pair,
/// slowest first so the hot segments paint on top.
fn speed_lines(
  actions: &[Action],
  options: &RenderOptions,
  duration_ms: f64,
  width: f64,
  height: f64,
) -> Vec<String> {
  let lw = options.line_width;
  let x = |action: &Action| fmt2(action.at / duration_ms * (width - 2.0 * lw) + lw);
  let y = |action: &Action| fmt2((100.0 - action.pos) * (height - 2.0 * lw) / 100.0 + lw);

  let mut lines: Vec<Line> = actions_to_lines(actions);
  merge_lines_speed(&mut lines, options.merge_limit);
  lines.sort_by(|a, b| {
    a.abs_speed
      .partial_cmp(&b.abs_speed)
      .unwrap_or(std::cmp::Ordering::Equal)
  });

  lines
    .iter()
    .map(|line| {
      format!(
        "<path d=\"M {} {} L {} {}\" stroke=\"{}\"></path>",
        x(&line.a),
        y(&line.a),
        x(&line.b),
        y(&line.b),
        speed_to_hex_cached(line.abs_speed)
      )
    })
    .collect()
}

fn effective_duration_ms(script: &Script, options: &RenderOptions) -> f64 {
  let duration = if options.duration_ms != 0.0 {
    options.duration_ms
  } else {
    script.actual_duration() * 1000.0
  };
  duration.max(1.0)
}

struct GroupContext<'a> {
  transform: String,
  title: Option<&'a str>,
  is_secondary_axis: bool,
}

struct RenderedGroup {
  svg: String,
  extra_height: f64,
}

/// Renders the full SVG document for one script (its channels rendered as
/// blocks beneath it).
pub fn render_script(script: &Script, options: &RenderOptions) -> String {
  render(std::slice::from_ref(script), options)
}

/// Renders the full SVG document for several scripts stacked vertically.
pub fn render(scripts: &[Script], options: &RenderOptions) -> String {
  let normalized: Vec<Script> = scripts
    .iter()
    .map(|script| {
      if options.normalize {
        let mut copy = script.clone();
        copy.normalize();
        copy
      } else {
        script.clone()
      }
    })
    .collect();

  let width = options.width - SVG_PADDING * 2.0;
  let first = match normalized.first() {
    Some(first) => first,
    None => return String::new(),
  };
  let duration_ms = effective_duration_ms(first, options);

  let has_chapters = options.show_chapters && !first.metadata.chapters.is_empty();
  let chapter_offset = if has_chapters { options.chapter_height } else { 0.0 };
  // full heatmaps carry the bar on top, bare overlays underneath
  let chapters_at_top = options.title_height > 0.0;

  let mut pieces: Vec<String> = Vec::new();
  let mut y = SVG_PADDING + if chapters_at_top { chapter_offset } else { 0.0 };

  for script in &normalized {
    let group = render_group(
      script,
      options,
      duration_ms,
      width,
      &GroupContext {
        transform: format!("translate({}, {})", fmt2(SVG_PADDING), fmt2(y)),
        title: options.title.as_deref(),
        is_secondary_axis: false,
      },
    );
    y += options.height + group.extra_height + SPACING_BETWEEN_AXES;
    pieces.push(group.svg);

    if options.title_height > 0.0 {
      for channel in &script.channels {
        let group = render_group(
          channel,
          options,
          duration_ms,
          width,
          &GroupContext {
            transform: format!("translate({}, {})", fmt2(SVG_PADDING), fmt2(y)),
            // axis rows never repeat the title
            title: Some(options.title.as_deref().unwrap_or("")),
            is_secondary_axis: true,
          },
        );
        y += options.height + group.extra_height + SPACING_BETWEEN_AXES;
        pieces.push(group.svg);
      }
    }
    y += SPACING_BETWEEN_FUNSCRIPTS - SPACING_BETWEEN_AXES;
  }
  y -= SPACING_BETWEEN_FUNSCRIPTS;
  y += SVG_PADDING;

  let chapter_svg = if has_chapters {
    let chapter_y = if chapters_at_top { SVG_PADDING } else { y };
    if !chapters_at_top {
      y += chapter_offset;
    }
    chapter_bar(first, options, duration_ms, chapter_y)
  } else {
    String::new()
  };

  format!(
    "<svg class=\"funsvg\" width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\"\n    font-size=\"{}px\" font-family=\"{}\"\n>\n{}{}\n</svg>\n",
    fmt2(width),
    fmt2(y),
    fmt2(options.title_height * 0.8),
    options.font,
    chapter_svg,
    pieces.join("\n"),
  )
}

/// The chapter bar: one rounded rect per chapter, palette color by index,
/// labels only where they fit, halo pass behind them.
fn chapter_bar(script: &Script, options: &RenderOptions, duration_ms: f64, bar_y: f64) -> String {
  let icon_spacing = if options.icon_width > 0.0 { options.icon_spacing } else { 0.0 };
  let graph_width = options.width - options.icon_width - icon_spacing;
  let x_offset = SVG_PADDING + options.icon_width + icon_spacing;

  let mut rects: Vec<String> = Vec::new();
  let mut halos: Vec<String> = Vec::new();
  let mut labels: Vec<String> = Vec::new();

  for (index, chapter) in script.metadata.chapters.iter().enumerate() {
    let start_x = chapter.start_at() / duration_ms * graph_width + x_offset;
    let end_x = chapter.end_at() / duration_ms * graph_width + x_offset;
    let chapter_width = (end_x - start_x).max(0.0);
    let color = CHAPTER_PALETTE[index % CHAPTER_PALETTE.len()];

    rects.push(format!(
      "    <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{color}\" opacity=\"0.8\" rx=\"2\" ry=\"2\"/>",
      fmt2(start_x),
      fmt2(bar_y),
      fmt2(chapter_width),
      fmt2(options.chapter_height),
    ));

    if chapter_width > 30.0 {
      let text_x = fmt2(start_x + chapter_width / 2.0);
      let text_y = fmt2(bar_y + options.chapter_height / 2.0 + 3.0);
      let font_size = fmt2(options.chapter_height * 0.7);
      let label = format!(
        "<text x=\"{text_x}\" y=\"{text_y}\" font-size=\"{font_size}px\" font-family=\"{}\" text-anchor=\"middle\" font-weight=\"bold\">{}</text>",
        options.font,
        escape_text(&chapter.name),
      );
      halos.push(format!("      {label}"));
      labels.push(format!("    {label}"));
    }
  }

  let halo_group = if halos.is_empty() {
    String::new()
  } else {
    format!(
      "    <g stroke=\"white\" opacity=\"0.5\" paint-order=\"stroke fill markers\" stroke-width=\"3\" stroke-dasharray=\"none\" stroke-linejoin=\"round\" fill=\"transparent\">\n{}\n    </g>\n",
      halos.join("\n"),
    )
  };

  format!(
    "  <g id=\"chapters\">\n{}\n{}{}\n  </g>\n",
    rects.join("\n"),
    halo_group,
    labels.join("\n"),
  )
}

fn render_group(
  script: &Script,
  options: &RenderOptions,
  duration_ms: f64,
  width: f64,
  ctx: &GroupContext<'_>,
) -> RenderedGroup {
  let title_height = options.title_height;
  let icon_spacing = if options.icon_width == 0.0 { 0.0 } else { options.icon_spacing };

  let mut title_text = match ctx.title {
    Some(title) => title.to_owned(),
    None => script
      .file
      .as_ref()
      .map_or_else(String::new, |f| f.file_path()),
  };

  let mut icon_text = match (&options.icon, script.channel.as_deref()) {
    (Some(icon), _) => icon.clone(),
    (None, Some(channel)) => channel_name_to_axis(channel).unwrap_or(channel).to_owned(),
    (None, None) => "L0".to_owned(),
  };

  // non-finite positions render flagged instead of aborting
  let mut actions = script.actions.clone();
  let mut bad = false;
  for action in &mut actions {
    if !action.pos.is_finite() {
      action.pos = 120.0;
      bad = true;
    }
  }
  if bad {
    warn!("render: non-finite positions in {:?}", title_text);
    title_text.push_str("::bad");
    icon_text = "!!!".to_owned();
  }

  let stat_block = to_stats(&actions, duration_ms / 1000.0);
  let avg_speed = stat_block.avg_speed;
  let mut stats: Vec<(&str, String)> = vec![
    ("Duration", stat_block.duration),
    ("Actions", stat_block.actions.to_string()),
    ("MaxSpeed", fmt2(stat_block.max_speed)),
    ("AvgSpeed", fmt2(stat_block.avg_speed)),
  ];
  if ctx.is_secondary_axis {
    stats.retain(|(name, _)| *name != "Duration");
  }

  let proportional_font_size = title_height * 0.8;
  let stat_label_font_size = title_height * 0.4;
  let stat_value_font_size = title_height * 0.72;

  // x geometry
  let icon_end = options.icon_width;
  let title_start = options.icon_width + icon_spacing;
  let graph_width = width - options.icon_width - icon_spacing;
  let stat_text_x = |i: usize| width - (7.0 + i as f64 * 46.0) * (title_height / 20.0);
  let icon_text_x = icon_end / 2.0;
  let title_text_x = title_start + title_height * 0.2;

  let mut use_separate_line = false;
  let budget = stat_text_x(stats.len()) - title_text_x;
  if !title_text.is_empty()
    && options.title_separate_line
    && text_width(&title_text, proportional_font_size) > budget
  {
    use_separate_line = true;
  }
  let budget = stat_text_x(if use_separate_line { 0 } else { stats.len() }) - title_text_x;
  if !title_text.is_empty()
    && options.title_ellipsis
    && text_width(&title_text, proportional_font_size) > budget
  {
    title_text = truncate_with_ellipsis(&title_text, budget, proportional_font_size);
  }

  // y geometry
  let title_extra = if use_separate_line { title_height } else { 0.0 };
  let title_bottom = title_height + title_extra;
  let graph_top = title_bottom + options.title_spacing;
  let graph_height = options.height - title_height - options.title_spacing;
  let svg_bottom = options.height + title_extra;
  let icon_text_y = svg_bottom / 2.0 + 4.0 + title_extra / 2.0;
  let title_text_y = title_height * 0.75;
  let stat_label_y = title_height * 0.35 + title_extra;
  let stat_value_y = title_height * 0.92 + title_extra;

  let graph_script = Script {
    actions: actions.clone(),
    ..script.clone()
  };
  let grad_id = gradient_id(&graph_script);
  let icon_color = speed_to_hex_cached(avg_speed);
  let icon_opacity = options.title_opacity * clamp(avg_speed / 100.0, 0.5, 1.0);

  let mut out: Vec<String> = vec![
    format!("<g transform=\"{}\">", ctx.transform),
    "  <g class=\"funsvg-bgs\">".to_owned(),
    format!(
      "    <defs>{}</defs>",
      background_gradient(&graph_script, duration_ms, &grad_id)
    ),
  ];

  if options.icon_width > 0.0 {
    out.push(format!(
      "    <rect class=\"funsvg-bg-axis-drop\" x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#ccc\" opacity=\"{}\"></rect>",
      fmt2(icon_end),
      fmt2(svg_bottom),
      fmt2(options.graph_opacity * 1.5),
    ));
  }
  out.push(format!(
    "    <rect class=\"funsvg-bg-title-drop\" x=\"{}\" width=\"{}\" height=\"{}\" fill=\"#ccc\" opacity=\"{}\"></rect>",
    fmt2(title_start),
    fmt2(graph_width),
    fmt2(title_bottom),
    fmt2(options.graph_opacity * 1.5),
  ));
  if options.icon_width > 0.0 {
    out.push(format!(
      "    <rect class=\"funsvg-bg-axis\" x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{icon_color}\" opacity=\"{}\"></rect>",
      fmt2(icon_end),
      fmt2(svg_bottom),
      fmt2(icon_opacity),
    ));
  }

  let (title_fill, title_fill_opacity) = if options.solid_title_background {
    (icon_color.clone(), icon_opacity)
  } else {
    (format!("url(#{grad_id})"), options.title_opacity)
  };
  out.push(format!(
    "    <rect class=\"funsvg-bg-title\" x=\"{}\" width=\"{}\" height=\"{}\" fill=\"{title_fill}\" opacity=\"{}\"></rect>",
    fmt2(title_start),
    fmt2(graph_width),
    fmt2(title_bottom),
    fmt2(title_fill_opacity),
  ));
  out.push(format!(
    "    <rect class=\"funsvg-bg-graph\" x=\"{}\" width=\"{}\" y=\"{}\" height=\"{}\" fill=\"url(#{grad_id})\" opacity=\"{}\"></rect>",
    fmt2(title_start),
    fmt2(graph_width),
    fmt2(graph_top),
    fmt2(graph_height),
    fmt2(options.graph_opacity),
  ));
  out.push("  </g>".to_owned());
  out.push(String::new());

  out.push(format!(
    "  <g class=\"funsvg-lines\" transform=\"translate({}, {})\" stroke-width=\"{}\" fill=\"none\" stroke-linecap=\"round\">",
    fmt2(title_start),
    fmt2(graph_top),
    fmt2(options.line_width),
  ));
  for line in speed_lines(&actions, options, duration_ms, graph_width, graph_height) {
    out.push(format!("    {line}"));
  }
  out.push("  </g>".to_owned());
  out.push(String::new());
  out.push("  <g class=\"funsvg-titles\">".to_owned());

  let title_element = |class: &str| {
    format!(
      "<text class=\"{class}\" x=\"{}\" y=\"{}\"> {} </text>",
      fmt2(title_text_x),
      fmt2(title_text_y),
      escape_text(&title_text),
    )
  };
  let stat_elements = |suffix: &str| -> Vec<String> {
    stats
      .iter()
      .rev()
      .enumerate()
      .flat_map(|(i, (name, value))| {
        [
          format!(
            "<text class=\"funsvg-stat-label{suffix}\" x=\"{}\" y=\"{}\" font-weight=\"bold\" font-size=\"{}px\" text-anchor=\"end\"> {name} </text>",
            fmt2(stat_text_x(i)),
            fmt2(stat_label_y),
            fmt2(stat_label_font_size),
          ),
          format!(
            "<text class=\"funsvg-stat-value{suffix}\" x=\"{}\" y=\"{}\" font-weight=\"bold\" font-size=\"{}px\" text-anchor=\"end\"> {value} </text>",
            fmt2(stat_text_x(i)),
            fmt2(stat_value_y),
            fmt2(stat_value_font_size),
          ),
        ]
      })
      .collect()
  };

  if options.halo {
    out.push(
      "    <g class=\"funsvg-titles-halo\" stroke=\"white\" opacity=\"0.5\" paint-order=\"stroke fill markers\" stroke-width=\"3\" stroke-dasharray=\"none\" stroke-linejoin=\"round\" fill=\"transparent\">"
        .to_owned(),
    );
    out.push(format!("      {}", title_element("funsvg-title-halo")));
    for element in stat_elements("-halo") {
      out.push(format!("      {element}"));
    }
    out.push("    </g>".to_owned());
  }

  if options.icon_width > 0.0 {
    out.push(format!(
      "    <text class=\"funsvg-axis\" x=\"{}\" y=\"{}\" font-size=\"{}px\" font-family=\"{}\" text-anchor=\"middle\" dominant-baseline=\"middle\"> {} </text>",
      fmt2(icon_text_x),
      fmt2(icon_text_y),
      fmt2((options.icon_width * 0.75).max(12.0)),
      options.icon_font,
      escape_text(&icon_text),
    ));
  }
  out.push(format!("    {}", title_element("funsvg-title")));
  for element in stat_elements("") {
    out.push(format!("    {element}"));
  }

  out.push("  </g>".to_owned());
  out.push("</g>".to_owned());

  RenderedGroup {
    svg: out.join("\n"),
    extra_height: title_extra,
  }
}
