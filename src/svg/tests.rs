use super::*;
use crate::script::{Chapter, Metadata, ScriptFile};

fn acts(pairs: &[(f64, f64)]) -> Vec<Action> {
  pairs.iter().map(|&(at, pos)| Action::new(at, pos)).collect()
}

fn demo_script() -> Script {
  Script {
    actions: acts(&[
      (0.0, 0.0),
      (500.0, 100.0),
      (1000.0, 0.0),
      (1500.0, 100.0),
      (2000.0, 0.0),
    ]),
    file: Some(ScriptFile::new("demo.funscript")),
    ..Script::default()
  }
}

#[test]
fn rendering_is_deterministic() {
  let script = demo_script();
  let options = RenderOptions::default();
  let first = render_script(&script, &options);
  let second = render_script(&script, &options);
  assert_eq!(first, second);
  assert!(!first.contains('\r'));
}

#[test]
fn renders_a_complete_document() {
  let svg = render_script(&demo_script(), &RenderOptions::default());

  assert!(svg.starts_with("<svg class=\"funsvg\""));
  assert!(svg.ends_with("</svg>\n"));
  assert!(svg.contains("xmlns=\"http://www.w3.org/2000/svg\""));
  assert!(svg.contains("<path d=\"M "));
  assert!(svg.contains("funsvg-bg-graph"));
  assert!(svg.contains("Duration"));
  assert!(svg.contains("MaxSpeed"));
  assert!(svg.contains("demo.funscript"));
}

#[test]
fn gradient_id_derives_from_the_script() {
  let svg = render_script(&demo_script(), &RenderOptions::default());
  assert!(svg.contains("id=\"funsvg-grad--5-0\""));
  assert!(svg.contains("url(#funsvg-grad--5-0)"));
}

#[test]
fn empty_script_renders_background_only() {
  let script = Script::default();
  let svg = render_script(&script, &RenderOptions::default());

  assert!(svg.starts_with("<svg"));
  assert!(!svg.contains("<path"));
  assert!(svg.contains("> Actions </text>"));
  assert!(svg.contains("> 0 </text>"));
}

#[test]
fn single_action_renders_without_lines() {
  let script = Script {
    actions: acts(&[(100.0, 50.0)]),
    ..Script::default()
  };
  let svg = render_script(&script, &RenderOptions::default());
  assert!(!svg.contains("<path"));
  assert!(svg.contains("MaxSpeed"));
}

#[test]
fn hot_lines_paint_last() {
  // slow rise then a fast stroke: the fast color must be the last path
  let script = Script {
    actions: acts(&[(0.0, 0.0), (2000.0, 50.0), (2100.0, 100.0)]),
    ..Script::default()
  };
  let options = RenderOptions {
    merge_limit: 0.0,
    ..RenderOptions::default()
  };
  let svg = render_script(&script, &options);

  let fast = crate::color::speed_to_hex_cached(500.0);
  let slow = crate::color::speed_to_hex_cached(25.0);
  let fast_index = svg.find(&format!("stroke=\"{fast}\"")).unwrap();
  let slow_index = svg.find(&format!("stroke=\"{slow}\"")).unwrap();
  assert!(slow_index < fast_index);
}

#[test]
fn secondary_channels_render_beneath_without_duration() {
  let script = Script {
    actions: acts(&[(0.0, 0.0), (500.0, 100.0)]),
    channels: vec![Script {
      channel: Some("pitch".to_owned()),
      actions: acts(&[(0.0, 50.0), (500.0, 0.0)]),
      ..Script::default()
    }],
    ..Script::default()
  };
  let svg = render_script(&script, &RenderOptions::default());

  assert_eq!(svg.matches("class=\"funsvg-lines\"").count(), 2);
  // the axis block shows the channel id
  assert!(svg.contains("> R2 </text>"));
  // Duration appears only on the primary (halo doubles every text)
  assert_eq!(svg.matches("> Duration </text>").count(), 2);
  assert!(svg.matches("> AvgSpeed </text>").count() >= 4);
}

#[test]
fn non_finite_positions_are_flagged_not_fatal() {
  let script = Script {
    actions: vec![
      Action::new(0.0, 0.0),
      Action::new(500.0, f64::NAN),
      Action::new(1000.0, 100.0),
    ],
    ..Script::default()
  };
  let options = RenderOptions {
    normalize: false,
    ..RenderOptions::default()
  };
  let svg = render_script(&script, &options);

  assert!(svg.contains("::bad"));
  assert!(svg.contains("> !!! </text>"));
  assert!(!svg.contains("NaN"));
}

#[test]
fn chapter_bar_rects_labels_and_palette() {
  let mut script = demo_script();
  script.metadata = Metadata {
    chapters: vec![
      Chapter {
        name: "intro".to_owned(),
        start_time: "00:00:00.000".to_owned(),
        end_time: "00:00:01.500".to_owned(),
      },
      Chapter {
        name: "backwards".to_owned(),
        start_time: "00:00:01.900".to_owned(),
        end_time: "00:00:01.800".to_owned(),
      },
    ],
    ..Metadata::default()
  };
  let options = RenderOptions {
    show_chapters: true,
    ..RenderOptions::default()
  };
  let svg = render_script(&script, &options);

  assert!(svg.contains("<g id=\"chapters\">"));
  assert!(svg.contains("fill=\"#ff6b6b\""));
  assert!(svg.contains("fill=\"#4ecdc4\""));
  // the wide chapter gets a label, the inverted one collapses unlabeled
  assert!(svg.contains(">intro</text>"));
  assert!(svg.contains("width=\"0\""));
  assert!(!svg.contains(">backwards</text>"));
}

#[test]
fn chapters_disabled_by_default() {
  let mut script = demo_script();
  script.metadata.chapters.push(Chapter::default());
  let svg = render_script(&script, &RenderOptions::default());
  assert!(!svg.contains("id=\"chapters\""));
}

#[test]
fn title_override_and_ellipsis() {
  let options = RenderOptions {
    title: Some("short".to_owned()),
    ..RenderOptions::default()
  };
  let svg = render_script(&demo_script(), &options);
  assert!(svg.contains("> short </text>"));

  let options = RenderOptions {
    title: Some("an extremely long title that cannot possibly fit in the band".repeat(3)),
    title_separate_line: false,
    ..RenderOptions::default()
  };
  let svg = render_script(&demo_script(), &options);
  assert!(svg.contains('…'));
}

#[test]
fn long_title_can_take_its_own_row() {
  let narrow = RenderOptions {
    title: Some("a title wider than the whole canvas allows".to_owned()),
    width: 400.0,
    ..RenderOptions::default()
  };
  let tall = render_script(&demo_script(), &narrow);

  let short = RenderOptions {
    title: Some("t".to_owned()),
    width: 400.0,
    ..RenderOptions::default()
  };
  let flat = render_script(&demo_script(), &short);

  let height = |svg: &str| -> f64 {
    let start = svg.find("height=\"").unwrap() + 8;
    let end = svg[start..].find('"').unwrap() + start;
    svg[start..end].parse().unwrap()
  };
  assert_eq!(height(&tall), height(&flat) + 20.0);
}

#[test]
fn icon_column_can_be_hidden() {
  let options = RenderOptions {
    icon_width: 0.0,
    ..RenderOptions::default()
  };
  let svg = render_script(&demo_script(), &options);
  assert!(!svg.contains("funsvg-axis"));
  assert!(!svg.contains("funsvg-bg-axis-drop"));
}

#[test]
fn halo_can_be_disabled() {
  let options = RenderOptions {
    halo: false,
    ..RenderOptions::default()
  };
  let svg = render_script(&demo_script(), &options);
  assert!(!svg.contains("funsvg-titles-halo"));
}

#[test]
fn escapes_markup_in_titles() {
  let options = RenderOptions {
    title: Some("a & b <c>".to_owned()),
    ..RenderOptions::default()
  };
  let svg = render_script(&demo_script(), &options);
  assert!(svg.contains("a &amp; b &lt;c&gt;"));
}

#[test]
fn standalone_background_is_deterministic() {
  let script = demo_script();
  let options = RenderOptions::default();
  let first = to_svg_background(&script, &options);
  assert_eq!(first, to_svg_background(&script, &options));
  assert!(first.contains("url(#funsvg-grad--5-0)"));
  assert!(first.contains("<linearGradient"));
}

#[test]
fn gradient_pads_zero_speed_stops() {
  // actions start 500ms in and end well before the canvas does
  let script = Script {
    actions: acts(&[(500.0, 0.0), (1000.0, 100.0)]),
    ..Script::default()
  };
  let options = RenderOptions {
    duration_ms: 10_000.0,
    ..RenderOptions::default()
  };
  let svg = render_script(&script, &options);

  // 400ms/10s and 1.1s/10s pad stops at zero speed
  assert!(svg.contains("offset=\"0.04\""));
  assert!(svg.contains("offset=\"0.11\""));
}
