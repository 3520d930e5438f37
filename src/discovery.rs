//! Classifies the funscript files that belong to one video: the default
//! script, its named variants, and per-axis secondary files. Orchestrators
//! feed the resulting plan into merge decisions.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;

use crate::axis::Axis;

/// Sibling directory holding the pre-merge v1.0 originals.
pub const ORIGINALS_DIR: &str = "originalFunscripts";

/// Marker of an intermediate merge product; such files never enumerate as
/// variants.
pub const MAX_SUFFIX: &str = ".max.funscript";

const FUNSCRIPT_EXT: &str = ".funscript";

/// One alternate primary script, keyed by the suffix that distinguishes it
/// from the base name (empty for the default).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
  pub path: PathBuf,
  pub file_name: String,
  pub suffix: String,
}

/// The classification of a directory for one base name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptPlan {
  /// The suffix-less `<base>.funscript`, when present.
  pub default: Option<Variant>,
  /// Suffixed variants, sorted by suffix.
  pub variants: Vec<Variant>,
  /// Secondary axis files, `<base>.<axis>.funscript`.
  pub axes: BTreeMap<Axis, PathBuf>,
}

/// Pure classification over file names; see [`scan_dir`] for the
/// filesystem-facing convenience.
///
/// A file participates when it starts with `base` and ends in
/// `.funscript`. Exact axis suffixes (either spelling) become axis
/// entries; a leading-dot remainder is some other dotted convention and is
/// ignored; anything else keys a variant by its literal suffix.
pub fn classify_files<'a>(
  dir: &Path,
  base: &str,
  file_names: impl IntoIterator<Item = &'a str>,
) -> ScriptPlan {
  let mut plan = ScriptPlan::default();

  for file_name in file_names {
    if !file_name.starts_with(base) || !file_name.ends_with(FUNSCRIPT_EXT) {
      continue;
    }
    if file_name.contains(MAX_SUFFIX) {
      continue;
    }

    let suffix = &file_name[base.len()..file_name.len() - FUNSCRIPT_EXT.len()];

    if let Some(dotted) = suffix.strip_prefix('.') {
      if let Ok(axis) = Axis::from_str(dotted) {
        plan
          .axes
          .entry(axis)
          .or_insert_with(|| dir.join(file_name));
      }
      // other dotted suffixes belong to someone else's convention
      continue;
    }

    let variant = Variant {
      path: dir.join(file_name),
      file_name: file_name.to_owned(),
      suffix: suffix.to_owned(),
    };
    if suffix.is_empty() {
      plan.default = Some(variant);
    } else {
      plan.variants.push(variant);
    }
  }

  plan.variants.sort_by(|a, b| a.suffix.cmp(&b.suffix));
  plan
}

/// Lists `dir` and classifies its contents for `base`. The one
/// filesystem-facing entry point in the crate.
pub fn scan_dir(dir: &Path, base: &str) -> anyhow::Result<ScriptPlan> {
  let mut names: Vec<String> = Vec::new();
  for entry in
    fs::read_dir(dir).with_context(|| format!("failed to list directory {dir:?}"))?
  {
    let entry = entry.with_context(|| format!("failed to read an entry of {dir:?}"))?;
    if let Ok(name) = entry.file_name().into_string() {
      names.push(name);
    }
  }
  names.sort();

  Ok(classify_files(dir, base, names.iter().map(String::as_str)))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn plan(names: &[&str]) -> ScriptPlan {
    classify_files(Path::new("/v"), "Scene", names.iter().copied())
  }

  #[test]
  fn classifies_default_variants_and_axes() {
    let plan = plan(&[
      "Scene.funscript",
      "Scene (Intense).funscript",
      "Scene - Easy.funscript",
      "Scene.surge.funscript",
      "Scene.R2.funscript",
      "Scene.mp4",
      "Other.funscript",
    ]);

    assert_eq!(plan.default.as_ref().unwrap().suffix, "");
    assert_eq!(
      plan.default.as_ref().unwrap().path,
      PathBuf::from("/v/Scene.funscript")
    );

    let suffixes: Vec<&str> = plan.variants.iter().map(|v| v.suffix.as_str()).collect();
    assert_eq!(suffixes, vec![" (Intense)", " - Easy"]);

    assert_eq!(
      plan.axes.get(&Axis::L1),
      Some(&PathBuf::from("/v/Scene.surge.funscript"))
    );
    assert_eq!(
      plan.axes.get(&Axis::R2),
      Some(&PathBuf::from("/v/Scene.R2.funscript"))
    );
    assert_eq!(plan.axes.len(), 2);
  }

  #[test]
  fn ignores_intermediates_and_foreign_dotted_names() {
    let plan = plan(&[
      "Scene.max.funscript",
      "Scene.backup.funscript",
      "Scene.funscript.bak",
    ]);
    assert_eq!(plan, ScriptPlan::default());
  }

  #[test]
  fn unsuffixed_prefix_match_is_a_variant() {
    let plan = plan(&["SceneDirectorsCut.funscript"]);
    assert_eq!(plan.default, None);
    assert_eq!(plan.variants.len(), 1);
    assert_eq!(plan.variants[0].suffix, "DirectorsCut");
  }

  #[test]
  fn axes_come_out_in_canonical_order() {
    let plan = plan(&[
      "Scene.suck.funscript",
      "Scene.pitch.funscript",
      "Scene.stroke.funscript",
    ]);
    let axes: Vec<Axis> = plan.axes.keys().copied().collect();
    assert_eq!(axes, vec![Axis::L0, Axis::R2, Axis::A1]);
  }

  #[test]
  fn empty_directory_gives_empty_plan() {
    let plan = plan(&[]);
    assert!(plan.default.is_none());
    assert!(plan.variants.is_empty());
    assert!(plan.axes.is_empty());
  }
}
