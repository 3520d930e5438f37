//! Format-aware processing library for funscript haptic motion scripts.
//!
//! The crate covers the tri-version codec (v1.0 / v1.1 / v2.0 plus the
//! `1.0-list` output form), multi-axis merge and unmerge, the
//! curve-manipulation kernels (peak detection, simplification,
//! speed-limited smoothing), statistical summaries, variant/axis file
//! discovery, and a deterministic SVG heatmap renderer.
//!
//! Everything is a pure, synchronous computation over owned data; the only
//! process-wide state is the speed-to-color memo cache. File I/O belongs to
//! the caller, with [`discovery::scan_dir`] as the one filesystem-facing
//! convenience.

pub mod action;
pub mod axis;
pub mod codec;
pub mod color;
pub mod curve;
pub mod discovery;
pub mod error;
pub mod merge;
pub mod script;
pub mod stats;
pub mod svg;
pub mod time;
pub mod util;

pub use crate::action::Action;
pub use crate::axis::Axis;
pub use crate::codec::{
  detect_version, parse_script, parse_value, to_json, to_json_text, FormatOptions, ParseOptions,
  Version,
};
pub use crate::discovery::{classify_files, scan_dir, ScriptPlan, Variant};
pub use crate::error::{Error, Result};
pub use crate::merge::{convert, merge_multi_axis, unmerge, MergeOptions, UnmergedScript};
pub use crate::script::{Bookmark, Chapter, Metadata, Script, ScriptFile};
pub use crate::svg::{render, render_script, RenderOptions};
