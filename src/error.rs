use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("invalid time span {0:?}")]
  BadTimeSpan(String),

  #[error("unknown axis id {0:?}")]
  UnknownAxis(String),

  #[error("duplicate channel {channel:?} while merging {title:?}")]
  DuplicateChannel { title: String, channel: String },

  #[error("channels are defined on both the script and the merge input")]
  ChannelCollision,

  #[error("cannot merge {0:?}: no script without a channel to use as primary")]
  NoPrimaryScript(String),

  #[error("malformed funscript: {0}")]
  Malformed(String),

  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
