// Copyright (c) 2017-2023, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! Motion vector probability models for AV1-style entropy coders.
//!
//! The crate gathers per-frame statistics on coded motion vectors, adapts
//! the 8-bit tree probabilities backward from those statistics, derives
//! the cumulative tables used by multi-symbol coders and keeps the
//! persisted contexts of a coding session.
//!
//! ```
//! use av1_mvprob::mv::MotionVector;
//! use av1_mvprob::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut set = FrameContextSet::new(SessionConfig::new())?;
//! let mut frame = set.begin_frame(FrameParams {
//!   refresh: RefreshMode::Backward,
//!   ..Default::default()
//! })?;
//! frame.count_mv(0, MotionVector::new(3, -9), MotionVector::default());
//! set.finish_frame(frame)?;
//! # Ok(())
//! # }
//! ```

#![deny(bare_trait_objects)]

mod serialize {
  cfg_if::cfg_if! {
    if #[cfg(feature="serialize")] {
      pub use serde::*;
    } else {
      pub use noop_proc_macro::{Deserialize, Serialize};
    }
  }
}

pub mod context;
pub mod mv;

mod api;

pub use crate::api::*;
