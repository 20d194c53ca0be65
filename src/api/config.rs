// Copyright (c) 2020-2023, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use thiserror::Error;

use crate::serialize::{Deserialize, Serialize};

/// Number of persisted frame contexts a stream may address.
pub const FRAME_CONTEXTS: usize = 8;

/// Most motion vector contexts a frame context can hold.
pub const NMV_CONTEXTS_MAX: usize = 3;

/// Enumeration of possible invalid configuration errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum InvalidConfig {
  /// The number of frame contexts is invalid.
  #[error("invalid frame context count {0} (expected >= 1, <= 8)")]
  InvalidFrameContexts(usize),
  /// The number of motion vector contexts is invalid.
  #[error("invalid nmv context count {0} (expected >= 1, <= 3)")]
  InvalidNmvContexts(usize),
}

/// Contains the session configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
  /// Number of persisted frame contexts.
  pub frame_contexts: usize,
  /// Number of motion vector contexts inside each frame context.
  pub nmv_contexts: usize,
  /// Derive the cumulative tables when a frame starts instead of on first
  /// use.
  pub multisymbol: bool,
}

impl Default for SessionConfig {
  fn default() -> Self {
    SessionConfig {
      frame_contexts: FRAME_CONTEXTS,
      nmv_contexts: 1,
      multisymbol: true,
    }
  }
}

impl SessionConfig {
  /// Create a default configuration
  ///
  /// same as `Default::default()`
  pub fn new() -> Self {
    SessionConfig::default()
  }

  /// Set the number of persisted frame contexts
  pub const fn with_frame_contexts(mut self, frame_contexts: usize) -> Self {
    self.frame_contexts = frame_contexts;
    self
  }

  /// Set the number of motion vector contexts per frame context
  ///
  /// Coders keeping a separate model per reference category use more than
  /// one.
  pub const fn with_nmv_contexts(mut self, nmv_contexts: usize) -> Self {
    self.nmv_contexts = nmv_contexts;
    self
  }

  /// Select eager or lazy derivation of the cumulative tables
  pub const fn with_multisymbol(mut self, multisymbol: bool) -> Self {
    self.multisymbol = multisymbol;
    self
  }

  /// Validates the configuration.
  ///
  /// # Errors
  ///
  /// - Returns `InvalidConfig` if a count is out of range.
  pub fn validate(&self) -> Result<(), InvalidConfig> {
    use InvalidConfig::*;

    if self.frame_contexts == 0 || self.frame_contexts > FRAME_CONTEXTS {
      return Err(InvalidFrameContexts(self.frame_contexts));
    }
    if self.nmv_contexts == 0 || self.nmv_contexts > NMV_CONTEXTS_MAX {
      return Err(InvalidNmvContexts(self.nmv_contexts));
    }

    Ok(())
  }
}
