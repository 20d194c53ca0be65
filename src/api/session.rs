// Copyright (c) 2018-2023, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use std::sync::Arc;

use thiserror::Error;

use super::config::*;
use crate::context::*;
use crate::mv::{use_mv_hp, MotionVector};

/// Which persisted contexts go back to the defaults when a frame starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResetScope {
  /// Keep every slot.
  #[default]
  None,
  /// Reset the slot selected by the frame.
  Current,
  /// Reset every slot.
  All,
}

/// How the selected slot is updated once a frame is done.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RefreshMode {
  /// Leave the slot as it is.
  #[default]
  Off,
  /// Code the frame with the given context and store it in the slot.
  Forward(FrameContext),
  /// Store the slot adapted to the statistics gathered over the frame.
  Backward,
}

/// Per-frame parameters read from the frame header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameParams {
  /// Slot the frame reads its probabilities from and refreshes.
  pub context_idx: usize,
  /// Update applied to the slot at the end of the frame.
  pub refresh: RefreshMode,
  /// Whether 1/8 pel vectors may be coded in this frame.
  pub allow_high_precision_mv: bool,
  /// Slots reset before the frame selects its context.
  pub reset: ResetScope,
}

/// Enumeration of errors raised while selecting or refreshing a slot.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum FrameContextError {
  /// The slot index is out of range.
  #[error("invalid frame context index {actual} (expected <= {max})")]
  InvalidContextIndex {
    /// The actual value.
    actual: usize,
    /// The maximal supported value.
    max: usize,
  },
  /// A forward context holds the wrong number of motion vector contexts.
  #[error("invalid forward context with {actual} nmv contexts (expected {expected})")]
  InvalidForwardContext {
    /// The actual value.
    actual: usize,
    /// The configured value.
    expected: usize,
  },
  /// A forward context holds a zero probability.
  #[error("forward context holds a zero probability")]
  InvalidProbability,
  /// The slot was refreshed or reset after the frame selected it.
  #[error("frame context {slot} changed while the frame was in flight")]
  StaleSlot {
    /// The slot index.
    slot: usize,
  },
}

enum Refresh {
  Off,
  Forward(Arc<FrameContext>),
  Backward,
}

/// The persisted frame contexts of a coding session.
///
/// Every frame selects one slot with [`begin_frame`], codes against it
/// through the returned [`FrameCoder`] and hands that back to
/// [`finish_frame`], which applies the requested refresh.
///
/// Frames may be in flight concurrently, each holding a shared snapshot of
/// its slot, but refreshes are serialised through `&mut self`. A refresh is
/// refused when its slot changed after the frame selected it.
///
/// [`begin_frame`]: FrameContextSet::begin_frame
/// [`finish_frame`]: FrameContextSet::finish_frame
pub struct FrameContextSet {
  config: SessionConfig,
  default_fc: Arc<FrameContext>,
  slots: Box<[Arc<FrameContext>]>,
  generations: Box<[u64]>,
}

impl FrameContextSet {
  /// Creates a session with every slot holding the default context.
  ///
  /// # Errors
  ///
  /// - Returns `InvalidConfig` if the configuration is invalid.
  pub fn new(config: SessionConfig) -> Result<Self, InvalidConfig> {
    config.validate()?;

    let default_fc = Arc::new(FrameContext::new(config.nmv_contexts));
    let slots =
      (0..config.frame_contexts).map(|_| Arc::clone(&default_fc)).collect();
    let generations = vec![0; config.frame_contexts].into_boxed_slice();

    Ok(FrameContextSet { config, default_fc, slots, generations })
  }

  /// The configuration the session was created with.
  pub const fn config(&self) -> &SessionConfig {
    &self.config
  }

  /// The context persisted in slot `idx`.
  pub fn slot(&self, idx: usize) -> Option<&FrameContext> {
    self.slots.get(idx).map(|fc| &**fc)
  }

  fn check_index(&self, idx: usize) -> Result<(), FrameContextError> {
    if idx >= self.slots.len() {
      return Err(FrameContextError::InvalidContextIndex {
        actual: idx,
        max: self.slots.len() - 1,
      });
    }
    Ok(())
  }

  fn reset_slot(&mut self, idx: usize) {
    self.slots[idx] = Arc::clone(&self.default_fc);
    self.generations[idx] += 1;
  }

  /// Puts the slots covered by `scope` back to the default context.
  ///
  /// # Errors
  ///
  /// - Returns `InvalidContextIndex` if `scope` is `Current` and
  ///   `context_idx` is out of range.
  pub fn reset(
    &mut self, scope: ResetScope, context_idx: usize,
  ) -> Result<(), FrameContextError> {
    match scope {
      ResetScope::None => {}
      ResetScope::Current => {
        self.check_index(context_idx)?;
        log::debug!("resetting frame context {}", context_idx);
        self.reset_slot(context_idx);
      }
      ResetScope::All => {
        log::debug!("resetting all {} frame contexts", self.slots.len());
        for idx in 0..self.slots.len() {
          self.reset_slot(idx);
        }
      }
    }
    Ok(())
  }

  /// Applies the frame's reset and selects its context.
  ///
  /// # Errors
  ///
  /// - Returns `InvalidContextIndex` if `context_idx` is out of range.
  /// - Returns `InvalidForwardContext` or `InvalidProbability` if a forward
  ///   context does not fit the session.
  pub fn begin_frame(
    &mut self, params: FrameParams,
  ) -> Result<FrameCoder, FrameContextError> {
    let FrameParams { context_idx, refresh, allow_high_precision_mv, reset } =
      params;

    self.check_index(context_idx)?;

    let refresh = match refresh {
      RefreshMode::Off => Refresh::Off,
      RefreshMode::Backward => Refresh::Backward,
      RefreshMode::Forward(fc) => {
        if fc.nmv_contexts() != self.config.nmv_contexts {
          return Err(FrameContextError::InvalidForwardContext {
            actual: fc.nmv_contexts(),
            expected: self.config.nmv_contexts,
          });
        }
        if !fc.is_valid() {
          return Err(FrameContextError::InvalidProbability);
        }
        Refresh::Forward(Arc::new(fc))
      }
    };

    self.reset(reset, context_idx)?;

    let reference = Arc::clone(&self.slots[context_idx]);
    let coder = FrameCoder {
      context_idx,
      generation: self.generations[context_idx],
      allow_high_precision_mv,
      reference,
      refresh,
      counts: vec![NMVContextCounts::new(); self.config.nmv_contexts]
        .into_boxed_slice(),
    };

    if self.config.multisymbol {
      coder.active().derive_cdfs();
    }

    Ok(coder)
  }

  /// Applies the refresh requested by the frame behind `coder`.
  ///
  /// The statistics gathered by `coder` are consumed here, whatever the
  /// refresh mode.
  ///
  /// # Errors
  ///
  /// - Returns `StaleSlot` if the slot changed after the frame selected it.
  ///   The slot is left untouched.
  pub fn finish_frame(
    &mut self, coder: FrameCoder,
  ) -> Result<(), FrameContextError> {
    let idx = coder.context_idx;
    self.check_index(idx)?;

    if matches!(coder.refresh, Refresh::Off) {
      log::debug!("frame context {} kept", idx);
      return Ok(());
    }

    if self.generations[idx] != coder.generation {
      log::warn!(
        "dropping refresh of frame context {}: generation {} is gone (now {})",
        idx,
        coder.generation,
        self.generations[idx]
      );
      return Err(FrameContextError::StaleSlot { slot: idx });
    }

    let fc = match coder.refresh {
      Refresh::Forward(fc) => {
        log::debug!("frame context {} refreshed forward", idx);
        fc
      }
      Refresh::Off | Refresh::Backward => {
        log::debug!(
          "frame context {} adapted from {} vectors",
          idx,
          coder
            .counts
            .iter()
            .fold(0u64, |acc, c| acc + u64::from(c.total()))
        );
        Arc::new(
          coder.reference.adapt(&coder.counts, coder.allow_high_precision_mv),
        )
      }
    };

    self.slots[idx] = fc;
    self.generations[idx] += 1;
    Ok(())
  }
}

/// Coding state of one frame: the context it reads from and the statistics
/// it gathers.
pub struct FrameCoder {
  context_idx: usize,
  generation: u64,
  allow_high_precision_mv: bool,
  reference: Arc<FrameContext>,
  refresh: Refresh,
  counts: Box<[NMVContextCounts]>,
}

impl FrameCoder {
  /// The slot this frame selected.
  pub const fn context_idx(&self) -> usize {
    self.context_idx
  }

  /// Whether 1/8 pel vectors may be coded in this frame.
  pub const fn allow_high_precision_mv(&self) -> bool {
    self.allow_high_precision_mv
  }

  /// The context the frame codes with: the forward context when one was
  /// supplied, the selected slot otherwise.
  pub fn active(&self) -> &FrameContext {
    match &self.refresh {
      Refresh::Forward(fc) => fc.as_ref(),
      Refresh::Off | Refresh::Backward => self.reference.as_ref(),
    }
  }

  /// Tree probabilities of motion vector context `ctx`.
  ///
  /// # Panics
  ///
  /// - If `ctx` is not below the configured `nmv_contexts`.
  pub fn probs(&self, ctx: usize) -> &NMVContext {
    debug_assert!(ctx < self.counts.len());
    self.active().nmvc(ctx)
  }

  /// Cumulative tables of motion vector context `ctx`.
  ///
  /// # Panics
  ///
  /// - If `ctx` is not below the configured `nmv_contexts`.
  pub fn cdfs(&self, ctx: usize) -> &NMVCdfs {
    debug_assert!(ctx < self.counts.len());
    self.active().cdfs(ctx)
  }

  /// Tallies the coded difference `diff` of a vector predicted from
  /// `ref_mv`.
  ///
  /// The 1/8 pel bit only counts when the frame allows it and `ref_mv` is
  /// small enough for it to be coded.
  ///
  /// # Panics
  ///
  /// - If `ctx` is not below the configured `nmv_contexts`.
  pub fn count_mv(
    &mut self, ctx: usize, diff: MotionVector, ref_mv: MotionVector,
  ) {
    let usehp = self.allow_high_precision_mv && use_mv_hp(ref_mv);
    self.count_mv_with(ctx, diff, u32::from(usehp));
  }

  /// Tallies `mv` with an explicit high precision weight.
  ///
  /// # Panics
  ///
  /// - If `ctx` is not below the configured `nmv_contexts`.
  pub fn count_mv_with(&mut self, ctx: usize, mv: MotionVector, usehp: u32) {
    debug_assert!(ctx < self.counts.len());
    inc_mv(mv, Some(&mut self.counts[ctx]), usehp);
  }

  /// Statistics gathered so far, one entry per motion vector context.
  pub fn counts(&self) -> &[NMVContextCounts] {
    &self.counts
  }
}
