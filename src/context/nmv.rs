// Copyright (c) 2017-2023, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use super::*;
use crate::serialize::{Deserialize, Serialize};

/// Probabilities are 8-bit, the chance of the left branch out of 256.
pub type Prob = u8;

/// Probability model for one motion vector component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NMVComponent {
  pub sign: Prob,
  pub classes: [Prob; MV_CLASSES - 1],
  pub class0: [Prob; CLASS0_SIZE - 1],
  pub bits: [Prob; MV_OFFSET_BITS],
  pub class0_fp: [[Prob; MV_FP_SIZE - 1]; CLASS0_SIZE],
  pub fp: [Prob; MV_FP_SIZE - 1],

  pub class0_hp: Prob,
  pub hp: Prob,
}

/// Probability model for a whole motion vector: which components are
/// nonzero, then one [`NMVComponent`] per axis (row first).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NMVContext {
  pub joints: [Prob; MV_JOINTS - 1],
  pub comps: [NMVComponent; 2],
}

impl NMVComponent {
  fn for_each_prob(&self, mut f: impl FnMut(Prob)) {
    f(self.sign);
    self.classes.iter().for_each(|&p| f(p));
    self.class0.iter().for_each(|&p| f(p));
    self.bits.iter().for_each(|&p| f(p));
    self.class0_fp.iter().flatten().for_each(|&p| f(p));
    self.fp.iter().for_each(|&p| f(p));
    f(self.class0_hp);
    f(self.hp);
  }
}

impl NMVContext {
  /// Visits every stored probability.
  pub fn for_each_prob(&self, mut f: impl FnMut(Prob)) {
    self.joints.iter().for_each(|&p| f(p));
    for comp in self.comps.iter() {
      comp.for_each_prob(&mut f);
    }
  }

  /// A probability of 0 would leave the coder without a split.
  pub fn is_valid(&self) -> bool {
    let mut valid = true;
    self.for_each_prob(|p| valid &= p != 0);
    valid
  }
}

impl Default for NMVContext {
  fn default() -> Self {
    default_nmv_context
  }
}

const default_bits: [Prob; MV_OFFSET_BITS] =
  [136, 140, 148, 160, 176, 192, 224, 234, 234, 240];

pub static default_nmv_context: NMVContext = NMVContext {
  joints: [32, 64, 96],
  comps: [
    // Vertical component
    NMVComponent {
      sign: 128,
      classes: [224, 144, 192, 168, 192, 176, 192, 198, 198, 245],
      class0: [216],
      bits: default_bits,
      class0_fp: [[128, 128, 64], [96, 112, 64]],
      fp: [64, 96, 64],
      class0_hp: 160,
      hp: 128,
    },
    // Horizontal component
    NMVComponent {
      sign: 128,
      classes: [216, 128, 176, 160, 176, 176, 192, 198, 198, 208],
      class0: [208],
      bits: default_bits,
      class0_fp: [[128, 128, 64], [96, 112, 64]],
      fp: [64, 96, 64],
      class0_hp: 160,
      hp: 128,
    },
  ],
};
