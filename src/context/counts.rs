// Copyright (c) 2017-2023, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use super::*;
use crate::mv::*;

/// Symbol tallies for one motion vector component, shaped like
/// [`NMVComponent`] but with one counter per leaf.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NMVComponentCounts {
  pub sign: [u32; 2],
  pub classes: [u32; MV_CLASSES],
  pub class0: [u32; CLASS0_SIZE],
  pub bits: [[u32; 2]; MV_OFFSET_BITS],
  pub class0_fp: [[u32; MV_FP_SIZE]; CLASS0_SIZE],
  pub fp: [u32; MV_FP_SIZE],
  pub class0_hp: [u32; 2],
  pub hp: [u32; 2],
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NMVContextCounts {
  pub joints: [u32; MV_JOINTS],
  pub comps: [NMVComponentCounts; 2],
}

impl NMVContextCounts {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of vectors tallied, saturating at `u32::MAX`.
  pub fn total(&self) -> u32 {
    self.joints.iter().fold(0, |acc, &c| acc.saturating_add(c))
  }
}

/// Tallies saturate rather than wrap.
#[inline]
fn bump(count: &mut u32, incr: u32) {
  *count = count.saturating_add(incr);
}

fn inc_mv_component(
  v: i32, comp_counts: &mut NMVComponentCounts, incr: u32, usehp: u32,
) {
  debug_assert!(v != 0);
  let s = usize::from(v < 0);
  bump(&mut comp_counts.sign[s], incr);
  let z = v.unsigned_abs() - 1; // magnitude - 1

  let (c, o) = get_mv_class(z);
  bump(&mut comp_counts.classes[c], incr);

  let d = (o >> 3) as usize; // int mv data
  let f = ((o >> 1) & 3) as usize; // fractional pel mv data
  let e = (o & 1) as usize; // high precision mv data

  if c == MV_CLASS_0 {
    bump(&mut comp_counts.class0[d], incr);
    bump(&mut comp_counts.class0_fp[d][f], incr);
    bump(&mut comp_counts.class0_hp[e], usehp.saturating_mul(incr));
  } else {
    let n = c + CLASS0_BITS - 1; // number of bits
    for i in 0..n {
      bump(&mut comp_counts.bits[i][(d >> i) & 1], incr);
    }
    bump(&mut comp_counts.fp[f], incr);
    bump(&mut comp_counts.hp[e], usehp.saturating_mul(incr));
  }
}

/// Tallies the symbols coded for `mv`, with each leaf counted `incr` times.
///
/// `usehp` multiplies the high precision tallies; pass 0 when the 1/8 pel bit
/// is not coded so that it still shows up as an explicit zero.
pub fn inc_mv_weighted(
  mv: MotionVector, counts: Option<&mut NMVContextCounts>, incr: u32,
  usehp: u32,
) {
  debug_assert!(mv.is_valid());
  if let Some(counts) = counts {
    let j = av1_get_mv_joint(mv);
    bump(&mut counts.joints[j as usize], incr);

    if mv_joint_vertical(j) {
      inc_mv_component(mv.row.into(), &mut counts.comps[0], incr, usehp);
    }

    if mv_joint_horizontal(j) {
      inc_mv_component(mv.col.into(), &mut counts.comps[1], incr, usehp);
    }
  }
}

/// Tallies the symbols coded for `mv`. A `None` destination is a no-op.
#[inline]
pub fn inc_mv(
  mv: MotionVector, counts: Option<&mut NMVContextCounts>, usehp: u32,
) {
  inc_mv_weighted(mv, counts, 1, usehp);
}
