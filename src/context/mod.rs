// Copyright (c) 2017-2023, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

#![allow(non_upper_case_globals)]

use std::cmp;

pub use crate::mv::MV_JOINTS;

/* Symbols for coding magnitude class of nonzero components */
pub const MV_CLASSES: usize = 11;

// MV Class Types
pub const MV_CLASS_0: usize = 0; /* (0, 2]     integer pel */
pub const MV_CLASS_1: usize = 1; /* (2, 4]     integer pel */
pub const MV_CLASS_2: usize = 2; /* (4, 8]     integer pel */
pub const MV_CLASS_3: usize = 3; /* (8, 16]    integer pel */
pub const MV_CLASS_4: usize = 4; /* (16, 32]   integer pel */
pub const MV_CLASS_5: usize = 5; /* (32, 64]   integer pel */
pub const MV_CLASS_6: usize = 6; /* (64, 128]  integer pel */
pub const MV_CLASS_7: usize = 7; /* (128, 256] integer pel */
pub const MV_CLASS_8: usize = 8; /* (256, 512] integer pel */
pub const MV_CLASS_9: usize = 9; /* (512, 1024] integer pel */
pub const MV_CLASS_10: usize = 10; /* (1024,2048] integer pel */

pub const CLASS0_BITS: usize = 1; /* bits at integer precision for class 0 */
pub const CLASS0_SIZE: usize = 1 << CLASS0_BITS;
pub const MV_OFFSET_BITS: usize = MV_CLASSES + CLASS0_BITS - 2;
pub const MV_FP_SIZE: usize = 4;

/// Largest `|component| - 1` that still has a distinct class. Anything
/// above it lands in `MV_CLASS_10`.
pub const MV_CLASS_CEIL: u32 = CLASS0_SIZE as u32 * 4096;

mod tree;
pub use tree::*;

mod nmv;
pub use nmv::*;

mod counts;
pub use counts::*;

mod adapt;
pub use adapt::*;

mod cdf_context;
pub use cdf_context::*;

#[inline(always)]
pub const fn mv_class_base(mv_class: usize) -> u32 {
  if mv_class != MV_CLASS_0 {
    (CLASS0_SIZE << (mv_class + 2)) as u32
  } else {
    0
  }
}

#[inline(always)]
// If n != 0, returns the floor of log base 2 of n. If n == 0, returns 0.
pub fn log_in_base_2(n: u32) -> u8 {
  31 - cmp::min(31, n.leading_zeros() as u8)
}

/// Returns `(mv_class, offset)`
#[inline(always)]
pub fn get_mv_class(z: u32) -> (usize, u32) {
  let c = if z >= MV_CLASS_CEIL {
    MV_CLASS_10
  } else {
    log_in_base_2(z >> 3) as usize
  };

  let offset = z - mv_class_base(c);
  (c, offset)
}
