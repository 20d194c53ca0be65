// Copyright (c) 2017-2023, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use super::*;

pub const MODE_MV_COUNT_SAT: u32 = 20;
pub const MODE_MV_MAX_UPDATE_FACTOR: u32 = 128;

static count_to_update_factor: [u32; MODE_MV_COUNT_SAT as usize + 1] = [
  0, 6, 12, 19, 25, 32, 38, 44, 51, 57, 64, 70, 76, 83, 89, 96, 102, 108, 115,
  121, MODE_MV_MAX_UPDATE_FACTOR,
];

/// `num / den` on the 8-bit probability scale, clipped to `[1, 255]`.
#[inline]
pub fn get_prob(num: u64, den: u64) -> Prob {
  debug_assert!(den != 0 && num <= den);
  // num <= den < 2^36, so the product cannot overflow.
  let p = (num * 256 + (den >> 1)) / den;
  p.clamp(1, 255) as Prob
}

#[inline]
const fn weighted_prob(prob1: u32, prob2: u32, factor: u32) -> Prob {
  ((prob1 * (256 - factor) + prob2 * factor + 128) >> 8) as Prob
}

/// Blends `pre_prob` with the probability observed in `ct`.
///
/// The weight of the observation grows with the number of samples but
/// saturates at one half, so a single frame never overrides the reference.
#[inline]
pub fn mode_mv_merge_probs(pre_prob: Prob, ct: [u32; 2]) -> Prob {
  merge_probs(pre_prob, ct[0].into(), ct[1].into())
}

/// Subtree sums can exceed `u32`, the merge works on `u64` counts.
fn merge_probs(pre_prob: Prob, ct0: u64, ct1: u64) -> Prob {
  let den = ct0 + ct1;
  if den == 0 {
    pre_prob
  } else {
    let count = den.min(MODE_MV_COUNT_SAT.into()) as usize;
    let factor = count_to_update_factor[count];
    let prob = get_prob(ct0, den);
    weighted_prob(pre_prob.into(), prob.into(), factor)
  }
}

fn subtree_count(
  tree: &Tree, node: TreeNode, pre_probs: &[Prob], counts: &[u32],
  probs: &mut [Prob],
) -> u64 {
  match node {
    TreeNode::Leaf(symbol) => counts[symbol].into(),
    TreeNode::Split(pair) => {
      tree_merge_probs_impl(tree, pair, pre_probs, counts, probs)
    }
  }
}

fn tree_merge_probs_impl(
  tree: &Tree, pair: usize, pre_probs: &[Prob], counts: &[u32],
  probs: &mut [Prob],
) -> u64 {
  let (left, right) = tree.children(pair);
  let left_count = subtree_count(tree, left, pre_probs, counts, probs);
  let right_count = subtree_count(tree, right, pre_probs, counts, probs);
  probs[pair >> 1] =
    merge_probs(pre_probs[pair >> 1], left_count, right_count);
  left_count + right_count
}

/// Adapts every node probability of `tree`, writing the result to `probs`.
pub fn tree_merge_probs(
  tree: &Tree, pre_probs: &[Prob], counts: &[u32], probs: &mut [Prob],
) {
  debug_assert_eq!(pre_probs.len(), tree.nodes());
  debug_assert_eq!(probs.len(), tree.nodes());
  debug_assert_eq!(counts.len(), tree.symbols());
  tree_merge_probs_impl(tree, 0, pre_probs, counts, probs);
}

fn adapt_mv_component(
  pre_comp: &NMVComponent, c: &NMVComponentCounts, allow_hp: bool,
) -> NMVComponent {
  let mut comp = *pre_comp;

  comp.sign = mode_mv_merge_probs(pre_comp.sign, c.sign);
  tree_merge_probs(
    &av1_mv_class_tree,
    &pre_comp.classes,
    &c.classes,
    &mut comp.classes,
  );
  tree_merge_probs(
    &av1_mv_class0_tree,
    &pre_comp.class0,
    &c.class0,
    &mut comp.class0,
  );

  for j in 0..MV_OFFSET_BITS {
    comp.bits[j] = mode_mv_merge_probs(pre_comp.bits[j], c.bits[j]);
  }

  for j in 0..CLASS0_SIZE {
    tree_merge_probs(
      &av1_mv_fp_tree,
      &pre_comp.class0_fp[j],
      &c.class0_fp[j],
      &mut comp.class0_fp[j],
    );
  }

  tree_merge_probs(&av1_mv_fp_tree, &pre_comp.fp, &c.fp, &mut comp.fp);

  if allow_hp {
    comp.class0_hp = mode_mv_merge_probs(pre_comp.class0_hp, c.class0_hp);
    comp.hp = mode_mv_merge_probs(pre_comp.hp, c.hp);
  }

  comp
}

/// Backward adaptation of a motion vector model.
///
/// Returns `pre_fc` updated with the statistics gathered over one frame. The
/// high precision probabilities are carried over unchanged unless
/// `allow_hp` is set.
pub fn adapt_mv_probs(
  pre_fc: &NMVContext, counts: &NMVContextCounts, allow_hp: bool,
) -> NMVContext {
  let mut fc = *pre_fc;

  tree_merge_probs(
    &av1_mv_joint_tree,
    &pre_fc.joints,
    &counts.joints,
    &mut fc.joints,
  );

  for i in 0..2 {
    fc.comps[i] =
      adapt_mv_component(&pre_fc.comps[i], &counts.comps[i], allow_hp);
  }

  log::trace!(
    "adapted mv probabilities from {} vectors (hp: {})",
    counts.total(),
    allow_hp
  );

  fc
}
