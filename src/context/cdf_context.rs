// Copyright (c) 2017-2023, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use super::*;
use std::fmt;
use std::sync::OnceLock;

/// Full scale of a CDF, the coder works in Q15.
pub const CDF_PROB_BITS: u32 = 15;
pub const CDF_PROB_TOP: u32 = 1 << CDF_PROB_BITS;

/// Splits `pdf` over the subtree rooted at `node`, storing the mass of each
/// leaf in `pdfs`. Returns the mass actually handed out, which exceeds `pdf`
/// only when underflowing leaves had to be raised to 1.
fn tree_node_compute_probs(
  tree: &Tree, probs: &[Prob], node: TreeNode, pdf: u32, pdfs: &mut [u32],
) -> u32 {
  match node {
    TreeNode::Leaf(symbol) => {
      // A symbol must never become impossible to code.
      let pdf = pdf.max(1);
      pdfs[symbol] = pdf;
      pdf
    }
    TreeNode::Split(pair) => {
      let prob = u32::from(probs[pair >> 1]);
      let (left, right) = tree.children(pair);
      // The less likely branch is split first, the other one gets the rest.
      if prob < 128 {
        let lp = (pdf * prob + 128) >> 8;
        let lp = tree_node_compute_probs(tree, probs, left, lp, pdfs);
        let rp = tree_node_compute_probs(
          tree,
          probs,
          right,
          pdf.saturating_sub(lp),
          pdfs,
        );
        lp + rp
      } else {
        let rp = (pdf * (256 - prob) + 128) >> 8;
        let rp = tree_node_compute_probs(tree, probs, right, rp, pdfs);
        let lp =
          tree_node_compute_probs(tree, probs, left, pdf.saturating_sub(rp), pdfs);
        lp + rp
      }
    }
  }
}

/// Converts the node probabilities of `tree` to a cumulative distribution
/// over its leaves, in left-to-right leaf order.
///
/// The result is non-decreasing and its last entry is [`CDF_PROB_TOP`].
/// Encoder and decoder must derive identical tables, so the rounding order
/// here is part of the format.
///
/// # Panics
///
/// - If `N` differs from the number of symbols of `tree`.
pub fn tree_to_cdf<const N: usize>(tree: &Tree, probs: &[Prob]) -> [u16; N] {
  assert_eq!(N, tree.symbols());
  debug_assert_eq!(probs.len(), tree.nodes());

  let mut pdfs = [0u32; TREE_SYMBOLS_MAX];
  let total = tree_node_compute_probs(
    tree,
    probs,
    tree.root(),
    CDF_PROB_TOP,
    &mut pdfs,
  );
  debug_assert_eq!(total, CDF_PROB_TOP);

  let mut cdf = [0u16; N];
  let mut sum = 0;
  for (c, &symbol) in cdf.iter_mut().zip(tree.leaves().iter()) {
    sum += pdfs[symbol];
    *c = sum as u16;
  }
  cdf
}

/// Probability of `element` in a cumulative table.
pub const fn cdf_element_prob(cdf: &[u16], element: usize) -> u16 {
  cdf[element] - if element > 0 { cdf[element - 1] } else { 0 }
}

/// Converts to the `32768 - x` layout used by inverse-CDF coders.
pub fn inverse_cdf<const N: usize>(cdf: &[u16; N]) -> [u16; N] {
  let mut icdf = [0u16; N];
  for (i, &c) in icdf.iter_mut().zip(cdf.iter()) {
    *i = (CDF_PROB_TOP - u32::from(c)) as u16;
  }
  icdf
}

fn binary_cdf(prob: Prob) -> [u16; 2] {
  tree_to_cdf(&av1_binary_tree, &[prob])
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NMVComponentCdfs {
  pub sign_cdf: [u16; 2],
  pub class0_hp_cdf: [u16; 2],
  pub hp_cdf: [u16; 2],
  pub class0_cdf: [u16; CLASS0_SIZE],
  pub bits_cdf: [[u16; 2]; MV_OFFSET_BITS],

  pub class0_fp_cdf: [[u16; MV_FP_SIZE]; CLASS0_SIZE],
  pub fp_cdf: [u16; MV_FP_SIZE],

  pub classes_cdf: [u16; MV_CLASSES],
}

/// Cumulative tables mirroring one [`NMVContext`], for multi-symbol coding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NMVCdfs {
  pub joints_cdf: [u16; MV_JOINTS],
  pub comps: [NMVComponentCdfs; 2],
}

impl From<&NMVComponent> for NMVComponentCdfs {
  fn from(comp: &NMVComponent) -> Self {
    let mut bits_cdf = [[0; 2]; MV_OFFSET_BITS];
    for (cdf, &prob) in bits_cdf.iter_mut().zip(comp.bits.iter()) {
      *cdf = binary_cdf(prob);
    }
    let mut class0_fp_cdf = [[0; MV_FP_SIZE]; CLASS0_SIZE];
    for (cdf, probs) in class0_fp_cdf.iter_mut().zip(comp.class0_fp.iter()) {
      *cdf = tree_to_cdf(&av1_mv_fp_tree, probs);
    }

    NMVComponentCdfs {
      sign_cdf: binary_cdf(comp.sign),
      class0_hp_cdf: binary_cdf(comp.class0_hp),
      hp_cdf: binary_cdf(comp.hp),
      class0_cdf: tree_to_cdf(&av1_mv_class0_tree, &comp.class0),
      bits_cdf,
      class0_fp_cdf,
      fp_cdf: tree_to_cdf(&av1_mv_fp_tree, &comp.fp),
      classes_cdf: tree_to_cdf(&av1_mv_class_tree, &comp.classes),
    }
  }
}

impl From<&NMVContext> for NMVCdfs {
  fn from(nmvc: &NMVContext) -> Self {
    NMVCdfs {
      joints_cdf: tree_to_cdf(&av1_mv_joint_tree, &nmvc.joints),
      comps: [(&nmvc.comps[0]).into(), (&nmvc.comps[1]).into()],
    }
  }
}

/// The motion vector state persisted between frames: one [`NMVContext`] per
/// reference category, each with its cumulative tables derived on first use.
#[derive(Clone)]
pub struct FrameContext {
  nmvc: Box<[NMVContext]>,
  cdfs: Box<[OnceLock<NMVCdfs>]>,
}

impl FrameContext {
  /// A context holding `nmv_contexts` copies of the default model.
  pub fn new(nmv_contexts: usize) -> Self {
    Self::from_models(vec![default_nmv_context; nmv_contexts])
  }

  pub fn from_models(nmvc: Vec<NMVContext>) -> Self {
    let cdfs = nmvc.iter().map(|_| OnceLock::new()).collect();
    FrameContext { nmvc: nmvc.into_boxed_slice(), cdfs }
  }

  #[inline]
  pub fn nmv_contexts(&self) -> usize {
    self.nmvc.len()
  }

  #[inline]
  pub fn nmvc(&self, ctx: usize) -> &NMVContext {
    &self.nmvc[ctx]
  }

  #[inline]
  pub fn models(&self) -> &[NMVContext] {
    &self.nmvc
  }

  /// Cumulative tables for NMV context `ctx`, derived on first request.
  pub fn cdfs(&self, ctx: usize) -> &NMVCdfs {
    self.cdfs[ctx].get_or_init(|| NMVCdfs::from(&self.nmvc[ctx]))
  }

  /// Derives every cumulative table now rather than on first use.
  pub fn derive_cdfs(&self) {
    for ctx in 0..self.nmv_contexts() {
      self.cdfs(ctx);
    }
  }

  pub fn cdfs_derived(&self) -> bool {
    self.cdfs.iter().all(|c| c.get().is_some())
  }

  pub fn is_valid(&self) -> bool {
    self.nmvc.iter().all(NMVContext::is_valid)
  }

  /// Backward adaptation of every NMV context, see [`adapt_mv_probs`].
  ///
  /// # Panics
  ///
  /// - If `counts` does not hold one entry per NMV context.
  pub fn adapt(&self, counts: &[NMVContextCounts], allow_hp: bool) -> Self {
    assert_eq!(counts.len(), self.nmv_contexts());
    Self::from_models(
      self
        .nmvc
        .iter()
        .zip(counts.iter())
        .map(|(pre_fc, counts)| adapt_mv_probs(pre_fc, counts, allow_hp))
        .collect(),
    )
  }
}

impl PartialEq for FrameContext {
  fn eq(&self, other: &Self) -> bool {
    self.nmvc == other.nmvc
  }
}

impl Eq for FrameContext {}

impl fmt::Debug for FrameContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FrameContext")
      .field("nmv_contexts", &self.nmv_contexts())
      .field("cdfs_derived", &self.cdfs_derived())
      .finish()
  }
}
