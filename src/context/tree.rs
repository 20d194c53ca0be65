// Copyright (c) 2017-2023, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use super::*;
use crate::mv::MvJointType;

use arrayvec::ArrayVec;

/// Largest alphabet coded through a tree.
pub const TREE_SYMBOLS_MAX: usize = 16;

/// One entry of a flat binary tree.
///
/// Entries come in pairs: the pair starting at index `i` holds the left and
/// right child of the internal node whose probability is `probs[i >> 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeNode {
  /// A coded symbol.
  Leaf(usize),
  /// An internal node, identified by the index of its child pair.
  Split(usize),
}

/// A binary tree stored in the flat layout shared by the encoder and
/// decoder: non-positive entries are leaves holding `-symbol`, positive
/// entries point to the next child pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tree {
  index: &'static [i8],
}

impl Tree {
  pub const fn new(index: &'static [i8]) -> Self {
    Self { index }
  }

  /// Number of internal nodes, which is also the number of probabilities.
  #[inline]
  pub const fn nodes(&self) -> usize {
    self.index.len() / 2
  }

  #[inline]
  pub const fn symbols(&self) -> usize {
    self.nodes() + 1
  }

  #[inline]
  pub const fn root(&self) -> TreeNode {
    TreeNode::Split(0)
  }

  #[inline]
  pub fn node(&self, i: usize) -> TreeNode {
    let v = self.index[i];
    if v <= 0 {
      TreeNode::Leaf(-v as usize)
    } else {
      TreeNode::Split(v as usize)
    }
  }

  /// Left and right children of the internal node owning pair `pair`.
  #[inline]
  pub fn children(&self, pair: usize) -> (TreeNode, TreeNode) {
    debug_assert!(pair % 2 == 0);
    (self.node(pair), self.node(pair + 1))
  }

  /// Leaf symbols in left-to-right order.
  pub fn leaves(&self) -> ArrayVec<usize, TREE_SYMBOLS_MAX> {
    fn walk(
      tree: &Tree, node: TreeNode, out: &mut ArrayVec<usize, TREE_SYMBOLS_MAX>,
    ) {
      match node {
        TreeNode::Leaf(symbol) => out.push(symbol),
        TreeNode::Split(pair) => {
          let (left, right) = tree.children(pair);
          walk(tree, left, out);
          walk(tree, right, out);
        }
      }
    }

    let mut out = ArrayVec::new();
    walk(self, self.root(), &mut out);
    out
  }
}

pub static av1_mv_joint_tree: Tree = Tree::new(&[
  -(MvJointType::MV_JOINT_ZERO as i8),
  2,
  -(MvJointType::MV_JOINT_HNZVZ as i8),
  4,
  -(MvJointType::MV_JOINT_HZVNZ as i8),
  -(MvJointType::MV_JOINT_HNZVNZ as i8),
]);

#[rustfmt::skip]
pub static av1_mv_class_tree: Tree = Tree::new(&[
  -(MV_CLASS_0 as i8), 2,
  -(MV_CLASS_1 as i8), 4,
  6, 8,
  -(MV_CLASS_2 as i8), -(MV_CLASS_3 as i8),
  10, 12,
  -(MV_CLASS_4 as i8), -(MV_CLASS_5 as i8),
  -(MV_CLASS_6 as i8), 14,
  16, 18,
  -(MV_CLASS_7 as i8), -(MV_CLASS_8 as i8),
  -(MV_CLASS_9 as i8), -(MV_CLASS_10 as i8),
]);

pub static av1_mv_class0_tree: Tree = Tree::new(&[-0, -1]);

pub static av1_mv_fp_tree: Tree = Tree::new(&[-0, 2, -1, 4, -2, -3]);

/// Single decision, used for the sign, bit-plane and high precision bits.
pub static av1_binary_tree: Tree = Tree::new(&[-0, -1]);
