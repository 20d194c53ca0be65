// Copyright (c) 2018-2023, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use super::*;
use crate::context::*;
use crate::mv::MotionVector;

use interpolate_name::interpolate_test;
use pretty_assertions::assert_eq;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;
use rayon::prelude::*;

fn setup_session(multisymbol: bool) -> FrameContextSet {
  let cfg = SessionConfig::new().with_multisymbol(multisymbol);
  FrameContextSet::new(cfg).unwrap()
}

fn random_mvs(seed: u64, n: usize) -> Vec<MotionVector> {
  let mut ra = ChaChaRng::seed_from_u64(seed);
  (0..n)
    .map(|_| {
      MotionVector::new(ra.gen_range(-2048..2048), ra.gen_range(-300..300))
    })
    .collect()
}

fn backward(context_idx: usize, allow_high_precision_mv: bool) -> FrameParams {
  FrameParams {
    context_idx,
    refresh: RefreshMode::Backward,
    allow_high_precision_mv,
    ..Default::default()
  }
}

/// A default slot after one backward frame coding `mvs`.
fn adapted(mvs: &[MotionVector], allow_hp: bool) -> FrameContext {
  let mut counts = NMVContextCounts::new();
  for &mv in mvs {
    inc_mv(mv, Some(&mut counts), u32::from(allow_hp));
  }
  FrameContext::new(1).adapt(&[counts], allow_hp)
}

#[test]
fn session_starts_at_defaults() {
  let set = setup_session(true);
  assert_eq!(set.config(), &SessionConfig::default());
  for idx in 0..FRAME_CONTEXTS {
    let fc = set.slot(idx).unwrap();
    assert_eq!(fc.nmv_contexts(), 1);
    assert_eq!(fc.nmvc(0), &default_nmv_context);
  }
  assert!(set.slot(FRAME_CONTEXTS).is_none());
}

#[test]
fn invalid_config() {
  use InvalidConfig::*;

  let cfg = SessionConfig::new();
  let cases = [
    (cfg.with_frame_contexts(0), InvalidFrameContexts(0)),
    (cfg.with_frame_contexts(9), InvalidFrameContexts(9)),
    (cfg.with_nmv_contexts(0), InvalidNmvContexts(0)),
    (cfg.with_nmv_contexts(4), InvalidNmvContexts(4)),
  ];
  for (cfg, err) in cases.iter() {
    assert_eq!(cfg.validate(), Err(*err));
    assert_eq!(FrameContextSet::new(*cfg).err(), Some(*err));
  }
  assert!(SessionConfig::new().with_frame_contexts(1).validate().is_ok());
  assert!(SessionConfig::new().with_nmv_contexts(3).validate().is_ok());
}

#[test]
fn context_index_out_of_range() {
  let mut set = setup_session(true);
  let err = set.begin_frame(backward(FRAME_CONTEXTS, false)).err();
  assert_eq!(
    err,
    Some(FrameContextError::InvalidContextIndex { actual: 8, max: 7 })
  );
  assert_eq!(
    set.reset(ResetScope::Current, 9),
    Err(FrameContextError::InvalidContextIndex { actual: 9, max: 7 })
  );
  // The index only matters when the current slot is reset.
  assert_eq!(set.reset(ResetScope::All, 9), Ok(()));
  assert_eq!(set.reset(ResetScope::None, 9), Ok(()));
}

#[interpolate_test(lazy_no_hp, false, false)]
#[interpolate_test(lazy_hp, false, true)]
#[interpolate_test(eager_no_hp, true, false)]
#[interpolate_test(eager_hp, true, true)]
fn backward_refresh(multisymbol: bool, allow_hp: bool) {
  let mut set = setup_session(multisymbol);
  let mvs = random_mvs(2, 500);

  let mut frame = set.begin_frame(backward(2, allow_hp)).unwrap();
  assert_eq!(frame.active().cdfs_derived(), multisymbol);
  assert_eq!(frame.probs(0), &default_nmv_context);
  for &mv in mvs.iter() {
    frame.count_mv(0, mv, MotionVector::default());
  }
  assert_eq!(frame.counts()[0].total(), 500);
  set.finish_frame(frame).unwrap();

  let expected = adapted(&mvs, allow_hp);
  assert_eq!(set.slot(2).unwrap(), &expected);
  for idx in (0..FRAME_CONTEXTS).filter(|&i| i != 2) {
    assert_eq!(set.slot(idx).unwrap(), &FrameContext::new(1));
  }

  // The next frame on the slot reads the adapted model.
  let frame = set.begin_frame(backward(2, allow_hp)).unwrap();
  assert_eq!(frame.probs(0), expected.nmvc(0));
  assert_eq!(frame.cdfs(0), &NMVCdfs::from(expected.nmvc(0)));
}

#[test]
fn refresh_off_keeps_slot() {
  let mut set = setup_session(true);
  let mut frame = set
    .begin_frame(FrameParams { context_idx: 5, ..Default::default() })
    .unwrap();
  for mv in random_mvs(5, 100) {
    frame.count_mv(0, mv, MotionVector::default());
  }
  set.finish_frame(frame).unwrap();
  assert_eq!(set.slot(5).unwrap(), &FrameContext::new(1));
}

#[test]
fn forward_refresh() {
  let mut set = setup_session(false);
  let mut nmvc = default_nmv_context;
  nmvc.joints = [100, 120, 140];
  nmvc.comps[1].classes[0] = 40;
  let forward = FrameContext::from_models(vec![nmvc]);

  let mut frame = set
    .begin_frame(FrameParams {
      context_idx: 3,
      refresh: RefreshMode::Forward(forward.clone()),
      ..Default::default()
    })
    .unwrap();
  // The supplied table is in use for the frame already.
  assert_eq!(frame.probs(0), &nmvc);
  assert_eq!(frame.cdfs(0).joints_cdf[0], 100 * 128);
  // Forward frames gather no useful statistics but must accept them.
  frame.count_mv(0, MotionVector::new(7, 7), MotionVector::default());
  assert_eq!(set.slot(3).unwrap(), &FrameContext::new(1));

  set.finish_frame(frame).unwrap();
  assert_eq!(set.slot(3).unwrap(), &forward);
}

#[test]
fn forward_context_validation() {
  let mut set = setup_session(true);
  let err = set
    .begin_frame(FrameParams {
      refresh: RefreshMode::Forward(FrameContext::new(2)),
      ..Default::default()
    })
    .err();
  assert_eq!(
    err,
    Some(FrameContextError::InvalidForwardContext { actual: 2, expected: 1 })
  );

  let mut nmvc = default_nmv_context;
  nmvc.comps[0].bits[4] = 0;
  let err = set
    .begin_frame(FrameParams {
      refresh: RefreshMode::Forward(FrameContext::from_models(vec![nmvc])),
      ..Default::default()
    })
    .err();
  assert_eq!(err, Some(FrameContextError::InvalidProbability));
}

fn adapt_slots(set: &mut FrameContextSet, slots: &[usize]) {
  for &idx in slots {
    let mut frame = set.begin_frame(backward(idx, true)).unwrap();
    for mv in random_mvs(idx as u64, 50) {
      frame.count_mv(0, mv, MotionVector::default());
    }
    set.finish_frame(frame).unwrap();
  }
}

#[interpolate_test(0, 0)]
#[interpolate_test(4, 4)]
#[interpolate_test(7, 7)]
fn reset_current(idx: usize) {
  let mut set = setup_session(true);
  let all: Vec<usize> = (0..FRAME_CONTEXTS).collect();
  adapt_slots(&mut set, &all);

  set.reset(ResetScope::Current, idx).unwrap();
  for i in 0..FRAME_CONTEXTS {
    assert_eq!(set.slot(i).unwrap() == &FrameContext::new(1), i == idx);
  }

  set.reset(ResetScope::All, idx).unwrap();
  for i in 0..FRAME_CONTEXTS {
    assert_eq!(set.slot(i).unwrap(), &FrameContext::new(1));
  }
}

#[test]
fn reset_from_frame_params() {
  let mut set = setup_session(true);
  adapt_slots(&mut set, &[1, 6]);

  let frame = set
    .begin_frame(FrameParams {
      context_idx: 6,
      reset: ResetScope::Current,
      ..Default::default()
    })
    .unwrap();
  // The reset happens before the slot is selected.
  assert_eq!(frame.probs(0), &default_nmv_context);
  set.finish_frame(frame).unwrap();
  assert_eq!(set.slot(6).unwrap(), &FrameContext::new(1));
  assert_ne!(set.slot(1).unwrap(), &FrameContext::new(1));

  let frame = set
    .begin_frame(FrameParams {
      context_idx: 0,
      reset: ResetScope::All,
      ..Default::default()
    })
    .unwrap();
  set.finish_frame(frame).unwrap();
  assert_eq!(set.slot(1).unwrap(), &FrameContext::new(1));
}

#[test]
fn stale_slot_refresh_is_rejected() {
  let mut set = setup_session(true);
  let mut first = set.begin_frame(backward(1, false)).unwrap();
  let mut second = set.begin_frame(backward(1, false)).unwrap();
  let off = set
    .begin_frame(FrameParams { context_idx: 1, ..Default::default() })
    .unwrap();

  let first_mvs = random_mvs(10, 40);
  let second_mvs = random_mvs(11, 40);
  for &mv in first_mvs.iter() {
    first.count_mv(0, mv, MotionVector::default());
  }
  for &mv in second_mvs.iter() {
    second.count_mv(0, mv, MotionVector::default());
  }

  set.finish_frame(second).unwrap();
  assert_eq!(
    set.finish_frame(first),
    Err(FrameContextError::StaleSlot { slot: 1 })
  );
  assert_eq!(set.slot(1).unwrap(), &adapted(&second_mvs, false));
  // Nothing to store, so nothing can be stale.
  assert_eq!(set.finish_frame(off), Ok(()));

  // A reset also invalidates frames in flight.
  let frame = set.begin_frame(backward(1, false)).unwrap();
  set.reset(ResetScope::All, 0).unwrap();
  assert_eq!(
    set.finish_frame(frame),
    Err(FrameContextError::StaleSlot { slot: 1 })
  );
  assert_eq!(set.slot(1).unwrap(), &FrameContext::new(1));
}

#[test]
fn high_precision_follows_reference() {
  let mut set = setup_session(true);
  let mut frame = set.begin_frame(backward(0, true)).unwrap();
  // |63| >> 3 = 7 keeps 1/8 pel, |64| >> 3 = 8 drops it.
  frame.count_mv(0, MotionVector::new(2, 0), MotionVector::new(63, -63));
  assert_eq!(frame.counts()[0].comps[0].class0_hp, [0, 1]);
  frame.count_mv(0, MotionVector::new(2, 0), MotionVector::new(64, 0));
  frame.count_mv(0, MotionVector::new(2, 0), MotionVector::new(0, -64));
  assert_eq!(frame.counts()[0].comps[0].class0_hp, [0, 1]);
  assert_eq!(frame.counts()[0].comps[0].class0_fp[0], [3, 0, 0, 0]);

  let mut frame = set.begin_frame(backward(0, false)).unwrap();
  frame.count_mv(0, MotionVector::new(2, 0), MotionVector::default());
  assert_eq!(frame.counts()[0].comps[0].class0_hp, [0, 0]);
}

#[test]
#[should_panic]
fn count_into_missing_nmv_context() {
  let mut set = setup_session(true);
  let mut frame = set.begin_frame(backward(0, true)).unwrap();
  frame.count_mv(1, MotionVector::new(3, 3), MotionVector::default());
}

#[test]
#[should_panic]
fn cdfs_of_missing_nmv_context() {
  let cfg = SessionConfig::new().with_nmv_contexts(2);
  let mut set = FrameContextSet::new(cfg).unwrap();
  let frame = set.begin_frame(backward(0, true)).unwrap();
  frame.cdfs(2);
}

#[test]
fn multiple_nmv_contexts() {
  let cfg = SessionConfig::new().with_nmv_contexts(3).with_multisymbol(false);
  let mut set = FrameContextSet::new(cfg).unwrap();
  let mvs = random_mvs(3, 200);

  let mut frame = set.begin_frame(backward(0, true)).unwrap();
  assert!(!frame.active().cdfs_derived());
  for &mv in mvs.iter() {
    frame.count_mv(1, mv, MotionVector::default());
  }
  assert_eq!(frame.counts()[0].total(), 0);
  assert_eq!(frame.counts()[2].total(), 0);
  set.finish_frame(frame).unwrap();

  let fc = set.slot(0).unwrap();
  assert_eq!(fc.nmv_contexts(), 3);
  assert_eq!(fc.nmvc(0), &default_nmv_context);
  assert_eq!(fc.nmvc(1), adapted(&mvs, true).nmvc(0));
  assert_eq!(fc.nmvc(2), &default_nmv_context);
}

#[test]
fn parallel_frames_match_sequential() {
  let frames: Vec<(usize, Vec<MotionVector>)> = (0..FRAME_CONTEXTS)
    .map(|idx| (idx, random_mvs(100 + idx as u64, 1000)))
    .collect();

  let mut sequential = setup_session(true);
  for (idx, mvs) in frames.iter() {
    let mut frame = sequential.begin_frame(backward(*idx, true)).unwrap();
    for &mv in mvs.iter() {
      frame.count_mv(0, mv, MotionVector::default());
    }
    sequential.finish_frame(frame).unwrap();
  }

  let mut parallel = setup_session(true);
  let mut coders: Vec<FrameCoder> = frames
    .iter()
    .map(|(idx, _)| parallel.begin_frame(backward(*idx, true)).unwrap())
    .collect();
  coders.par_iter_mut().zip(frames.par_iter()).for_each(|(frame, (_, mvs))| {
    for &mv in mvs.iter() {
      frame.count_mv(0, mv, MotionVector::default());
    }
  });
  // Finish in reverse to show slots refresh independently.
  for frame in coders.into_iter().rev() {
    parallel.finish_frame(frame).unwrap();
  }

  for idx in 0..FRAME_CONTEXTS {
    assert_eq!(parallel.slot(idx), sequential.slot(idx));
  }
}
