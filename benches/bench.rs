// Copyright (c) 2017-2023, The rav1e contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use av1_mvprob::context::*;
use av1_mvprob::mv::MotionVector;
use av1_mvprob::*;
use criterion::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

fn random_mvs(ra: &mut ChaChaRng, n: usize, range: i16) -> Vec<MotionVector> {
  (0..n)
    .map(|_| {
      MotionVector::new(ra.gen_range(-range..range), ra.gen_range(-range..range))
    })
    .collect()
}

fn frame_counts(ra: &mut ChaChaRng, n: usize) -> NMVContextCounts {
  let mut counts = NMVContextCounts::new();
  for mv in random_mvs(ra, n, 4096) {
    inc_mv(mv, Some(&mut counts), 1);
  }
  counts
}

fn count_mvs(c: &mut Criterion) {
  let mut ra = ChaChaRng::from_seed([0; 32]);
  let mvs = random_mvs(&mut ra, 4096, 16383);

  c.bench_function("count_mvs", |b| {
    b.iter(|| {
      let mut counts = NMVContextCounts::new();
      for &mv in mvs.iter() {
        inc_mv(mv, Some(&mut counts), 1);
      }
      black_box(counts)
    })
  });
}

fn adapt(c: &mut Criterion) {
  let mut ra = ChaChaRng::from_seed([0; 32]);
  let counts = frame_counts(&mut ra, 4096);

  c.bench_function("adapt_mv_probs", |b| {
    b.iter(|| {
      black_box(adapt_mv_probs(
        black_box(&default_nmv_context),
        black_box(&counts),
        true,
      ))
    })
  });
}

fn derive_cdfs(c: &mut Criterion) {
  let mut ra = ChaChaRng::from_seed([0; 32]);
  let counts = frame_counts(&mut ra, 4096);
  let nmvc = adapt_mv_probs(&default_nmv_context, &counts, true);

  c.bench_function("derive_cdfs", |b| {
    b.iter(|| black_box(NMVCdfs::from(black_box(&nmvc))))
  });
}

fn session_frame(c: &mut Criterion) {
  let mut ra = ChaChaRng::from_seed([0; 32]);
  let mvs = random_mvs(&mut ra, 1024, 1024);
  let mut set = FrameContextSet::new(SessionConfig::new()).unwrap();

  c.bench_function("session_frame", |b| {
    b.iter(|| {
      let mut frame = set
        .begin_frame(FrameParams {
          refresh: RefreshMode::Backward,
          allow_high_precision_mv: true,
          ..Default::default()
        })
        .unwrap();
      for &mv in mvs.iter() {
        frame.count_mv(0, mv, MotionVector::default());
      }
      set.finish_frame(frame).unwrap();
    })
  });
}

criterion_group!(mvprob, count_mvs, adapt, derive_cdfs, session_frame);
criterion_main!(mvprob);
