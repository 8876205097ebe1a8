//! Answer span selection over start/end logits

use std::ops::Range;

/// Best answer span found in one window, in window token indices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanCandidate {
    /// First answer token (inclusive)
    pub start: usize,
    /// Last answer token (inclusive)
    pub end: usize,
    /// `p(start) * p(end)`
    pub score: f32,
}

/// Numerically stable softmax
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![0.0; logits.len()];
    }
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Pick the highest scoring span inside `context`
///
/// Probabilities are normalized over the context tokens only, so question
/// and special tokens can never be part of an answer. Spans longer than
/// `max_answer_tokens` are ignored.
pub fn best_span(
    start_logits: &[f32],
    end_logits: &[f32],
    context: Range<usize>,
    max_answer_tokens: usize,
) -> Option<SpanCandidate> {
    let context = context.start..context.end.min(start_logits.len()).min(end_logits.len());
    if context.is_empty() || max_answer_tokens == 0 {
        return None;
    }

    let start_probs = softmax(&start_logits[context.clone()]);
    let end_probs = softmax(&end_logits[context.clone()]);
    let len = context.len();

    let mut best: Option<SpanCandidate> = None;
    for s in 0..len {
        let last = (s + max_answer_tokens).min(len);
        for e in s..last {
            let score = start_probs[s] * end_probs[e];
            if best.map_or(true, |b| score > b.score) {
                best = Some(SpanCandidate {
                    start: context.start + s,
                    end: context.start + e,
                    score,
                });
            }
        }
    }
    best
}

/// Split `len` tokens into windows of at most `window` tokens
///
/// Consecutive windows share `overlap` tokens so an answer that straddles a
/// boundary is fully contained in at least one window.
pub fn context_windows(len: usize, window: usize, overlap: usize) -> Vec<Range<usize>> {
    if len == 0 || window == 0 {
        return Vec::new();
    }

    let step = window.saturating_sub(overlap).max(1);
    let mut windows = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + window).min(len);
        windows.push(start..end);
        if end == len {
            break;
        }
        start += step;
    }
    windows
}
