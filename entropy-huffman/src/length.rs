//! Minimum-redundancy code length construction (§4.8): Moffat-Katajainen's
//! in-place, three-phase algorithm over a weight array sorted ascending.
//!
//! Phase 1 folds the two smallest weights together repeatedly, leaving a
//! parent-pointer chain in place of the original weights. Phase 2 walks
//! that chain to turn parent pointers into depths-from-leaf counts. Phase
//! 3 reinterprets those counts level by level to produce final code
//! lengths, overwriting the array a third time.

/// Run the three-phase construction over `weights` (ascending, `len >=
/// 2`), returning code lengths in the same order as the input.
fn minimum_redundancy(weights: &mut [u64]) -> Vec<u32> {
    let n = weights.len();
    debug_assert!(n >= 2);

    // Phase 1: replace weights with a parent-pointer chain.
    let mut root = 0usize;
    let mut leaf = 2usize;

    weights[0] += weights[1];

    for next in 1..n - 1 {
        if leaf >= n || weights[root] < weights[leaf] {
            weights[next] = weights[root];
            weights[root] = next as u64;
            root += 1;
        } else {
            weights[next] = weights[leaf];
            leaf += 1;
        }

        if leaf >= n || (root < next && weights[root] < weights[leaf]) {
            weights[next] += weights[root];
            weights[root] = next as u64;
            root += 1;
        } else {
            weights[next] += weights[leaf];
            leaf += 1;
        }
    }

    // Phase 2: parent pointers -> depth-from-leaf counts.
    weights[n - 2] = 0;
    for next in (0..n.saturating_sub(2)).rev() {
        weights[next] = weights[weights[next] as usize] + 1;
    }

    // Phase 3: depth counts -> final code lengths, written back in place.
    let mut lengths = vec![0u32; n];
    let mut available = 1u64;
    let mut used = 0u64;
    let mut depth = 0u32;
    let mut root = n as isize - 2;
    let mut next = n as isize - 1;

    while available > 0 {
        while root >= 0 && weights[root as usize] == depth as u64 {
            used += 1;
            root -= 1;
        }
        while available > used {
            lengths[next as usize] = depth;
            next -= 1;
            available -= 1;
        }
        available = 2 * used;
        depth += 1;
        used = 0;
    }

    lengths
}

/// Compute code lengths for `freq` (frequencies for the present alphabet,
/// any order); `freq` must be non-empty. Returns lengths in the same
/// order as `freq`.
pub fn code_lengths(freq: &[u64]) -> Vec<u32> {
    let n = freq.len();
    if n == 1 {
        return vec![1];
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| freq[i]);

    let mut sorted: Vec<u64> = order.iter().map(|&i| freq[i]).collect();
    let sorted_lengths = minimum_redundancy(&mut sorted);

    let mut lengths = vec![0u32; n];
    for (pos, &orig_idx) in order.iter().enumerate() {
        lengths[orig_idx] = sorted_lengths[pos];
    }
    lengths
}
