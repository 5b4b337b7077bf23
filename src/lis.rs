//! Longest increasing subsequence, used to minimize moves when reordering keyed children.

/// Marks the entries that belong to one longest strictly increasing subsequence.
///
/// `None` entries never belong to it. Among equally long subsequences, the one with the
/// smallest values wins.
pub(crate) fn longest_increasing(sequence: &[Option<usize>]) -> Vec<bool> {
	// tails[k]: index (into `sequence`) of the smallest tail of an increasing run of length k + 1.
	let mut tails: Vec<usize> = Vec::new();
	let mut predecessors: Vec<Option<usize>> = vec![None; sequence.len()];

	for (i, value) in sequence.iter().enumerate() {
		let value = match value {
			Some(value) => *value,
			None => continue,
		};
		let length = tails.partition_point(|&tail| sequence[tail].map_or(false, |tail| tail < value));
		predecessors[i] = length.checked_sub(1).map(|previous| tails[previous]);
		if length == tails.len() {
			tails.push(i);
		} else {
			tails[length] = i;
		}
	}

	let mut members = vec![false; sequence.len()];
	let mut cursor = tails.last().copied();
	while let Some(i) = cursor {
		members[i] = true;
		cursor = predecessors[i];
	}
	members
}

#[cfg(test)]
mod tests {
	use super::longest_increasing;

	fn lis(sequence: &[Option<usize>]) -> Vec<usize> {
		longest_increasing(sequence).into_iter().enumerate().filter(|(_, member)| *member).map(|(i, _)| i).collect()
	}

	#[test]
	fn empty() {
		assert!(longest_increasing(&[]).is_empty());
	}

	#[test]
	fn sorted_is_kept_whole() {
		assert_eq!(lis(&[Some(0), Some(1), Some(2)]), vec![0, 1, 2]);
	}

	#[test]
	fn rotation_moves_one() {
		// [3, 1, 2] against old positions: 3 was at 2, 1 at 0, 2 at 1.
		assert_eq!(lis(&[Some(2), Some(0), Some(1)]), vec![1, 2]);
	}

	#[test]
	fn reversed_keeps_one() {
		assert_eq!(lis(&[Some(3), Some(2), Some(1), Some(0)]).len(), 1);
	}

	#[test]
	fn gaps_are_skipped() {
		assert_eq!(lis(&[None, Some(1), None, Some(0), Some(2)]), vec![3, 4]);
	}
}
