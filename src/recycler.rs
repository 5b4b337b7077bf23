//! Pool of detached elements, reused by later element creations with the same tag.

use crate::host::{Host, NodeId};
use hashbrown::{HashMap, HashSet};
use tracing::{trace, warn};

#[derive(Debug, Default)]
pub(crate) struct Recycler {
	nodes: HashMap<(String, bool), Vec<NodeId>>,
	pooled: HashSet<NodeId>,
}

impl Recycler {
	/// Pools a detached element and returns whether `node` is in the pool now. Text nodes are
	/// not pooled.
	///
	/// The caller is responsible for having stripped listeners and framework metadata.
	pub(crate) fn collect(&mut self, host: &dyn Host, node: NodeId, svg: bool) -> bool {
		let tag = match host.tag_name(node) {
			Some(tag) => tag.to_lowercase(),
			None => return false,
		};
		if !self.pooled.insert(node) {
			warn!(?node, "Node was collected twice.");
			return true;
		}
		trace!(?node, tag = %tag, "Pooled.");
		self.nodes.entry((tag, svg)).or_default().push(node);
		true
	}

	/// Reuses a pooled element with a matching tag and namespace, or creates a new one.
	pub(crate) fn create(&mut self, host: &mut dyn Host, tag: &str, svg: bool) -> NodeId {
		let reused = self.nodes.get_mut(&(tag.to_lowercase(), svg)).and_then(Vec::pop);
		match reused {
			Some(node) => {
				self.pooled.remove(&node);
				trace!(?node, tag, "Reused.");
				node
			}
			None => host.create_element(tag, svg),
		}
	}

	#[cfg(test)]
	fn contains(&self, node: NodeId) -> bool {
		self.pooled.contains(&node)
	}

	pub(crate) fn len(&self) -> usize {
		self.pooled.len()
	}
}
