//! Server-side event handler registry.
//!
//! When markup is rendered with hydration enabled, each event handler is published here under a synthesized [`ActionId`]
//! and the element gets a `data-action-<event>="<id>"` attribute. A hydration step on the client side can then look the handlers up again.
//!
//! A registry is owned by its renderer and only ever grows while rendering.
//! Draining it is up to whoever consumes the actions.

use crate::node::EventHandler;
use core::fmt::{self, Display, Formatter};
use hashbrown::HashMap;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(u64);
impl ActionId {
	/// Parses the attribute value form, e.g. `a12`.
	#[must_use]
	pub fn parse(value: &str) -> Option<Self> {
		value.strip_prefix('a')?.parse().ok().map(Self)
	}
}
impl Display for ActionId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "a{}", self.0)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
	pub event: String,
	pub handler: EventHandler,
}

#[derive(Debug, Default)]
pub struct ActionRegistry {
	next_id: u64,
	actions: HashMap<ActionId, Action>,
}
impl ActionRegistry {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn publish(&mut self, event: &str, handler: &EventHandler) -> ActionId {
		let id = ActionId(self.next_id);
		self.next_id += 1;
		let previous = self.actions.insert(
			id,
			Action {
				event: event.to_owned(),
				handler: handler.clone(),
			},
		);
		debug_assert!(previous.is_none(), "Action id {} was reused", id);
		trace!("Published action {} for {:?}.", id, event);
		id
	}

	#[must_use]
	pub fn get(&self, id: ActionId) -> Option<&Action> {
		self.actions.get(&id)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.actions.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.actions.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (ActionId, &Action)> {
		self.actions.iter().map(|(id, action)| (*id, action))
	}

	/// Removes and returns all actions. Ids are not reused afterwards.
	pub fn drain(&mut self) -> impl '_ + Iterator<Item = (ActionId, Action)> {
		self.actions.drain()
	}
}
