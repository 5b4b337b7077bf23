use thiserror::Error;

/// Errors raised by application code inside lifecycle hooks and render functions.
pub type BoxError = Box<dyn std::error::Error>;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
	/// A virtual element carried a tag name no host could create.
	///
	/// This is a programmer error and surfaces as soon as the element is diffed.
	#[error("invalid tag name {0:?}")]
	InvalidTagName(String),

	/// A lifecycle hook or render function returned an error.
	#[error("`{component}::{hook}` failed")]
	Hook {
		component: &'static str,
		hook: &'static str,
		#[source]
		source: BoxError,
	},

	#[error("`{0}` was asked to render while it is already rendering")]
	ReentrantRender(&'static str),

	#[error("`{0}` finished rendering without a real node")]
	MissingBase(&'static str),

	#[error("the renderer owning this component was dropped")]
	RendererDropped,
}
