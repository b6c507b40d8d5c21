use std::io;

/// Failures of the driver core.
///
/// Composite operations return the first failing step unchanged; nothing is
/// retried.
#[derive(Debug, Fail)]
pub enum Error {
	/// The handle's bus was released by `Nt3h::deinit`.
	#[fail(display = "device handle has no bus attached")]
	NullReference,

	#[fail(display = "invalid argument: {}", _0)]
	InvalidArgument(String),

	/// Never produced by this driver: calls on one handle are serialized by
	/// `&mut self`, there is no ready/busy state.
	#[fail(display = "device busy")]
	Busy,

	#[fail(display = "device unresponsive ({}): {}", context, cause)]
	DeviceUnresponsive {
		context: String,
		#[fail(cause)]
		cause: io::Error,
	},
}

impl Error {
	pub(crate) fn invalid_argument<S: Into<String>>(msg: S) -> Self {
		Error::InvalidArgument(msg.into())
	}

	pub(crate) fn unresponsive<S: Into<String>>(context: S, cause: io::Error) -> Self {
		let context = context.into();
		debug!("bus failure ({}): {}", context, cause);
		Error::DeviceUnresponsive { context, cause }
	}
}
