// Emits a `tracing` event under the `auth_relay` target; expands to nothing without the feature.
macro_rules! obs_event {
	($level:ident, $($arg:tt)+) => {
		#[cfg(feature = "tracing")]
		{
			::tracing::$level!(target: "auth_relay", $($arg)+);
		}
	};
}
