#[cfg(feature = "tracing")]
macro_rules! swtrace {
    ($($tt:tt)*) => {
        tracing::trace!(target: "scrollwise_adapter", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! swtrace {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! swdebug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "scrollwise_adapter", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! swdebug {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! swinfo {
    ($($tt:tt)*) => {
        tracing::info!(target: "scrollwise_adapter", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! swinfo {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! swwarn {
    ($($tt:tt)*) => {
        tracing::warn!(target: "scrollwise_adapter", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! swwarn {
    ($($tt:tt)*) => {};
}
