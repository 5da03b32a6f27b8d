// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Logging macros that forward to `tracing` when the `tracing` feature is
//! enabled, and expand to nothing otherwise.

#[cfg(feature = "tracing")]
#[allow(unused)]
pub use tracing::{debug, error, info, instrument, trace, warn};

#[cfg(not(feature = "tracing"))]
#[allow(unused)]
pub use jpegdec_macros::noop as instrument;

#[cfg(not(feature = "tracing"))]
macro_rules! __noop_log {
    ($($t:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[allow(unused)]
pub(crate) use {
    __noop_log as debug, __noop_log as error, __noop_log as info, __noop_log as trace,
    __noop_log as warn,
};
