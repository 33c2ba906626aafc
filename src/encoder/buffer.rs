//! Output buffer growth.

use bytes::BytesMut;

/// Extend `buf` by `extra` zeroed bytes and return the index where the new
/// region begins.
///
/// Already-written bytes are untouched; `BytesMut` reallocates
/// geometrically underneath, so repeated small grows stay amortized O(1).
/// Callers grow by a worst-case bound, write into the region, then
/// `truncate` back to the exact length.
#[inline]
pub(crate) fn grow(buf: &mut BytesMut, extra: usize) -> usize {
    let start = buf.len();
    buf.resize(start + extra, 0);
    start
}
