//! Internal utility types.

/// Marker type used when type-erasing the live alternative.
///
/// This zero-sized type serves as the pointee of [`NonNull<Erased>`] when the
/// concrete alternative type is only known through the tag. The vtable looked
/// up from the tag provides the information needed to cast it back.
///
/// Using a distinct marker type (rather than `()` or `u8`) makes it obvious in
/// signatures that the pointee must never be read directly.
///
/// [`NonNull<Erased>`]: core::ptr::NonNull
pub(crate) struct Erased;
