/// Builds the type-level list of alternatives of a [`Variant`].
///
/// `types![A, B, C]` expands to `HCons<A, HCons<B, HCons<C, HNil>>>`.
///
/// # Examples
///
/// ```
/// use oneof::{HCons, HNil, TypeList, types};
///
/// type Alternatives = types![String, i32, (u8, char)];
/// assert_eq!(Alternatives::LEN, 3);
///
/// static_assertions::assert_type_eq_all!(
///     types![String, i32],
///     HCons<String, HCons<i32, HNil>>
/// );
/// ```
///
/// [`Variant`]: crate::Variant
#[macro_export]
macro_rules! types {
    () => {
        $crate::HNil
    };
    ($head:ty $(, $tail:ty)* $(,)?) => {
        $crate::HCons<$head, $crate::types![$($tail),*]>
    };
}

/// Builds the list of arms for [`Variant::match_with`] and
/// [`Variant::match_with_mut`].
///
/// The arms are matched to alternatives by position. Pass exactly one arm per
/// alternative to get a [`Result`] back, or one extra trailing arm taking an
/// [`InvalidReason`] to handle the poisoned state yourself.
///
/// Closure parameters must be annotated, as in `|s: &String| ...`.
///
/// # Examples
///
/// ```
/// use oneof::{InvalidReason, Variant, arms, types};
///
/// let mut variant: Variant<types![String, i32]> = Variant::new(5i32);
/// let _moved = variant.take();
///
/// let message = variant.match_with(arms![
///     |s: &String| s.clone(),
///     |i: &i32| i.to_string(),
///     |reason: InvalidReason| reason.to_string(),
/// ]);
/// assert_eq!(message, "variant is invalid because its value was moved out");
/// ```
///
/// [`Variant::match_with`]: crate::Variant::match_with
/// [`Variant::match_with_mut`]: crate::Variant::match_with_mut
/// [`InvalidReason`]: crate::InvalidReason
#[macro_export]
macro_rules! arms {
    () => {
        $crate::HNil
    };
    ($head:expr $(, $tail:expr)* $(,)?) => {
        $crate::HCons {
            head: $head,
            tail: $crate::arms![$($tail),*],
        }
    };
}
