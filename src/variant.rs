use core::{any::type_name, fmt};

use oneof_internals::RawVariant;
use rootcause::Report;

use crate::{
    At, CloneList, Index, InvalidReason, Nth, State, TypeList,
    error::{Held, InvalidVariant, TypeMismatch, VariantType},
    hooks::poison::{self, PoisonEvent},
    resolve::{Convert, Member},
    visit::{Arms, ArmsMut, DebugList, VisitAll, VisitAllMut, Visitor, VisitorMut},
};

/// A value of exactly one of the alternatives `L`, or a record of why there
/// is none.
///
/// `L` is a type-level list of alternatives, written with the [`types!`]
/// macro. The value is stored inline, in storage as large as the largest
/// alternative, next to a tag naming the live alternative.
///
/// # Poisoning
///
/// A variant is *valid* when it holds a value. It becomes *poisoned*, holding
/// no value and an [`InvalidReason`] instead, when:
///
/// - it was produced by [`Clone::clone`] and the live alternative's clone
///   panicked ([`InvalidReason::CopyThrew`], `std` feature only)
/// - its contents were moved out with [`Variant::take`]
///   ([`InvalidReason::MovedFrom`])
/// - it was cloned or taken from a variant that was already poisoned (same
///   reason as the source)
///
/// A poisoned variant reports its state through [`Variant::state`] and is
/// dropped without running any destructor. Dispatching on it with
/// [`Variant::apply`] or [`Variant::match_with`] returns an
/// [`InvalidVariant`] error, unless a handler for the poisoned state was
/// supplied.
///
/// # Examples
///
/// ```
/// use oneof::{InvalidReason, State, Variant, arms, types};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Thing {
///     number: i32,
///     letter: char,
/// }
///
/// type Value = Variant<types![String, i32, Thing]>;
///
/// let mut value: Value = Variant::new(Thing {
///     number: 5,
///     letter: 'a',
/// });
/// assert_eq!(value.which(), 2);
/// assert!(value.contains::<Thing>());
///
/// let moved = value.take();
/// assert_eq!(value.state(), State::Invalid(InvalidReason::MovedFrom));
///
/// let text = moved.match_with(arms![
///     |s: &String| format!("string:{s}"),
///     |i: &i32| format!("int:{i}"),
///     |t: &Thing| format!("thing:{},{}", t.number, t.letter),
/// ]);
/// assert_eq!(text.unwrap(), "thing:5,a");
/// ```
pub struct Variant<L: TypeList> {
    /// The tag and storage
    raw: RawVariant<L>,
}

impl<L: TypeList> Variant<L> {
    /// Creates a variant holding `value`.
    ///
    /// The type of `value` must be one of the alternatives. If it is declared
    /// more than once, use [`Variant::at`] to pick the position.
    ///
    /// # Examples
    ///
    /// ```
    /// use oneof::{Variant, types};
    ///
    /// let variant: Variant<types![String, i32]> = Variant::new(7i32);
    /// assert_eq!(variant.which(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub fn new<T, I>(value: T) -> Self
    where
        T: 'static,
        I: Index,
        L: Member<T, I>,
    {
        Self {
            raw: RawVariant::new::<I, T>(value),
        }
    }

    /// Creates a variant holding the alternative built from `arg` with
    /// [`From`].
    ///
    /// Exactly one alternative must implement `From<A>`, counting the
    /// reflexive `From<T> for T`. Otherwise the call does not compile, and the
    /// alternative must be named with [`Variant::construct`].
    ///
    /// # Examples
    ///
    /// ```
    /// use oneof::{Variant, types};
    ///
    /// let variant: Variant<types![String, i32]> = Variant::convert("Hello");
    /// assert_eq!(variant.get::<String>().unwrap(), "Hello");
    /// ```
    #[inline]
    #[must_use]
    pub fn convert<A, I>(arg: A) -> Self
    where
        I: Index,
        L: Convert<A, I>,
    {
        Self {
            raw: RawVariant::new::<I, Nth<L, I>>(L::convert(arg)),
        }
    }

    /// Creates a variant holding the alternative `T`, built from `arg`.
    ///
    /// Unlike [`Variant::convert`], this never picks a different alternative
    /// than the one named, even if several could be built from `arg`.
    ///
    /// # Examples
    ///
    /// ```
    /// use oneof::{Variant, types};
    ///
    /// let variant: Variant<types![i64, f64]> = Variant::construct::<f64, _>(3i32);
    /// assert_eq!(variant.get::<f64>().ok(), Some(&3.0));
    /// ```
    ///
    /// A type declared more than once cannot be named here, since its
    /// position is ambiguous:
    ///
    /// ```compile_fail
    /// use oneof::{Variant, types};
    ///
    /// let variant: Variant<types![u32, u32]> = Variant::construct::<u32, _>(1u32);
    /// ```
    ///
    /// Pick the position with [`Variant::at`] instead:
    ///
    /// ```
    /// use oneof::{Here, Variant, types};
    ///
    /// type Pair = Variant<types![u32, u32]>;
    ///
    /// let variant = Pair::at::<Here>(1);
    /// assert_eq!(variant.which(), 0);
    /// ```
    #[inline]
    #[must_use]
    pub fn construct<T, I>(arg: impl Into<T>) -> Self
    where
        T: 'static,
        I: Index,
        L: Member<T, I>,
    {
        Self {
            raw: RawVariant::new::<I, T>(arg.into()),
        }
    }

    /// Creates a variant holding `value` as the alternative at position `I`.
    ///
    /// This is the only way to pick between alternatives of the same type.
    ///
    /// # Examples
    ///
    /// ```
    /// use oneof::{Here, There, Variant, types};
    ///
    /// type Range = Variant<types![u32, u32]>;
    ///
    /// let start = Range::at::<Here>(1);
    /// let end = Range::at::<There<Here>>(9);
    /// assert_eq!((start.which(), end.which()), (0, 1));
    /// ```
    #[inline]
    #[must_use]
    pub fn at<I>(value: Nth<L, I>) -> Self
    where
        I: Index,
        L: At<I>,
    {
        Self {
            raw: RawVariant::new::<I, Nth<L, I>>(value),
        }
    }

    /// Creates a variant that is poisoned with `reason`.
    #[inline]
    #[must_use]
    pub fn poisoned(reason: InvalidReason) -> Self {
        Self {
            raw: RawVariant::poisoned(reason),
        }
    }

    /// Returns the raw tag.
    ///
    /// Values below `L::LEN` are the position of the live alternative. Values
    /// from `L::LEN` up encode the [`InvalidReason`]; see [`State`] for the
    /// decoded form.
    #[inline]
    pub fn which(&self) -> usize {
        self.raw.tag()
    }

    /// Returns the decoded tag.
    #[inline]
    pub fn state(&self) -> State {
        self.raw.state()
    }

    /// Returns `true` if the variant holds a value.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.raw.is_valid()
    }

    /// Returns why the variant holds no value, or `None` if it holds one.
    #[inline]
    pub fn invalid_reason(&self) -> Option<InvalidReason> {
        self.raw.state().invalid_reason()
    }

    /// Returns `true` if the live alternative is the first alternative of
    /// type `T`.
    ///
    /// For types declared more than once, only the first position counts.
    #[inline]
    pub fn contains<T: 'static>(&self) -> bool {
        L::index_of::<T>() == Some(self.raw.tag())
    }

    /// Returns the [`core::any::type_name`] of the live alternative.
    #[inline]
    pub fn type_name(&self) -> Option<&'static str> {
        self.raw.type_name()
    }

    /// Returns a reference to the value if [`Variant::contains::<T>`] holds.
    ///
    /// Fails with a [`TypeMismatch`] otherwise. The variant is not modified
    /// either way.
    ///
    /// [`Variant::contains::<T>`]: Variant::contains
    ///
    /// # Examples
    ///
    /// ```
    /// use oneof::{Variant, types};
    ///
    /// let variant: Variant<types![String, i32]> = Variant::new(7i32);
    /// assert_eq!(variant.get::<i32>().ok(), Some(&7));
    ///
    /// let error = variant.get::<String>().unwrap_err();
    /// assert_eq!(
    ///     error.current_context().requested,
    ///     std::any::type_name::<String>()
    /// );
    /// ```
    #[track_caller]
    pub fn get<T: 'static>(&self) -> Result<&T, Report<TypeMismatch>> {
        if !self.contains::<T>() {
            return Err(self.mismatch::<T>());
        }

        // SAFETY:
        // 1. `contains` checked that the tag is the position of `T`, so the live value
        //    is a `T`
        let value = unsafe { self.raw.downcast_unchecked::<T>() };
        Ok(value)
    }

    /// Returns a mutable reference to the value if [`Variant::contains::<T>`]
    /// holds.
    ///
    /// [`Variant::contains::<T>`]: Variant::contains
    #[track_caller]
    pub fn get_mut<T: 'static>(&mut self) -> Result<&mut T, Report<TypeMismatch>> {
        if !self.contains::<T>() {
            return Err(self.mismatch::<T>());
        }

        // SAFETY:
        // 1. `contains` checked that the tag is the position of `T`, so the live value
        //    is a `T`
        let value = unsafe { self.raw.downcast_unchecked_mut::<T>() };
        Ok(value)
    }

    /// Returns a reference to the value if the live alternative is the one at
    /// position `I`.
    #[track_caller]
    pub fn get_at<I>(&self) -> Result<&Nth<L, I>, Report<TypeMismatch>>
    where
        I: Index,
        L: At<I>,
    {
        if self.raw.tag() != I::VALUE {
            return Err(self.mismatch::<Nth<L, I>>());
        }

        // SAFETY:
        // 1. The tag is `I::VALUE`, so the live value is the alternative at `I`
        let value = unsafe { self.raw.downcast_unchecked::<Nth<L, I>>() };
        Ok(value)
    }

    /// Returns a mutable reference to the value if the live alternative is the
    /// one at position `I`.
    #[track_caller]
    pub fn get_at_mut<I>(&mut self) -> Result<&mut Nth<L, I>, Report<TypeMismatch>>
    where
        I: Index,
        L: At<I>,
    {
        if self.raw.tag() != I::VALUE {
            return Err(self.mismatch::<Nth<L, I>>());
        }

        // SAFETY:
        // 1. The tag is `I::VALUE`, so the live value is the alternative at `I`
        let value = unsafe { self.raw.downcast_unchecked_mut::<Nth<L, I>>() };
        Ok(value)
    }

    /// Returns a reference to the value as a `T` without checking the tag.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The variant is valid and its live alternative has type `T`.
    #[inline]
    pub unsafe fn get_unchecked<T: 'static>(&self) -> &T {
        // SAFETY:
        // 1. Guaranteed by the caller
        unsafe { self.raw.downcast_unchecked::<T>() }
    }

    /// Returns a mutable reference to the value as a `T` without checking the
    /// tag.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The variant is valid and its live alternative has type `T`.
    #[inline]
    pub unsafe fn get_unchecked_mut<T: 'static>(&mut self) -> &mut T {
        // SAFETY:
        // 1. Guaranteed by the caller
        unsafe { self.raw.downcast_unchecked_mut::<T>() }
    }

    /// Moves the value out if [`Variant::contains::<T>`] holds, or gives the
    /// variant back.
    ///
    /// [`Variant::contains::<T>`]: Variant::contains
    pub fn into_inner<T: 'static>(mut self) -> Result<T, Self> {
        if !self.contains::<T>() {
            return Err(self);
        }
        self.raw.take_value::<T>().ok_or(self)
    }

    /// Moves the value out if the live alternative is the one at position
    /// `I`, or gives the variant back.
    pub fn into_at<I>(mut self) -> Result<Nth<L, I>, Self>
    where
        I: Index,
        L: At<I>,
    {
        if self.raw.tag() != I::VALUE {
            return Err(self);
        }
        self.raw.take_value::<Nth<L, I>>().ok_or(self)
    }

    /// Moves the contents into a new variant, leaving this one poisoned with
    /// [`InvalidReason::MovedFrom`].
    ///
    /// If this variant is already poisoned, the returned one is poisoned with
    /// the same reason.
    ///
    /// # Examples
    ///
    /// ```
    /// use oneof::{InvalidReason, Variant, types};
    ///
    /// let mut first: Variant<types![String, i32]> = Variant::new(7i32);
    /// let second = first.take();
    /// let third = first.take();
    ///
    /// assert_eq!(second.get::<i32>().ok(), Some(&7));
    /// assert_eq!(first.invalid_reason(), Some(InvalidReason::MovedFrom));
    /// assert_eq!(third.invalid_reason(), Some(InvalidReason::MovedFrom));
    /// ```
    pub fn take(&mut self) -> Self {
        let state = self.raw.state();
        let alternative = self.raw.type_name();
        let moved = Self {
            raw: self.raw.take(),
        };

        Self::notify(InvalidReason::MovedFrom, alternative, false);
        if let State::Invalid(reason) = state {
            Self::notify(reason, None, true);
        }
        moved
    }

    /// Replaces the contents with those of `source`, leaving `source`
    /// poisoned with [`InvalidReason::MovedFrom`].
    ///
    /// The current value is dropped first, even when `source` holds the same
    /// alternative.
    pub fn move_from(&mut self, source: &mut Self) {
        self.raw.destroy();
        *self = source.take();
    }

    /// Calls `visitor` with a reference to the value.
    ///
    /// Fails with an [`InvalidVariant`] if the variant is poisoned. See
    /// [`Variant::apply_or_recover`] to handle that case with the visitor.
    #[track_caller]
    pub fn apply<V, R>(&self, visitor: V) -> Result<R, Report<InvalidVariant>>
    where
        V: VisitAll<L, R>,
    {
        let index = match self.raw.state() {
            State::Valid(index) => index,
            State::Invalid(reason) => return Err(Self::invalid(reason)),
        };

        // SAFETY:
        // 1. The tag is valid, so the storage holds the alternative at `index`
        let result =
            unsafe { <V as VisitAll<L, R>>::visit_at(visitor, index, self.raw.as_erased()) };
        match result {
            Ok(value) => Ok(value),
            Err(_) => Err(Self::invalid(InvalidReason::Unknown)),
        }
    }

    /// Calls `visitor` with a mutable reference to the value.
    ///
    /// Fails with an [`InvalidVariant`] if the variant is poisoned.
    #[track_caller]
    pub fn apply_mut<V, R>(&mut self, visitor: V) -> Result<R, Report<InvalidVariant>>
    where
        V: VisitAllMut<L, R>,
    {
        let index = match self.raw.state() {
            State::Valid(index) => index,
            State::Invalid(reason) => return Err(Self::invalid(reason)),
        };

        // SAFETY:
        // 1. The tag is valid, so the storage holds the alternative at `index`
        let result = unsafe {
            <V as VisitAllMut<L, R>>::visit_at_mut(visitor, index, self.raw.as_erased_mut())
        };
        match result {
            Ok(value) => Ok(value),
            Err(_) => Err(Self::invalid(InvalidReason::Unknown)),
        }
    }

    /// Calls `visitor` with a reference to the value, or with the
    /// [`InvalidReason`] if the variant is poisoned.
    ///
    /// # Examples
    ///
    /// ```
    /// use oneof::{InvalidReason, Variant, Visitor, types};
    ///
    /// struct Describe;
    ///
    /// impl Visitor<u8> for Describe {
    ///     type Output = String;
    ///
    ///     fn visit(self, value: &u8) -> String {
    ///         format!("byte {value}")
    ///     }
    /// }
    ///
    /// impl Visitor<InvalidReason> for Describe {
    ///     type Output = String;
    ///
    ///     fn visit(self, reason: &InvalidReason) -> String {
    ///         format!("nothing: {reason:?}")
    ///     }
    /// }
    ///
    /// let mut variant: Variant<types![u8]> = Variant::new(3u8);
    /// assert_eq!(variant.apply_or_recover(Describe), "byte 3");
    ///
    /// let _moved = variant.take();
    /// assert_eq!(variant.apply_or_recover(Describe), "nothing: MovedFrom");
    /// ```
    pub fn apply_or_recover<V, R>(&self, visitor: V) -> R
    where
        V: VisitAll<L, R> + Visitor<InvalidReason, Output = R>,
    {
        let visitor = match self.raw.state() {
            State::Valid(index) => {
                // SAFETY:
                // 1. The tag is valid, so the storage holds the alternative at `index`
                let result = unsafe {
                    <V as VisitAll<L, R>>::visit_at(visitor, index, self.raw.as_erased())
                };
                match result {
                    Ok(value) => return value,
                    Err(visitor) => visitor,
                }
            }
            State::Invalid(_) => visitor,
        };

        let reason = self.invalid_reason().unwrap_or(InvalidReason::Unknown);
        <V as Visitor<InvalidReason>>::visit(visitor, &reason)
    }

    /// Calls `visitor` with a mutable reference to the value, or with the
    /// [`InvalidReason`] if the variant is poisoned.
    pub fn apply_mut_or_recover<V, R>(&mut self, visitor: V) -> R
    where
        V: VisitAllMut<L, R> + VisitorMut<InvalidReason, Output = R>,
    {
        let visitor = match self.raw.state() {
            State::Valid(index) => {
                // SAFETY:
                // 1. The tag is valid, so the storage holds the alternative at `index`
                let result = unsafe {
                    <V as VisitAllMut<L, R>>::visit_at_mut(visitor, index, self.raw.as_erased_mut())
                };
                match result {
                    Ok(value) => return value,
                    Err(visitor) => visitor,
                }
            }
            State::Invalid(_) => visitor,
        };

        let mut reason = self.invalid_reason().unwrap_or(InvalidReason::Unknown);
        <V as VisitorMut<InvalidReason>>::visit_mut(visitor, &mut reason)
    }

    /// Calls the arm matching the live alternative with a reference to the
    /// value.
    ///
    /// `arms` is built with [`arms!`] and holds one closure per alternative,
    /// in declaration order. With exactly that many arms, a poisoned variant
    /// produces an [`InvalidVariant`] error. With one extra trailing arm
    /// taking an [`InvalidReason`], that arm handles the poisoned state and
    /// the result is returned directly.
    ///
    /// # Examples
    ///
    /// ```
    /// use oneof::{InvalidReason, Variant, arms, types};
    ///
    /// let variant: Variant<types![String, i32]> = Variant::new(7i32);
    ///
    /// let checked = variant.match_with(arms![
    ///     |s: &String| s.len() as i64,
    ///     |i: &i32| i64::from(*i),
    /// ]);
    /// assert_eq!(checked.unwrap(), 7);
    ///
    /// let recovered = variant.match_with(arms![
    ///     |s: &String| s.len() as i64,
    ///     |i: &i32| i64::from(*i),
    ///     |_: InvalidReason| -1,
    /// ]);
    /// assert_eq!(recovered, 7);
    /// ```
    #[track_caller]
    pub fn match_with<A, R>(&self, arms: A) -> A::Output
    where
        A: Arms<L, R>,
    {
        // SAFETY:
        // 1. The state is decoded from this variant's tag, so if it names a position
        //    the storage holds the alternative at that position
        unsafe { <A as Arms<L, R>>::dispatch(arms, self.raw.state(), self.raw.as_erased()) }
    }

    /// Calls the arm matching the live alternative with a mutable reference to
    /// the value.
    ///
    /// The arms follow the same rules as for [`Variant::match_with`].
    #[track_caller]
    pub fn match_with_mut<A, R>(&mut self, arms: A) -> A::Output
    where
        A: ArmsMut<L, R>,
    {
        let state = self.raw.state();
        // SAFETY:
        // 1. The state is decoded from this variant's tag, so if it names a position
        //    the storage holds the alternative at that position
        unsafe { <A as ArmsMut<L, R>>::dispatch_mut(arms, state, self.raw.as_erased_mut()) }
    }

    /// Builds the error for reading a poisoned variant.
    #[track_caller]
    #[cold]
    fn invalid(reason: InvalidReason) -> Report<InvalidVariant> {
        Report::new(InvalidVariant { reason }).attach(VariantType(type_name::<Self>()))
    }

    /// Builds the error for requesting an alternative `T` that is not live.
    #[track_caller]
    #[cold]
    fn mismatch<T: 'static>(&self) -> Report<TypeMismatch> {
        let held = match self.raw.state() {
            State::Valid(index) => Held::Alternative {
                index,
                name: self.raw.type_name().unwrap_or("<unknown>"),
            },
            State::Invalid(reason) => Held::Invalid(reason),
        };

        Report::new(TypeMismatch {
            requested: type_name::<T>(),
            held,
        })
        .attach(VariantType(type_name::<Self>()))
    }

    /// Tells the poison hooks that a variant of this type was poisoned.
    fn notify(reason: InvalidReason, alternative: Option<&'static str>, propagated: bool) {
        poison::notify(PoisonEvent {
            reason,
            variant: type_name::<Self>(),
            alternative,
            propagated,
        });
    }
}

impl<L: CloneList> Clone for Variant<L> {
    /// Clones the live value into a new variant.
    ///
    /// If the value's [`Clone`] implementation panics, the panic is caught and
    /// the new variant is poisoned with [`InvalidReason::CopyThrew`] (`std`
    /// feature only). A poisoned variant clones into one with the same reason.
    /// `self` is never modified.
    fn clone(&self) -> Self {
        match self.raw.state() {
            State::Valid(_) => match clone_catching_panics(&self.raw) {
                Some(raw) => Self { raw },
                None => {
                    Self::notify(InvalidReason::CopyThrew, self.raw.type_name(), false);
                    Self::poisoned(InvalidReason::CopyThrew)
                }
            },
            State::Invalid(reason) => {
                let raw = self.raw.clone();
                Self::notify(reason, None, true);
                Self { raw }
            }
        }
    }

    /// Drops the current value, then clones `source` into `self`.
    fn clone_from(&mut self, source: &Self) {
        self.raw.destroy();
        *self = source.clone();
    }
}

/// Clones `raw`, returning `None` if the live value's clone panicked.
#[cfg(feature = "std")]
fn clone_catching_panics<L: CloneList>(raw: &RawVariant<L>) -> Option<RawVariant<L>> {
    std::panic::catch_unwind(core::panic::AssertUnwindSafe(|| raw.clone())).ok()
}

/// Clones `raw`. Without `std` a panicking clone unwinds through the caller.
#[cfg(not(feature = "std"))]
fn clone_catching_panics<L: CloneList>(raw: &RawVariant<L>) -> Option<RawVariant<L>> {
    Some(raw.clone())
}

impl<L: DebugList> fmt::Debug for Variant<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.raw.state() {
            State::Valid(index) => {
                f.write_str("Variant(")?;
                // SAFETY:
                // 1. The tag is valid, so the storage holds the alternative at `index`
                unsafe {
                    L::debug_at(index, self.raw.as_erased(), f)?;
                }
                f.write_str(")")
            }
            State::Invalid(reason) => write!(f, "Variant(<invalid: {reason:?}>)"),
        }
    }
}
