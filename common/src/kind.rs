//! Macros for defining kind enums.

/// Macro for defining a kind enum.
///
/// The defined enum is [`Display`]ed and parsed in `SCREAMING_SNAKE_CASE`.
///
/// # Example
///
/// ```rust
/// common::define_kind! {
///     #[doc = "Shape kind."]
///     enum Kind {
///         #[doc = "A cube"]
///         Cube = 1,
///
///         #[doc = "A sphere"]
///         Sphere = 2,
///     }
/// }
///
/// assert_eq!(Kind::Cube.to_string(), "CUBE");
/// assert_eq!("SPHERE".parse::<Kind>().unwrap(), Kind::Sphere);
/// ```
///
/// [`Display`]: std::fmt::Display
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::EnumString,
            Eq,
            Hash,
            PartialEq,
        )]
        #[doc = $doc]
        #[repr(u8)]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $(
                 #[doc = $variant_doc]
                 $variant = $value,
            )*
        }

        impl $name {
            /// Converts this into its [`u8`] representation.
            #[must_use]
            pub const fn u8(self) -> u8 {
                self as u8
            }
        }
    };
}
