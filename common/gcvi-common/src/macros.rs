#[macro_export]
macro_rules! define_bit_enum {
    ($name:ident, [$zero:ident, $one:ident]) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Default, ::bincode::Encode, ::bincode::Decode,
        )]
        pub enum $name {
            #[default]
            $zero = 0,
            $one = 1,
        }

        impl $name {
            #[must_use]
            pub fn from_bit(bit: bool) -> Self {
                if bit { Self::$one } else { Self::$zero }
            }

            #[must_use]
            pub fn to_bit(self) -> bool {
                self == Self::$one
            }
        }
    };
}

/// Define a hardware register mirror as a newtype over a plain integer, with a named getter and
/// setter per sub-field.
///
/// Multi-bit fields are declared as `getter / setter: lo..=hi` and operate on the register's own
/// integer type; single-bit flags are declared as `getter / setter: bit` and operate on `bool`.
/// Setters discard value bits that do not fit in the field.
///
/// ```
/// gcvi_common::define_register! {
///     pub struct Example(u16) {
///         fields {
///             low / set_low: 0..=3,
///         }
///         flags {
///             enabled / set_enabled: 15,
///         }
///     }
/// }
///
/// let mut reg = Example(0);
/// reg.set_low(0x1F);
/// reg.set_enabled(true);
/// assert_eq!(reg.0, 0x800F);
/// ```
#[macro_export]
macro_rules! define_register {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident($t:ty) {
            fields {
                $(
                    $(#[$field_attr:meta])*
                    $getter:ident / $setter:ident : $lo:literal ..= $hi:literal
                ),* $(,)?
            }
            flags {
                $(
                    $(#[$flag_attr:meta])*
                    $flag_getter:ident / $flag_setter:ident : $bit:literal
                ),* $(,)?
            }
        }
    ) => {
        $(#[$attr])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Default, ::bincode::Encode, ::bincode::Decode,
        )]
        $vis struct $name(pub $t);

        #[allow(dead_code)]
        impl $name {
            $(
                $(#[$field_attr])*
                #[must_use]
                #[inline]
                pub fn $getter(self) -> $t {
                    $crate::num::GetBit::bits(self.0, $lo..=$hi)
                }

                #[inline]
                pub fn $setter(&mut self, value: $t) {
                    self.0 = $crate::num::GetBit::with_bits(self.0, $lo..=$hi, value);
                }
            )*

            $(
                $(#[$flag_attr])*
                #[must_use]
                #[inline]
                pub fn $flag_getter(self) -> bool {
                    $crate::num::GetBit::bit(self.0, $bit)
                }

                #[inline]
                pub fn $flag_setter(&mut self, value: bool) {
                    self.0 = $crate::num::GetBit::with_bit(self.0, $bit, value);
                }
            )*
        }
    };
}
