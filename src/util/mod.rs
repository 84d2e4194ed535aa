//! More-or-less general-purpose utility functions.

#[macro_use]
pub mod fields;
pub mod cur;
pub mod fixed;
pub mod out_file;
pub mod transform;
pub mod tree;

/// Defines a fieldless enum whose variants are spelled a particular way in
/// scene files and output documents.
macro_rules! string_enum {
    ($(#[$meta:meta])* pub enum $name:ident { $($variant:ident => $s:tt),* $(,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $s),*
                }
            }

            pub fn from_str(s: &str) -> Option<$name> {
                match s {
                    $($s => Some($name::$variant),)*
                    _ => None,
                }
            }

            /// All the spellings, for error messages.
            pub fn choices() -> &'static [&'static str] {
                &[$($s),*]
            }
        }
    };
}
