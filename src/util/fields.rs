//! Reading fixed-layout little-endian records.
//!
//! ```ignore
//! fields!(cur, HEADER {
//!     magic: [u8; 4],
//!     width: u16,
//!     offset: u32,
//! });
//! ```
//! declares one local per field, read in order from `cur`, and traces each
//! one with its offset.

macro_rules! field_helper2 {
    ($cur:ident, [u8; $n:expr]) => { $cur.next_n_u8s($n as usize)? };
    ($cur:ident, u8) => { $cur.u8()? };
    ($cur:ident, u16) => { $cur.u16()? };
    ($cur:ident, u32) => { $cur.u32()? };
}

macro_rules! field_helper {
    ($c:ident, $name:ident, $field:ident, $ty:tt) => {
        let pos = $c.pos();
        let $field = field_helper2!($c, $ty);
        trace!("{}.{}@{:#x}: {:?}",
            stringify!($name),
            stringify!($field),
            pos,
            $field,
        );
    }
}

macro_rules! fields {
    ($cur:ident, $name:ident { $($field:ident : $ty:tt,)* }) => {
        $(field_helper!($cur, $name, $field, $ty);)*
    };
    ($cur:ident, $name:ident { $($field:ident : $ty:tt),* }) => {
        fields!($cur, $name { $($field : $ty,)* });
    };
}
