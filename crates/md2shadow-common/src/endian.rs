// endian.rs — byte order normalization for model file data
//
// MD2 files are little-endian throughout. These are identity on LE hosts and
// byte-swap on BE hosts. Every field is converted individually by the loader.

// ============================================================
// Little-endian to native
// ============================================================

#[inline]
pub fn little_short(s: i16) -> i16 {
    i16::from_le(s)
}

#[inline]
pub fn little_ushort(s: u16) -> u16 {
    u16::from_le(s)
}

#[inline]
pub fn little_long(l: i32) -> i32 {
    i32::from_le(l)
}

#[inline]
pub fn little_ulong(l: u32) -> u32 {
    u32::from_le(l)
}

#[inline]
pub fn little_float(f: f32) -> f32 {
    f32::from_bits(u32::from_le(f.to_bits()))
}

// ============================================================
// Big-endian to native
// ============================================================

#[inline]
pub fn big_short(s: i16) -> i16 {
    i16::from_be(s)
}

#[inline]
pub fn big_long(l: i32) -> i32 {
    i32::from_be(l)
}

#[inline]
pub fn big_float(f: f32) -> f32 {
    f32::from_bits(u32::from_be(f.to_bits()))
}

// ============================================================
// Raw slice readers
// ============================================================

/// Read a little-endian i32 at `offset`. Returns `None` past the end of `data`.
pub fn read_i32_le(data: &[u8], offset: usize) -> Option<i32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(little_long(i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])))
}
