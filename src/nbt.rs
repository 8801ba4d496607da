//! Typed lookups on [`NbtCompound`] children.
//!
//! Numeric getters accept any integer tag whose value fits the target type, so
//! a `Short` written where a `Byte` is expected still reads. A value out of
//! range reads as absent. Required getters turn a missing, mistyped or
//! out-of-range child into a [`ClassicWorldError::Format`] naming the path.

use crate::error::{ClassicWorldError, Result};
use quartz_nbt::{NbtCompound, NbtTag};

fn integer(tag: &NbtTag) -> Option<i64> {
    match tag {
        NbtTag::Byte(v) => Some(*v as i64),
        NbtTag::Short(v) => Some(*v as i64),
        NbtTag::Int(v) => Some(*v as i64),
        NbtTag::Long(v) => Some(*v),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) fn has(compound: &NbtCompound, key: &str) -> bool {
    compound.inner().contains_key(key)
}

pub(crate) fn opt_i64(compound: &NbtCompound, key: &str) -> Option<i64> {
    compound.inner().get(key).and_then(integer)
}

pub(crate) fn opt_i32(compound: &NbtCompound, key: &str) -> Option<i32> {
    opt_i64(compound, key).and_then(|v| i32::try_from(v).ok())
}

pub(crate) fn opt_i16(compound: &NbtCompound, key: &str) -> Option<i16> {
    opt_i64(compound, key).and_then(|v| i16::try_from(v).ok())
}

/// Unsigned byte. A `Byte` tag is reinterpreted, so -1 reads as 255.
pub(crate) fn opt_u8(compound: &NbtCompound, key: &str) -> Option<u8> {
    match compound.inner().get(key)? {
        NbtTag::Byte(v) => Some(*v as u8),
        tag => integer(tag).and_then(|v| u8::try_from(v).ok()),
    }
}

pub(crate) fn opt_string(compound: &NbtCompound, key: &str) -> Option<String> {
    match compound.inner().get(key) {
        Some(NbtTag::String(s)) => Some(s.clone()),
        _ => None,
    }
}

pub(crate) fn opt_bytes(compound: &NbtCompound, key: &str) -> Option<Vec<u8>> {
    match compound.inner().get(key) {
        Some(NbtTag::ByteArray(bytes)) => Some(bytemuck::cast_slice::<i8, u8>(bytes).to_vec()),
        _ => None,
    }
}

/// Detach a byte array from `compound` without copying its contents.
pub(crate) fn take_bytes(compound: &mut NbtCompound, key: &str) -> Option<Vec<u8>> {
    if !matches!(compound.inner().get(key), Some(NbtTag::ByteArray(_))) {
        return None;
    }
    match remove(compound, key) {
        Some(NbtTag::ByteArray(bytes)) => Some(bytemuck::allocation::cast_vec(bytes)),
        _ => None,
    }
}

pub(crate) fn opt_compound<'a>(compound: &'a NbtCompound, key: &str) -> Option<&'a NbtCompound> {
    match compound.inner().get(key) {
        Some(NbtTag::Compound(child)) => Some(child),
        _ => None,
    }
}

fn missing(path: &str, key: &str, kind: &str) -> ClassicWorldError {
    ClassicWorldError::format(format!("{}/{} not found or not a {}", path, key, kind))
}

pub(crate) fn req_i16(compound: &NbtCompound, path: &str, key: &str) -> Result<i16> {
    opt_i16(compound, key).ok_or_else(|| missing(path, key, "16-bit number"))
}

pub(crate) fn req_u8(compound: &NbtCompound, path: &str, key: &str) -> Result<u8> {
    opt_u8(compound, key).ok_or_else(|| missing(path, key, "number in 0..=255"))
}

pub(crate) fn req_string(compound: &NbtCompound, path: &str, key: &str) -> Result<String> {
    opt_string(compound, key).ok_or_else(|| missing(path, key, "string"))
}

pub(crate) fn req_bytes(compound: &NbtCompound, path: &str, key: &str) -> Result<Vec<u8>> {
    opt_bytes(compound, key).ok_or_else(|| missing(path, key, "byte array"))
}

pub(crate) fn req_compound<'a>(
    compound: &'a NbtCompound,
    path: &str,
    key: &str,
) -> Result<&'a NbtCompound> {
    opt_compound(compound, key).ok_or_else(|| missing(path, key, "compound"))
}

pub(crate) fn byte_array(bytes: &[u8]) -> NbtTag {
    NbtTag::ByteArray(bytemuck::cast_slice::<u8, i8>(bytes).to_vec())
}

/// Remove `key` from `compound`. The remaining children keep their relative order.
pub(crate) fn remove(compound: &mut NbtCompound, key: &str) -> Option<NbtTag> {
    compound.inner_mut().shift_remove(key)
}

/// Remove `key` from `compound` only if it holds a compound.
pub(crate) fn take_compound(compound: &mut NbtCompound, key: &str) -> Option<NbtCompound> {
    opt_compound(compound, key)?;
    match remove(compound, key) {
        Some(NbtTag::Compound(child)) => Some(child),
        _ => None,
    }
}
