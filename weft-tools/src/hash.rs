use weft_core::{CodecError, Sink, TypeDescriptor};

/// Multiplier used by [`HashSink::new`].
pub const DEFAULT_PRIME: i64 = 37;

/// Folds every scalar and null marker of a value into one `i64`.
///
/// Each contribution `h` updates the carry as `prime * carry + h`, with
/// wrapping arithmetic. A null marker contributes 0, a present marker
/// nothing; blocks and fields contribute nothing either, so the hash only
/// depends on the sequence of scalars.
#[derive(Debug, Clone)]
pub struct HashSink {
    prime: i64,
    carry: i64,
}

impl HashSink {
    /// A sink with the default prime.
    pub fn new() -> Self {
        Self::with_prime(DEFAULT_PRIME)
    }

    /// A sink combining with `prime`.
    pub fn with_prime(prime: i64) -> Self {
        Self { prime, carry: 1 }
    }

    /// The hash so far.
    pub fn value(&self) -> i64 {
        self.carry
    }

    /// Returns the hash so far and starts over.
    pub fn reset(&mut self) -> i64 {
        std::mem::replace(&mut self.carry, 1)
    }

    fn fold(&mut self, h: i64) -> Result<(), CodecError> {
        self.carry = self.prime.wrapping_mul(self.carry).wrapping_add(h);
        Ok(())
    }
}

impl Default for HashSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Polynomial hash of the UTF-16 code units of `text`, base 31.
fn string_hash(text: &str) -> i64 {
    text.encode_utf16()
        .fold(0_i64, |h, unit| h.wrapping_mul(31).wrapping_add(i64::from(unit)))
}

impl Sink for HashSink {
    fn begin(&mut self, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        Ok(())
    }

    fn end(&mut self, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        Ok(())
    }

    fn begin_nested(
        &mut self,
        _label: &str,
        _ty: &TypeDescriptor,
        _actual: &TypeDescriptor,
    ) -> Result<(), CodecError> {
        Ok(())
    }

    fn end_nested(&mut self, _label: &str, _ty: &TypeDescriptor) -> Result<(), CodecError> {
        Ok(())
    }

    fn put_null(&mut self, _label: &str, is_null: bool) -> Result<(), CodecError> {
        if is_null { self.fold(0) } else { Ok(()) }
    }

    fn put_bool(&mut self, _label: &str, value: bool) -> Result<(), CodecError> {
        self.fold(i64::from(value))
    }

    fn put_i8(&mut self, _label: &str, value: i8) -> Result<(), CodecError> {
        self.fold(i64::from(value))
    }

    fn put_i16(&mut self, _label: &str, value: i16) -> Result<(), CodecError> {
        self.fold(i64::from(value))
    }

    fn put_i32(&mut self, _label: &str, value: i32) -> Result<(), CodecError> {
        self.fold(i64::from(value))
    }

    fn put_i64(&mut self, _label: &str, value: i64) -> Result<(), CodecError> {
        self.fold(value)
    }

    fn put_f32(&mut self, _label: &str, value: f32) -> Result<(), CodecError> {
        self.fold(i64::from(value.to_bits()))
    }

    fn put_f64(&mut self, _label: &str, value: f64) -> Result<(), CodecError> {
        self.fold(value.to_bits() as i64)
    }

    fn put_char(&mut self, _label: &str, value: char) -> Result<(), CodecError> {
        self.fold(i64::from(u32::from(value)))
    }

    fn put_unit(&mut self, _label: &str) -> Result<(), CodecError> {
        self.fold(0)
    }

    fn put_str(&mut self, _label: &str, value: &str) -> Result<(), CodecError> {
        self.fold(string_hash(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_hash_is_polynomial() {
        assert_eq!(string_hash(""), 0);
        assert_eq!(string_hash("a"), 97);
        assert_eq!(string_hash("ab"), 97 * 31 + 98);
    }

    #[test]
    fn reset_starts_over() {
        let mut sink = HashSink::with_prime(31);
        sink.put_i32("it", 2).unwrap();
        assert_eq!(sink.reset(), 33);
        assert_eq!(sink.value(), 1);
    }
}
