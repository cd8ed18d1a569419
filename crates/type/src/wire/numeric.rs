// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};

use super::expect_len;
use crate::{Error, Result};

/// `{ u8 precision, i8 scale, u8 sign, [u8; 16] magnitude }`. `sign` is 1 for positive and 0 for
/// negative; the magnitude is an unsigned little-endian integer scaled by `10^scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumericStruct {
	pub precision: u8,
	pub scale: i8,
	pub sign: u8,
	pub magnitude: [u8; 16],
}

impl NumericStruct {
	pub const SIZE: usize = 19;

	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		expect_len(bytes, Self::SIZE, "numeric")?;
		let mut magnitude = [0u8; 16];
		magnitude.copy_from_slice(&bytes[3..19]);
		Ok(Self {
			precision: bytes[0],
			scale: bytes[1] as i8,
			sign: bytes[2],
			magnitude,
		})
	}

	pub fn to_bytes(&self) -> [u8; Self::SIZE] {
		let mut out = [0u8; Self::SIZE];
		out[0] = self.precision;
		out[1] = self.scale as u8;
		out[2] = self.sign;
		out[3..].copy_from_slice(&self.magnitude);
		out
	}

	/// Interprets the struct using `scale`, the column's declared scale. The struct's own scale
	/// byte is not trusted since hosts commonly leave it zero for parameters.
	pub fn to_decimal(&self, scale: i8) -> BigDecimal {
		let magnitude = BigInt::from(u128::from_le_bytes(self.magnitude));
		let unscaled = if self.sign == 0 {
			-magnitude
		} else {
			magnitude
		};
		BigDecimal::new(unscaled, scale as i64)
	}

	/// Rescales `value` to `scale` (extra fractional digits are dropped) and checks that the result
	/// fits in `precision` digits.
	pub fn from_decimal(value: &BigDecimal, precision: u8, scale: i8) -> Result<Self> {
		let (unscaled, _) = value.with_scale(scale as i64).into_bigint_and_exponent();
		let magnitude = unscaled
			.magnitude()
			.to_u128()
			.ok_or_else(|| Error::unsupported(format!("decimal {value} exceeds 128 bits")))?;

		let digits = digit_count(magnitude);
		if digits > precision as u32 {
			return Err(Error::unsupported(format!(
				"decimal {value} needs {digits} digits, precision is {precision}"
			)));
		}

		Ok(Self {
			precision,
			scale,
			sign: if unscaled.sign() == Sign::Minus {
				0
			} else {
				1
			},
			magnitude: magnitude.to_le_bytes(),
		})
	}
}

/// Number of decimal digits in `value`; zero has one digit.
pub fn digit_count(value: u128) -> u32 {
	if value.is_zero() {
		1
	} else {
		value.ilog10() + 1
	}
}

#[cfg(test)]
pub mod tests {
	use std::str::FromStr;

	use super::*;

	#[test]
	fn test_positive_value() {
		let d = BigDecimal::from_str("1234.56").unwrap();
		let s = NumericStruct::from_decimal(&d, 10, 2).unwrap();
		assert_eq!(s.sign, 1);
		assert_eq!(u128::from_le_bytes(s.magnitude), 123456);
		assert_eq!(s.to_decimal(2), d);
	}

	#[test]
	fn test_negative_value_uses_sign_byte() {
		let d = BigDecimal::from_str("-0.5").unwrap();
		let s = NumericStruct::from_decimal(&d, 5, 3).unwrap();
		assert_eq!(s.sign, 0);
		assert_eq!(u128::from_le_bytes(s.magnitude), 500);
		assert_eq!(s.to_decimal(3), d);
	}

	#[test]
	fn test_bytes_layout() {
		let s = NumericStruct {
			precision: 5,
			scale: 2,
			sign: 1,
			magnitude: 300u128.to_le_bytes(),
		};
		let bytes = s.to_bytes();
		assert_eq!(&bytes[..5], &[5, 2, 1, 0x2c, 0x01]);
		assert_eq!(NumericStruct::from_bytes(&bytes).unwrap(), s);
	}

	#[test]
	fn test_precision_overflow() {
		let d = BigDecimal::from_str("123456").unwrap();
		let err = NumericStruct::from_decimal(&d, 4, 0).unwrap_err();
		assert!(err.to_string().contains("precision is 4"));
	}

	#[test]
	fn test_digit_count() {
		assert_eq!(digit_count(0), 1);
		assert_eq!(digit_count(9), 1);
		assert_eq!(digit_count(10), 2);
		assert_eq!(digit_count(u128::MAX), 39);
	}
}
