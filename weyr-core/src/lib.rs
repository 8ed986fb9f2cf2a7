//! Weyr Core - Fundamental types
//!
//! This crate provides the core types used throughout Weyr:
//! - `Rational`: Exact arbitrary precision rational numbers
//! - `Value`: Runtime values (numbers, text, objects, errors)
//! - `WeyrError`: Structured errors with machine-readable codes

mod number;
mod value;
mod error;

pub use number::{Rational, NumberError};
pub use value::Value;
pub use error::{WeyrError, Severity, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Rational, Value, WeyrError, Severity};
    pub use crate::error::codes;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod number_tests {
        use super::*;

        #[test]
        fn test_from_i64() {
            let n = Rational::from_i64(42);
            assert_eq!(n.to_i64(), Some(42));
            assert!(n.is_integer());
        }

        #[test]
        fn test_from_str_integer() {
            let n = Rational::from_str("-123").unwrap();
            assert_eq!(n.to_i64(), Some(-123));
        }

        #[test]
        fn test_from_str_fraction_is_reduced() {
            let n = Rational::from_str("-2/4").unwrap();
            assert!(!n.is_integer());
            assert_eq!(n, Rational::from_ratio(-1, 2).unwrap());
            assert_eq!(n.to_string(), "-1/2");
        }

        #[test]
        fn test_from_str_decimal() {
            let n = Rational::from_str("0.25").unwrap();
            assert_eq!(n, Rational::from_ratio(1, 4).unwrap());

            let m = Rational::from_str("-1.5").unwrap();
            assert_eq!(m, Rational::from_ratio(-3, 2).unwrap());
        }

        #[test]
        fn test_from_str_errors() {
            assert_eq!(Rational::from_str("1/0"), Err(NumberError::DivisionByZero));
            assert!(matches!(Rational::from_str("abc"), Err(NumberError::ParseError(_))));
            assert!(matches!(Rational::from_str(""), Err(NumberError::ParseError(_))));
            assert!(matches!(Rational::from_str("1.5e3"), Err(NumberError::ParseError(_))));
        }

        #[test]
        fn test_arithmetic_is_exact() {
            let third = Rational::from_ratio(1, 3).unwrap();
            let sum = third.add(&third).add(&third);
            assert!(sum.is_one());

            let diff = third.sub(&third);
            assert!(diff.is_zero());

            let prod = third.mul(&Rational::from_i64(6));
            assert_eq!(prod.to_i64(), Some(2));
        }

        #[test]
        fn test_checked_div() {
            let one = Rational::one();
            assert_eq!(one.checked_div(&Rational::zero()), Err(NumberError::DivisionByZero));
            let half = one.checked_div(&Rational::from_i64(2)).unwrap();
            assert_eq!(half.to_string(), "1/2");
            assert_eq!(half.recip(), Some(Rational::from_i64(2)));
            assert_eq!(Rational::zero().recip(), None);
        }

        #[test]
        fn test_pow() {
            let two = Rational::from_i64(2);
            assert_eq!(two.pow(10).unwrap().to_i64(), Some(1024));
            assert_eq!(two.pow(0).unwrap(), Rational::one());
            assert_eq!(two.pow(-2).unwrap(), Rational::from_ratio(1, 4).unwrap());
            assert!(Rational::zero().pow(-1).is_err());
        }

        #[test]
        fn test_ordering_and_sign() {
            let a = Rational::from_ratio(-1, 2).unwrap();
            let b = Rational::from_ratio(1, 3).unwrap();
            assert!(a < b);
            assert!(a.is_negative());
            assert_eq!(a.abs(), Rational::from_ratio(1, 2).unwrap());
            assert_eq!(a.neg(), Rational::from_ratio(1, 2).unwrap());
        }

        #[test]
        fn test_serde_round_trip_as_string() {
            let n = Rational::from_ratio(7, 3).unwrap();
            let json = serde_json::to_string(&n).unwrap();
            assert_eq!(json, "\"7/3\"");
            let back: Rational = serde_json::from_str(&json).unwrap();
            assert_eq!(back, n);
        }
    }

    mod value_tests {
        use super::*;

        #[test]
        fn test_value_number() {
            let v = Value::Number(Rational::from_i64(42));
            assert!(v.as_number().is_some());
            assert!(!v.is_error());
        }

        #[test]
        fn test_text_coerces_to_number() {
            let v = Value::Text("3/4".to_string());
            assert_eq!(v.to_number().unwrap(), Rational::from_ratio(3, 4).unwrap());
        }

        #[test]
        fn test_get_missing_field() {
            let v = Value::Object(Default::default());
            let field = v.get("ranks");
            assert_eq!(field.as_error().map(|e| e.code.as_str()), Some(codes::UNDEFINED_FIELD));
        }

        #[test]
        fn test_display_list() {
            let v = Value::from(vec![Rational::from_i64(1), Rational::from_ratio(1, 2).unwrap()]);
            assert_eq!(v.to_string(), "[1, 1/2]");
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn test_error_display() {
            let err = WeyrError::div_zero();
            let display = format!("{}", err);
            assert!(display.contains("DIV_ZERO"));
            assert!(display.contains("Division by zero"));
        }

        #[test]
        fn test_invariant_is_fatal() {
            let err = WeyrError::invariant("negative block count");
            assert!(err.is(codes::INVARIANT));
            assert_eq!(err.severity, Severity::Fatal);
        }

        #[test]
        fn test_from_number_error() {
            let err: WeyrError = NumberError::ParseError("x".to_string()).into();
            assert!(err.is(codes::PARSE_ERROR));
        }
    }
}
