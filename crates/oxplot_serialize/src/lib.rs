//! Primitives for serializing markup values and documents

use std::fmt::Write;

use error::PrinterError;

pub mod encoding;
pub mod error;
pub mod xmlwriter;

pub use encoding::Encoding;

/// Trait for values that can be serialized into attribute text
pub trait ToValue {
    /// Serialize `self` as attribute text, writing to `dest`
    ///
    /// # Errors
    /// If the value has no textual form or the destination fails
    fn write_value<W>(&self, dest: &mut W) -> Result<(), PrinterError>
    where
        W: Write;

    /// Serialize `self` as attribute text and return a string
    ///
    /// # Errors
    /// If the value has no textual form
    fn to_value_string(&self) -> Result<String, PrinterError> {
        let mut s = String::new();
        self.write_value(&mut s)?;
        Ok(s)
    }
}

impl ToValue for str {
    fn write_value<W>(&self, dest: &mut W) -> Result<(), PrinterError>
    where
        W: Write,
    {
        Ok(dest.write_str(self)?)
    }
}

impl ToValue for String {
    fn write_value<W>(&self, dest: &mut W) -> Result<(), PrinterError>
    where
        W: Write,
    {
        self.as_str().write_value(dest)
    }
}

impl ToValue for i64 {
    fn write_value<W>(&self, dest: &mut W) -> Result<(), PrinterError>
    where
        W: Write,
    {
        Ok(write!(dest, "{self}")?)
    }
}

impl ToValue for f64 {
    fn write_value<W>(&self, dest: &mut W) -> Result<(), PrinterError>
    where
        W: Write,
    {
        if !self.is_finite() {
            return Err(PrinterError::NonFiniteNumber(*self));
        }
        Ok(write!(dest, "{self}")?)
    }
}

impl<T: ToValue> ToValue for [T] {
    /// Writes each item seperated by `", "`
    fn write_value<W>(&self, dest: &mut W) -> Result<(), PrinterError>
    where
        W: Write,
    {
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                dest.write_str(", ")?;
            }
            item.write_value(dest)?;
        }
        Ok(())
    }
}

#[test]
fn scalars() -> Result<(), PrinterError> {
    assert_eq!(150_i64.to_value_string()?, "150");
    assert_eq!(0.5_f64.to_value_string()?, "0.5");
    assert_eq!(5.0_f64.to_value_string()?, "5");
    assert_eq!("#F60".to_value_string()?, "#F60");
    assert_eq!(
        f64::NAN.to_value_string().map_err(|e| e.to_string()),
        Err(String::from("the number `NaN` cannot be written as markup"))
    );
    Ok(())
}

#[test]
fn sequences_are_comma_joined() -> Result<(), PrinterError> {
    assert_eq!([1_i64, 2, 3].to_value_string()?, "1, 2, 3");
    assert_eq!(Vec::<i64>::new().to_value_string()?, "");
    assert_eq!(
        [0.5_f64, f64::INFINITY].to_value_string(),
        Err(PrinterError::NonFiniteNumber(f64::INFINITY))
    );
    Ok(())
}
