//! Placement of groups by a translation, rotation, and scale.
use crate::{
    attribute::{Options, Value},
    document::Document,
    element,
    error::Error,
    node::Ref,
};

/// Significant digits used for translations and scales
const PRECISION: usize = 6;
/// Significant digits used for rotations
const ROTATION_PRECISION: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Where a placed group is drawn relative to its parent.
pub struct Placement {
    /// The horizontal offset
    pub x: f64,
    /// The vertical offset
    pub y: f64,
    /// The rotation in degrees
    pub rotation: f64,
    /// The scale factor
    pub scale: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

impl Placement {
    /// Removes the `x`, `y`, `rotation`, and `scale` options, using defaults for those missing.
    ///
    /// # Errors
    /// When a value is not a finite number, or text of one
    pub fn take(options: &mut Options<'_>) -> Result<Self, Error> {
        let defaults = Self::default();
        Ok(Self {
            x: take_number(options, "x", defaults.x)?,
            y: take_number(options, "y", defaults.y)?,
            rotation: take_number(options, "rotation", defaults.rotation)?,
            scale: take_number(options, "scale", defaults.scale)?,
        })
    }

    /// Returns the value of a `transform` attribute for the placement.
    ///
    /// The translation is always present, while rotation and scale are only included when they
    /// have an effect.
    ///
    /// ```
    /// use oxplot_ast::transform::Placement;
    ///
    /// let placement = Placement { x: 10.0, y: 20.5, rotation: 45.0, scale: 2.0 };
    /// assert_eq!(placement.transform(), "translate(10,20.5) rotate(45) scale(2)");
    /// assert_eq!(Placement::default().transform(), "translate(0,0)");
    /// ```
    pub fn transform(&self) -> String {
        let mut transform = vec![format!(
            "translate({},{})",
            format_general(self.x, PRECISION),
            format_general(self.y, PRECISION)
        )];
        if self.rotation != 0.0 {
            transform.push(format!(
                "rotate({})",
                format_general(self.rotation, ROTATION_PRECISION)
            ));
        }
        if self.scale != 1.0 {
            transform.push(format!("scale({})", format_general(self.scale, PRECISION)));
        }
        transform.join(" ")
    }
}

fn take_number(options: &mut Options<'_>, name: &str, default: f64) -> Result<f64, Error> {
    let Some(value) = options.take(name) else {
        return Ok(default);
    };
    value
        .as_number()
        .filter(|n| n.is_finite())
        .ok_or_else(|| Error::InvalidValue {
            name: name.to_string(),
            reason: format!("expected a finite number, found {}", describe(&value)),
        })
}

fn describe(value: &Value) -> String {
    match value {
        Value::Text(s) => format!("`{s}`"),
        Value::Integer(n) => n.to_string(),
        Value::Number(n) => n.to_string(),
        Value::List(_) => String::from("a list"),
    }
}

/// Formats a number with the given significant digits, in the manner of C's `%g`.
///
/// Trailing zeros are removed, and scientific notation is used when the exponent is less than
/// `-4` or at least `precision`.
///
/// ```
/// use oxplot_ast::transform::format_general;
///
/// assert_eq!(format_general(75.0, 6), "75");
/// assert_eq!(format_general(0.000_01, 6), "1e-05");
/// assert_eq!(format_general(123.0, 2), "1.2e+02");
/// ```
pub fn format_general(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return value.to_string().to_lowercase();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or_default();
    let significant = i32::try_from(precision).unwrap_or(i32::MAX);

    if exponent < -4 || exponent >= significant {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = usize::try_from(significant - 1 - exponent).unwrap_or_default();
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

/// Creates a group positioned by the placement options, which are replaced with a `transform`
/// written before any other attribute.
pub(crate) fn placed_group<'arena>(
    document: Document<'arena>,
    mut options: Options<'arena>,
) -> Result<Ref<'arena>, Error> {
    if options.contains("transform") {
        return Err(Error::InvalidValue {
            name: String::from("transform"),
            reason: String::from(
                "a placed group builds its transform from `x`, `y`, `rotation` and `scale`",
            ),
        });
    }
    let placement = Placement::take(&mut options)?;
    element::create(document, "g", options.prepend("transform", placement.transform()))
}

#[test]
fn format_general_matches_printf() {
    let cases = [
        (0.0, 6, "0"),
        (-0.0, 6, "-0"),
        (75.0, 6, "75"),
        (0.5, 6, "0.5"),
        (-3.25, 6, "-3.25"),
        (1.0 / 3.0, 6, "0.333333"),
        (0.0001, 6, "0.0001"),
        (0.000_012_5, 6, "1.25e-05"),
        (100_000.0, 6, "100000"),
        (1_000_000.0, 6, "1e+06"),
        (123_456_789.0, 6, "1.23457e+08"),
        (999_999.5, 6, "1e+06"),
        (45.0, 2, "45"),
        (12.4, 2, "12"),
        (-90.0, 2, "-90"),
        (123.0, 2, "1.2e+02"),
        (0.25, 2, "0.25"),
        (7.0, 0, "7"),
    ];
    for (value, precision, expected) in cases {
        assert_eq!(
            format_general(value, precision),
            expected,
            "formatting {value} with {precision} digits"
        );
    }
    assert_eq!(format_general(f64::INFINITY, 6), "inf");
}

#[test]
fn transform_terms_are_ordered_and_omitted() {
    let only_translate = Placement {
        x: 1.5,
        y: -2.0,
        ..Placement::default()
    };
    assert_eq!(only_translate.transform(), "translate(1.5,-2)");

    let with_scale = Placement {
        scale: 0.5,
        ..Placement::default()
    };
    assert_eq!(with_scale.transform(), "translate(0,0) scale(0.5)");

    let everything = Placement {
        x: 75.0,
        y: 75.0,
        rotation: 33.333,
        scale: 3.0,
    };
    assert_eq!(
        everything.transform(),
        "translate(75,75) rotate(33) scale(3)"
    );
}

#[test]
fn take_placement_from_options() -> anyhow::Result<()> {
    use crate::attrs;

    let mut options = attrs! { x: 10, y: "20.5", fill: "red", scale: 2.0 };
    let placement = Placement::take(&mut options)?;
    assert_eq!(
        placement,
        Placement {
            x: 10.0,
            y: 20.5,
            rotation: 0.0,
            scale: 2.0
        }
    );
    assert!(options.contains("fill"));
    assert!(!options.contains("x"));

    let mut options = attrs! { rotation: "left" };
    let err = Placement::take(&mut options).expect_err("text is not a number");
    assert_eq!(
        err.to_string(),
        "invalid value for `rotation`: expected a finite number, found `left`"
    );

    let mut options = attrs! { x: f64::NAN };
    assert!(Placement::take(&mut options).is_err());
    Ok(())
}
