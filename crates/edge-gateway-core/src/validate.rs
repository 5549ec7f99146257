//! Validation primitives for caller-supplied parameters.
//!
//! Each check hands back the accepted JSON value so that route validators can
//! rebuild the outgoing payload from accepted fields only.

use serde_json::{Map, Value};

/// A caller's request was rejected before any remote call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("{0} is required")]
    Missing(String),
    #[error("{field} must be a {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },
    #[error("{0} must be zero or greater")]
    Negative(String),
    #[error("{field} must be one of {allowed:?}")]
    NotAllowed {
        field: String,
        allowed: &'static [i64],
    },
    #[error("at least one of {} is required", .0.join(", "))]
    NoneOf(&'static [&'static str]),
    #[error("{field} must contain exactly {expected} entries, got {actual}")]
    WrongLength {
        field: String,
        expected: usize,
        actual: usize,
    },
    #[error("{0} must not be empty")]
    Empty(String),
    #[error("{0}.end must be greater than {0}.start")]
    AngleOrder(String),
    #[error("{field} span must be between {min} and {max} degrees, got {span}")]
    AngleSpan {
        field: String,
        span: f64,
        min: f64,
        max: f64,
    },
}

/// Borrowed view over a JSON object that reports errors with full field paths.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
    prefix: Option<&'a str>,
}

impl<'a> Fields<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map, prefix: None }
    }

    fn nested(map: &'a Map<String, Value>, prefix: &'a str) -> Self {
        Self {
            map,
            prefix: Some(prefix),
        }
    }

    /// Dotted path of `name` for error messages.
    pub fn path(&self, name: &str) -> String {
        match self.prefix {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name.to_string(),
        }
    }

    /// Field value, treating JSON `null` as absent.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.map.get(name).filter(|v| !v.is_null())
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn require(&self, name: &str) -> Result<&'a Value, ValidationError> {
        self.get(name)
            .ok_or_else(|| ValidationError::Missing(self.path(name)))
    }

    /// Non-empty string.
    pub fn string(&self, name: &str) -> Result<&'a Value, ValidationError> {
        let value = self.require(name)?;
        match value.as_str() {
            Some("") => Err(ValidationError::Missing(self.path(name))),
            Some(_) => Ok(value),
            None => Err(self.wrong_type(name, "string")),
        }
    }

    pub fn optional_string(&self, name: &str) -> Result<Option<&'a Value>, ValidationError> {
        self.optional(name, Self::string)
    }

    pub fn boolean(&self, name: &str) -> Result<&'a Value, ValidationError> {
        let value = self.require(name)?;
        if value.is_boolean() {
            Ok(value)
        } else {
            Err(self.wrong_type(name, "boolean"))
        }
    }

    pub fn optional_boolean(&self, name: &str) -> Result<Option<&'a Value>, ValidationError> {
        self.optional(name, Self::boolean)
    }

    pub fn number(&self, name: &str) -> Result<&'a Value, ValidationError> {
        let value = self.require(name)?;
        if value.is_number() {
            Ok(value)
        } else {
            Err(self.wrong_type(name, "number"))
        }
    }

    pub fn optional_number(&self, name: &str) -> Result<Option<&'a Value>, ValidationError> {
        self.optional(name, Self::number)
    }

    /// Number within `min..=max`.
    pub fn number_in(&self, name: &str, min: f64, max: f64) -> Result<&'a Value, ValidationError> {
        let value = self.number(name)?;
        let n = as_f64(value);
        if n < min || n > max {
            return Err(ValidationError::OutOfRange {
                field: self.path(name),
                min,
                max,
            });
        }
        Ok(value)
    }

    pub fn non_negative(&self, name: &str) -> Result<&'a Value, ValidationError> {
        let value = self.number(name)?;
        if as_f64(value) < 0.0 {
            return Err(ValidationError::Negative(self.path(name)));
        }
        Ok(value)
    }

    pub fn optional_non_negative(&self, name: &str) -> Result<Option<&'a Value>, ValidationError> {
        self.optional(name, Self::non_negative)
    }

    /// Whole number >= 0.
    pub fn count(&self, name: &str) -> Result<&'a Value, ValidationError> {
        let value = self.non_negative(name)?;
        if as_integer(value).is_none() {
            return Err(self.wrong_type(name, "whole number"));
        }
        Ok(value)
    }

    pub fn optional_count(&self, name: &str) -> Result<Option<&'a Value>, ValidationError> {
        self.optional(name, Self::count)
    }

    /// Integer drawn from a fixed set.
    pub fn one_of(&self, name: &str, allowed: &'static [i64]) -> Result<&'a Value, ValidationError> {
        let value = self.number(name)?;
        match as_integer(value) {
            Some(n) if allowed.contains(&n) => Ok(value),
            _ => Err(ValidationError::NotAllowed {
                field: self.path(name),
                allowed,
            }),
        }
    }

    pub fn optional_one_of(
        &self,
        name: &str,
        allowed: &'static [i64],
    ) -> Result<Option<&'a Value>, ValidationError> {
        self.optional(name, |f, n| f.one_of(n, allowed))
    }

    /// Nested object, viewed with this field's path as prefix.
    pub fn object(&self, name: &'a str) -> Result<Fields<'a>, ValidationError> {
        let value = self.require(name)?;
        match value.as_object() {
            Some(map) => Ok(Fields::nested(map, name)),
            None => Err(self.wrong_type(name, "object")),
        }
    }

    pub fn array(&self, name: &str) -> Result<&'a Vec<Value>, ValidationError> {
        let value = self.require(name)?;
        value
            .as_array()
            .ok_or_else(|| self.wrong_type(name, "array"))
    }

    /// Fail unless at least one of `names` is present.
    pub fn at_least_one(&self, names: &'static [&'static str]) -> Result<(), ValidationError> {
        if names.iter().any(|name| self.has(name)) {
            Ok(())
        } else {
            Err(ValidationError::NoneOf(names))
        }
    }

    fn optional<F>(&self, name: &str, check: F) -> Result<Option<&'a Value>, ValidationError>
    where
        F: FnOnce(&Self, &str) -> Result<&'a Value, ValidationError>,
    {
        if self.has(name) {
            check(self, name).map(Some)
        } else {
            Ok(None)
        }
    }

    fn wrong_type(&self, name: &str, expected: &'static str) -> ValidationError {
        ValidationError::WrongType {
            field: self.path(name),
            expected,
        }
    }
}

/// Inclusive bounds on an angular sector and its span.
#[derive(Debug, Clone, Copy)]
pub struct AngleLimits {
    pub min_angle: f64,
    pub max_angle: f64,
    pub min_span: f64,
    pub max_span: f64,
}

/// Validate a `{start, end}` sector and return it rebuilt.
pub fn angle_sector(
    fields: &Fields<'_>,
    name: &'static str,
    limits: AngleLimits,
) -> Result<Value, ValidationError> {
    let sector = fields.object(name)?;
    let start = sector.number_in("start", limits.min_angle, limits.max_angle)?;
    let end = sector.number_in("end", limits.min_angle, limits.max_angle)?;

    let span = as_f64(end) - as_f64(start);
    if span <= 0.0 {
        return Err(ValidationError::AngleOrder(fields.path(name)));
    }
    if span < limits.min_span || span > limits.max_span {
        return Err(ValidationError::AngleSpan {
            field: fields.path(name),
            span,
            min: limits.min_span,
            max: limits.max_span,
        });
    }

    let mut out = Map::new();
    out.insert("start".into(), start.clone());
    out.insert("end".into(), end.clone());
    Ok(Value::Object(out))
}

/// Validate a list of `{x, y}` points with an exact length.
pub fn coordinates(
    fields: &Fields<'_>,
    name: &'static str,
    expected: usize,
) -> Result<Value, ValidationError> {
    let points = fields.array(name)?;
    if points.len() != expected {
        return Err(ValidationError::WrongLength {
            field: fields.path(name),
            expected,
            actual: points.len(),
        });
    }

    let mut out = Vec::with_capacity(points.len());
    for (i, point) in points.iter().enumerate() {
        let path = format!("{}[{i}]", fields.path(name));
        let map = point.as_object().ok_or_else(|| ValidationError::WrongType {
            field: path.clone(),
            expected: "object with numeric x and y",
        })?;
        let point = Fields::nested(map, &path);
        let mut rebuilt = Map::new();
        rebuilt.insert("x".into(), point.number("x")?.clone());
        rebuilt.insert("y".into(), point.number("y")?.clone());
        out.push(Value::Object(rebuilt));
    }
    Ok(Value::Array(out))
}

/// Validate each element of a non-empty array of objects with `check`.
pub fn each_object<F>(
    fields: &Fields<'_>,
    name: &'static str,
    mut check: F,
) -> Result<Value, ValidationError>
where
    F: FnMut(&Fields<'_>) -> Result<Map<String, Value>, ValidationError>,
{
    let items = fields.array(name)?;
    if items.is_empty() {
        return Err(ValidationError::Empty(fields.path(name)));
    }

    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let path = format!("{}[{i}]", fields.path(name));
        let map = item.as_object().ok_or_else(|| ValidationError::WrongType {
            field: path.clone(),
            expected: "object",
        })?;
        out.push(Value::Object(check(&Fields::nested(map, &path))?));
    }
    Ok(Value::Array(out))
}

fn as_f64(value: &Value) -> f64 {
    value.as_f64().unwrap_or(f64::NAN)
}

fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn string_rejects_missing_empty_and_wrong_type() {
        let m = map(json!({"a": "x", "b": "", "c": 3, "d": null}));
        let f = Fields::new(&m);
        assert!(f.string("a").is_ok());
        assert_eq!(f.string("b"), Err(ValidationError::Missing("b".into())));
        assert!(matches!(f.string("c"), Err(ValidationError::WrongType { .. })));
        assert_eq!(f.string("d"), Err(ValidationError::Missing("d".into())));
        assert_eq!(f.string("zz"), Err(ValidationError::Missing("zz".into())));
    }

    #[test]
    fn number_in_is_inclusive() {
        let m = map(json!({"lo": -6, "hi": 6.0, "over": 6.01}));
        let f = Fields::new(&m);
        assert!(f.number_in("lo", -6.0, 6.0).is_ok());
        assert!(f.number_in("hi", -6.0, 6.0).is_ok());
        assert!(matches!(
            f.number_in("over", -6.0, 6.0),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn one_of_accepts_integral_floats() {
        let m = map(json!({"a": 2, "b": 2.0, "c": 2.5, "d": 4}));
        let f = Fields::new(&m);
        assert!(f.one_of("a", &[0, 1, 2]).is_ok());
        assert!(f.one_of("b", &[0, 1, 2]).is_ok());
        assert!(f.one_of("c", &[0, 1, 2]).is_err());
        assert!(f.one_of("d", &[0, 1, 2]).is_err());
    }

    #[test]
    fn nested_paths_in_errors() {
        let m = map(json!({"fenceAngle": {"start": 10}}));
        let f = Fields::new(&m);
        let sector = f.object("fenceAngle").unwrap();
        assert_eq!(
            sector.number("end"),
            Err(ValidationError::Missing("fenceAngle.end".into()))
        );
    }

    #[test]
    fn at_least_one_reports_all_names() {
        let m = map(json!({"other": 1}));
        let err = Fields::new(&m)
            .at_least_one(&["framePadding", "transitionSpeed"])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "at least one of framePadding, transitionSpeed is required"
        );
    }

    #[test]
    fn single_field_errors_name_the_field() {
        let m = map(json!({"delay": -1, "bands": []}));
        let f = Fields::new(&m);
        let err = f.non_negative("delay").unwrap_err();
        assert_eq!(err, ValidationError::Negative("delay".into()));
        assert_eq!(err.to_string(), "delay must be zero or greater");

        let err = each_object(&f, "bands", |_| Ok(Map::new())).unwrap_err();
        assert_eq!(err, ValidationError::Empty("bands".into()));
        assert_eq!(err.to_string(), "bands must not be empty");
    }

    #[test]
    fn coordinates_require_numeric_pairs() {
        let expected = 2;
        let good = map(json!({"pts": [{"x": 1, "y": 2}, {"x": -3.5, "y": 0, "z": 9}]}));
        let out = coordinates(&Fields::new(&good), "pts", expected).unwrap();
        assert_eq!(out, json!([{"x": 1, "y": 2}, {"x": -3.5, "y": 0}]));

        let bad = map(json!({"pts": [{"x": 1, "y": 2}, {"x": "1", "y": 2}]}));
        assert!(matches!(
            coordinates(&Fields::new(&bad), "pts", expected),
            Err(ValidationError::WrongType { field, .. }) if field == "pts[1].x"
        ));

        let short = map(json!({"pts": [{"x": 1, "y": 2}]}));
        assert!(matches!(
            coordinates(&Fields::new(&short), "pts", expected),
            Err(ValidationError::WrongLength { actual: 1, .. })
        ));
    }
}
