//! Typed field access over one object's plist dictionary.
//!
//! [`ObjectDecoder`] wraps the raw dictionary together with the owning
//! identifier and `isa`, so every failure names the object and field it came
//! from. Unknown keys are never looked at, which is what makes decoding
//! forward compatible.

use std::str::FromStr;

use pbx_types::{Identifier, PlistDict, PlistValue, ValueKind};

use crate::error::{ObjectError, ObjectResult};

/// Interpret a legacy boolean.
///
/// Project files store flags as the strings `"0"` and `"1"`. The value is
/// read as an integer and compared with 1; anything absent, non-numeric, or
/// not a string is `false`. This never fails.
pub fn decode_legacy_bool(value: Option<&PlistValue>) -> bool {
    value
        .and_then(PlistValue::as_str)
        .and_then(|s| s.parse::<i64>().ok())
        .is_some_and(|n| n == 1)
}

/// Field reader for one object.
pub struct ObjectDecoder<'a> {
    reference: &'a Identifier,
    isa: &'a str,
    fields: &'a PlistDict,
}

impl<'a> ObjectDecoder<'a> {
    pub fn new(reference: &'a Identifier, isa: &'a str, fields: &'a PlistDict) -> Self {
        Self {
            reference,
            isa,
            fields,
        }
    }

    pub fn reference(&self) -> &Identifier {
        self.reference
    }

    fn missing(&self, field: &str) -> ObjectError {
        ObjectError::MissingField {
            reference: self.reference.clone(),
            isa: self.isa.to_string(),
            field: field.to_string(),
        }
    }

    fn mismatch(&self, field: &str, expected: ValueKind, found: &PlistValue) -> ObjectError {
        ObjectError::TypeMismatch {
            reference: self.reference.clone(),
            field: field.to_string(),
            expected,
            found: found.kind(),
        }
    }

    fn invalid(&self, field: &str, value: &str) -> ObjectError {
        ObjectError::InvalidValue {
            reference: self.reference.clone(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Optional string field.
    pub fn string(&self, field: &str) -> ObjectResult<Option<String>> {
        match self.fields.get(field) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(|s| Some(s.to_string()))
                .ok_or_else(|| self.mismatch(field, ValueKind::String, value)),
        }
    }

    /// Required string field.
    pub fn required_string(&self, field: &str) -> ObjectResult<String> {
        self.string(field)?.ok_or_else(|| self.missing(field))
    }

    /// Optional string field parsed with [`FromStr`].
    pub fn parsed<T: FromStr>(&self, field: &str) -> ObjectResult<Option<T>> {
        match self.string(field)? {
            None => Ok(None),
            Some(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| self.invalid(field, &s)),
        }
    }

    /// Legacy `"0"`/`"1"` flag; see [`decode_legacy_bool`].
    pub fn legacy_bool(&self, field: &str) -> bool {
        decode_legacy_bool(self.fields.get(field))
    }

    /// Legacy flag that is only meaningful when present.
    pub fn optional_legacy_bool(&self, field: &str) -> Option<bool> {
        self.fields
            .contains_key(field)
            .then(|| self.legacy_bool(field))
    }

    /// Optional reference to another object.
    pub fn reference_field(&self, field: &str) -> ObjectResult<Option<Identifier>> {
        match self.string(field)? {
            None => Ok(None),
            Some(s) => Identifier::new(s.clone())
                .map(Some)
                .map_err(|_| self.invalid(field, &s)),
        }
    }

    /// Required reference to another object.
    pub fn required_reference(&self, field: &str) -> ObjectResult<Identifier> {
        self.reference_field(field)?
            .ok_or_else(|| self.missing(field))
    }

    /// Ordered list of strings; absent means empty.
    pub fn strings(&self, field: &str) -> ObjectResult<Vec<String>> {
        Ok(self.optional_strings(field)?.unwrap_or_default())
    }

    /// Ordered list of strings, distinguishing absent from empty.
    pub fn optional_strings(&self, field: &str) -> ObjectResult<Option<Vec<String>>> {
        let Some(value) = self.fields.get(field) else {
            return Ok(None);
        };
        let items = value
            .as_array()
            .ok_or_else(|| self.mismatch(field, ValueKind::Array, value))?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.mismatch(field, ValueKind::String, item))
            })
            .collect::<ObjectResult<Vec<_>>>()
            .map(Some)
    }

    /// Ordered list of references; absent means empty.
    pub fn references(&self, field: &str) -> ObjectResult<Vec<Identifier>> {
        self.strings(field)?
            .into_iter()
            .map(|s| Identifier::new(s.clone()).map_err(|_| self.invalid(field, &s)))
            .collect()
    }

    /// Free-form dictionary (build settings, attributes), comments stripped.
    pub fn dict(&self, field: &str) -> ObjectResult<Option<PlistDict>> {
        match self.fields.get(field) {
            None => Ok(None),
            Some(value) => match value.clone().strip_comments() {
                PlistValue::Dictionary(dict) => Ok(Some(dict)),
                _ => Err(self.mismatch(field, ValueKind::Dictionary, value)),
            },
        }
    }

    /// Array of dictionaries, as used by `projectReferences`.
    pub fn dicts(&self, field: &str) -> ObjectResult<Option<Vec<PlistDict>>> {
        let Some(value) = self.fields.get(field) else {
            return Ok(None);
        };
        let items = value
            .as_array()
            .ok_or_else(|| self.mismatch(field, ValueKind::Array, value))?;
        items
            .iter()
            .map(|item| {
                item.as_dict()
                    .cloned()
                    .ok_or_else(|| self.mismatch(field, ValueKind::Dictionary, item))
            })
            .collect::<ObjectResult<Vec<_>>>()
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use pbx_types::CommentedString;

    use super::*;

    fn id() -> Identifier {
        Identifier::new("AAAAAAAAAAAAAAAAAAAAAAAA").unwrap()
    }

    fn fields(pairs: Vec<(&str, PlistValue)>) -> PlistDict {
        pairs
            .into_iter()
            .map(|(k, v)| (CommentedString::new(k), v))
            .collect()
    }

    #[test]
    fn legacy_bool_values() {
        assert!(decode_legacy_bool(Some(&PlistValue::from("1"))));
        assert!(!decode_legacy_bool(Some(&PlistValue::from("0"))));
        assert!(!decode_legacy_bool(None));
        assert!(!decode_legacy_bool(Some(&PlistValue::from("YES"))));
        assert!(!decode_legacy_bool(Some(&PlistValue::Array(vec![]))));
        assert!(decode_legacy_bool(Some(&PlistValue::from("01"))));
        assert!(!decode_legacy_bool(Some(&PlistValue::from(" 1"))));
        assert!(!decode_legacy_bool(Some(&PlistValue::from("1 "))));
    }

    #[test]
    fn missing_required_field_names_object_and_field() {
        let reference = id();
        let dict = fields(vec![]);
        let decoder = ObjectDecoder::new(&reference, "PBXNativeTarget", &dict);
        let err = decoder.required_string("name").unwrap_err();
        assert_eq!(
            err,
            ObjectError::MissingField {
                reference: id(),
                isa: "PBXNativeTarget".into(),
                field: "name".into(),
            }
        );
    }

    #[test]
    fn wrong_shape_is_a_type_mismatch() {
        let reference = id();
        let dict = fields(vec![("files", PlistValue::from("oops"))]);
        let decoder = ObjectDecoder::new(&reference, "PBXSourcesBuildPhase", &dict);
        let err = decoder.references("files").unwrap_err();
        assert!(matches!(
            err,
            ObjectError::TypeMismatch {
                expected: ValueKind::Array,
                found: ValueKind::String,
                ..
            }
        ));
    }

    #[test]
    fn references_ignore_comments() {
        let reference = id();
        let dict = fields(vec![(
            "children",
            PlistValue::Array(vec![
                PlistValue::commented("B1", Some("a.m".into())),
                PlistValue::from("B2"),
            ]),
        )]);
        let decoder = ObjectDecoder::new(&reference, "PBXGroup", &dict);
        let ids = decoder.references("children").unwrap();
        assert_eq!(ids[0].as_str(), "B1");
        assert_eq!(ids[1].as_str(), "B2");
    }

    #[test]
    fn parsed_reports_invalid_values() {
        let reference = id();
        let dict = fields(vec![("buildActionMask", PlistValue::from("lots"))]);
        let decoder = ObjectDecoder::new(&reference, "PBXSourcesBuildPhase", &dict);
        let err = decoder.parsed::<u32>("buildActionMask").unwrap_err();
        assert!(matches!(err, ObjectError::InvalidValue { .. }));
    }

    #[test]
    fn optional_strings_distinguishes_absent_and_empty() {
        let reference = id();
        let dict = fields(vec![("inputPaths", PlistValue::Array(vec![]))]);
        let decoder = ObjectDecoder::new(&reference, "PBXShellScriptBuildPhase", &dict);
        assert_eq!(decoder.optional_strings("inputPaths").unwrap(), Some(vec![]));
        assert_eq!(decoder.optional_strings("outputPaths").unwrap(), None);
    }
}
