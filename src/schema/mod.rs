//! Declarative validation rules for request and response payloads
//!
//! A [`Schema`] is plain data describing the shape of a JSON value. The same
//! rule set validates caller input before a request is built and decodes the
//! `data` member of a success envelope. Validation never stops at the first
//! problem: every issue is collected in field declaration order, and the
//! returned value has the schema's transforms applied (string trimming,
//! defaults, numeric coercion and clamping, unknown-key stripping).

pub mod registry;

use crate::api::{AppError, AppErrorIssue};
use serde_json::{Map, Number, Value};
use std::fmt::Write as _;

/// Issue kinds attached to [`AppErrorIssue::code`].
pub mod issue {
    pub const INVALID_TYPE: &str = "invalid_type";
    pub const TOO_SMALL: &str = "too_small";
    pub const TOO_BIG: &str = "too_big";
    pub const INVALID_ENUM_VALUE: &str = "invalid_enum_value";
    pub const INVALID_LITERAL: &str = "invalid_literal";
    pub const INVALID_STRING: &str = "invalid_string";
    pub const UNRECOGNIZED_KEYS: &str = "unrecognized_keys";
    pub const INVALID_UNION_DISCRIMINATOR: &str = "invalid_union_discriminator";
    pub const CUSTOM: &str = "custom";
}

/// A single validation rule tree
#[derive(Debug, Clone)]
pub enum Schema {
    String(StringRule),
    Number(NumberRule),
    Boolean,
    /// One of a closed set of strings
    Enum(&'static [&'static str]),
    /// Exactly this string
    Literal(&'static str),
    Array(Box<Schema>),
    /// Object with arbitrary string keys, every value matching the inner schema
    Record(Box<Schema>),
    Object(ObjectSchema),
    Union(UnionSchema),
    /// `null` or the inner schema
    Nullable(Box<Schema>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// Hyphenated 8-4-4-4-12 UUID
    Uuid,
    /// Absolute URL whose text starts with `http`
    HttpUrl,
}

#[derive(Debug, Clone, Copy)]
struct LengthBound {
    len: usize,
    message: Option<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct StringRule {
    trim: bool,
    min: Option<LengthBound>,
    max: Option<LengthBound>,
    format: Option<StringFormat>,
}

impl StringRule {
    /// Trim surrounding whitespace before length checks
    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn min(mut self, len: usize) -> Self {
        self.min = Some(LengthBound { len, message: None });
        self
    }

    pub fn min_with(mut self, len: usize, message: &'static str) -> Self {
        self.min = Some(LengthBound {
            len,
            message: Some(message),
        });
        self
    }

    pub fn max(mut self, len: usize) -> Self {
        self.max = Some(LengthBound { len, message: None });
        self
    }

    pub fn max_with(mut self, len: usize, message: &'static str) -> Self {
        self.max = Some(LengthBound {
            len,
            message: Some(message),
        });
        self
    }

    pub fn uuid(mut self) -> Self {
        self.format = Some(StringFormat::Uuid);
        self
    }

    pub fn http_url(mut self) -> Self {
        self.format = Some(StringFormat::HttpUrl);
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct Bound {
    value: f64,
    inclusive: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NumberRule {
    integer: bool,
    coerce: bool,
    min: Option<Bound>,
    max: Option<Bound>,
    clamp_max: Option<f64>,
}

impl NumberRule {
    pub fn int(mut self) -> Self {
        self.integer = true;
        self
    }

    /// Accept numeric strings (query parameters, CLI flags)
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Strictly greater than zero
    pub fn positive(mut self) -> Self {
        self.min = Some(Bound {
            value: 0.0,
            inclusive: false,
        });
        self
    }

    pub fn min(mut self, value: f64) -> Self {
        self.min = Some(Bound {
            value,
            inclusive: true,
        });
        self
    }

    pub fn max(mut self, value: f64) -> Self {
        self.max = Some(Bound {
            value,
            inclusive: true,
        });
        self
    }

    /// Values above `value` pass validation and are replaced by `value`
    pub fn clamp_max(mut self, value: f64) -> Self {
        self.clamp_max = Some(value);
        self
    }
}

/// What happens to a field absent from the input
#[derive(Debug, Clone)]
pub enum Presence {
    Required,
    Optional,
    Default(Value),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub schema: Schema,
    pub presence: Presence,
}

impl Field {
    pub fn required(name: &'static str, schema: impl Into<Schema>) -> Self {
        Self {
            name,
            schema: schema.into(),
            presence: Presence::Required,
        }
    }

    pub fn optional(name: &'static str, schema: impl Into<Schema>) -> Self {
        Self {
            name,
            schema: schema.into(),
            presence: Presence::Optional,
        }
    }

    pub fn with_default(name: &'static str, schema: impl Into<Schema>, default: Value) -> Self {
        Self {
            name,
            schema: schema.into(),
            presence: Presence::Default(default),
        }
    }
}

/// Policy for keys an object schema does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Drop them from the output
    #[default]
    Strip,
    /// Report them as an `unrecognized_keys` issue
    Reject,
    /// Copy them through untouched
    Passthrough,
}

/// A cross-field check run once every field has validated.
///
/// Returns the offending field path and message.
pub type Refinement = fn(&Map<String, Value>) -> Option<(&'static [&'static str], &'static str)>;

#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    pub fields: Vec<Field>,
    pub unknown: UnknownKeys,
    refinements: Vec<Refinement>,
}

impl ObjectSchema {
    pub fn strict(mut self) -> Self {
        self.unknown = UnknownKeys::Reject;
        self
    }

    pub fn passthrough(mut self) -> Self {
        self.unknown = UnknownKeys::Passthrough;
        self
    }

    pub fn refine(mut self, check: Refinement) -> Self {
        self.refinements.push(check);
        self
    }

    /// Copy of this schema with more fields appended
    pub fn extend(&self, fields: Vec<Field>) -> Self {
        let mut extended = self.clone();
        extended.fields.extend(fields);
        extended
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Object union keyed by a literal discriminator field
#[derive(Debug, Clone)]
pub struct UnionSchema {
    pub discriminator: &'static str,
    pub variants: Vec<(&'static str, ObjectSchema)>,
}

impl UnionSchema {
    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.variants.iter().map(|(tag, _)| *tag)
    }
}

pub fn string() -> StringRule {
    StringRule::default()
}

pub fn number() -> NumberRule {
    NumberRule::default()
}

pub fn boolean() -> Schema {
    Schema::Boolean
}

pub fn enumeration(values: &'static [&'static str]) -> Schema {
    Schema::Enum(values)
}

pub fn literal(value: &'static str) -> Schema {
    Schema::Literal(value)
}

pub fn array(item: impl Into<Schema>) -> Schema {
    Schema::Array(Box::new(item.into()))
}

pub fn record(value: impl Into<Schema>) -> Schema {
    Schema::Record(Box::new(value.into()))
}

pub fn nullable(inner: impl Into<Schema>) -> Schema {
    Schema::Nullable(Box::new(inner.into()))
}

pub fn object(fields: Vec<Field>) -> ObjectSchema {
    ObjectSchema {
        fields,
        ..Default::default()
    }
}

/// Discriminated union. Each variant must declare the discriminator as a
/// [`Schema::Literal`] equal to its tag.
pub fn union(discriminator: &'static str, variants: Vec<(&'static str, ObjectSchema)>) -> Schema {
    Schema::Union(UnionSchema {
        discriminator,
        variants,
    })
}

impl From<StringRule> for Schema {
    fn from(rule: StringRule) -> Self {
        Schema::String(rule)
    }
}

impl From<NumberRule> for Schema {
    fn from(rule: NumberRule) -> Self {
        Schema::Number(rule)
    }
}

impl From<ObjectSchema> for Schema {
    fn from(object: ObjectSchema) -> Self {
        Schema::Object(object)
    }
}

impl Schema {
    /// Validate `value`, returning the transformed value or every issue found.
    pub fn validate(&self, value: &Value) -> std::result::Result<Value, Vec<AppErrorIssue>> {
        let mut issues = Vec::new();
        let mut path = Vec::new();
        match self.check(value, &mut path, &mut issues) {
            Some(out) if issues.is_empty() => Ok(out),
            _ => Err(issues),
        }
    }

    /// [`Schema::validate`] with the issues folded into a `VALIDATION_ERROR`.
    pub fn parse(&self, value: &Value) -> std::result::Result<Value, AppError> {
        self.validate(value).map_err(AppError::validation)
    }

    fn expected(&self) -> &'static str {
        match self {
            Schema::String(_) | Schema::Enum(_) | Schema::Literal(_) => "string",
            Schema::Number(_) => "number",
            Schema::Boolean => "boolean",
            Schema::Array(_) => "array",
            Schema::Record(_) | Schema::Object(_) | Schema::Union(_) => "object",
            Schema::Nullable(inner) => inner.expected(),
        }
    }

    fn check(
        &self,
        value: &Value,
        path: &mut Vec<String>,
        issues: &mut Vec<AppErrorIssue>,
    ) -> Option<Value> {
        match self {
            Schema::String(rule) => check_string(rule, value, path, issues),
            Schema::Number(rule) => check_number(rule, value, path, issues),
            Schema::Boolean => match value {
                Value::Bool(_) => Some(value.clone()),
                other => type_issue("boolean", other, path, issues),
            },
            Schema::Enum(values) => match value {
                Value::String(s) if values.iter().any(|v| v == s) => Some(value.clone()),
                Value::String(_) => {
                    push(
                        issues,
                        path,
                        format!("Invalid option: expected one of {}", quoted(values)),
                        issue::INVALID_ENUM_VALUE,
                    );
                    None
                }
                other => type_issue("string", other, path, issues),
            },
            Schema::Literal(expected) => match value {
                Value::String(s) if s == expected => Some(value.clone()),
                _ => {
                    push(
                        issues,
                        path,
                        format!("Invalid input: expected \"{}\"", expected),
                        issue::INVALID_LITERAL,
                    );
                    None
                }
            },
            Schema::Array(item) => {
                let Value::Array(items) = value else {
                    return type_issue("array", value, path, issues);
                };
                let before = issues.len();
                let mut out = Vec::with_capacity(items.len());
                for (index, element) in items.iter().enumerate() {
                    path.push(index.to_string());
                    if let Some(v) = item.check(element, path, issues) {
                        out.push(v);
                    }
                    path.pop();
                }
                (issues.len() == before).then_some(Value::Array(out))
            }
            Schema::Record(inner) => {
                let Value::Object(map) = value else {
                    return type_issue("object", value, path, issues);
                };
                let before = issues.len();
                let mut out = Map::new();
                for (key, element) in map {
                    path.push(key.clone());
                    if let Some(v) = inner.check(element, path, issues) {
                        out.insert(key.clone(), v);
                    }
                    path.pop();
                }
                (issues.len() == before).then_some(Value::Object(out))
            }
            Schema::Object(object) => check_object(object, value, path, issues),
            Schema::Union(union) => check_union(union, value, path, issues),
            Schema::Nullable(inner) => match value {
                Value::Null => Some(Value::Null),
                other => inner.check(other, path, issues),
            },
        }
    }
}

fn check_string(
    rule: &StringRule,
    value: &Value,
    path: &mut Vec<String>,
    issues: &mut Vec<AppErrorIssue>,
) -> Option<Value> {
    let Value::String(raw) = value else {
        return type_issue("string", value, path, issues);
    };
    let text = if rule.trim { raw.trim() } else { raw.as_str() };
    let len = text.chars().count();
    let before = issues.len();

    if let Some(min) = rule.min {
        if len < min.len {
            let message = min.message.map(str::to_string).unwrap_or_else(|| {
                format!("Too small: expected string to have >={} characters", min.len)
            });
            push(issues, path, message, issue::TOO_SMALL);
        }
    }
    if let Some(max) = rule.max {
        if len > max.len {
            let message = max.message.map(str::to_string).unwrap_or_else(|| {
                format!("Too big: expected string to have <={} characters", max.len)
            });
            push(issues, path, message, issue::TOO_BIG);
        }
    }
    match rule.format {
        Some(StringFormat::Uuid) if !is_uuid(text) => {
            push(issues, path, "Invalid UUID".to_string(), issue::INVALID_STRING);
        }
        Some(StringFormat::HttpUrl) => {
            if url::Url::parse(text).is_err() {
                push(issues, path, "Invalid URL".to_string(), issue::INVALID_STRING);
            } else if !text.starts_with("http") {
                push(
                    issues,
                    path,
                    "Invalid string: must start with \"http\"".to_string(),
                    issue::INVALID_STRING,
                );
            }
        }
        _ => {}
    }

    (issues.len() == before).then(|| Value::String(text.to_string()))
}

/// Hyphenated RFC 4122 UUID (versions 1 to 8), or the nil and max UUIDs
fn is_uuid(text: &str) -> bool {
    if text.len() != 36 {
        return false;
    }
    match uuid::Uuid::try_parse(text) {
        Ok(id) if id.is_nil() || id.as_u128() == u128::MAX => true,
        Ok(id) => {
            id.get_variant() == uuid::Variant::RFC4122 && (1..=8).contains(&id.get_version_num())
        }
        Err(_) => false,
    }
}

/// Largest integer an `f64` holds exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn check_number(
    rule: &NumberRule,
    value: &Value,
    path: &mut Vec<String>,
    issues: &mut Vec<AppErrorIssue>,
) -> Option<Value> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if rule.coerce => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    };
    let Some(mut n) = n else {
        return type_issue("number", value, path, issues);
    };
    let before = issues.len();

    if rule.integer && n.fract() != 0.0 {
        push(
            issues,
            path,
            "Invalid input: expected int, received number".to_string(),
            issue::INVALID_TYPE,
        );
    } else if rule.integer && n > MAX_SAFE_INTEGER {
        push(
            issues,
            path,
            format!("Too big: expected int to be <={}", MAX_SAFE_INTEGER),
            issue::TOO_BIG,
        );
    } else if rule.integer && n < -MAX_SAFE_INTEGER {
        push(
            issues,
            path,
            format!("Too small: expected int to be >={}", -MAX_SAFE_INTEGER),
            issue::TOO_SMALL,
        );
    }
    if let Some(min) = rule.min {
        let ok = if min.inclusive { n >= min.value } else { n > min.value };
        if !ok {
            let op = if min.inclusive { ">=" } else { ">" };
            push(
                issues,
                path,
                format!("Too small: expected number to be {}{}", op, min.value),
                issue::TOO_SMALL,
            );
        }
    }
    if let Some(max) = rule.max {
        let ok = if max.inclusive { n <= max.value } else { n < max.value };
        if !ok {
            let op = if max.inclusive { "<=" } else { "<" };
            push(
                issues,
                path,
                format!("Too big: expected number to be {}{}", op, max.value),
                issue::TOO_BIG,
            );
        }
    }
    if issues.len() != before {
        return None;
    }

    let untouched = matches!(value, Value::Number(_)) && rule.clamp_max.map_or(true, |c| n <= c);
    if let Some(ceiling) = rule.clamp_max {
        n = n.min(ceiling);
    }
    if rule.integer {
        // 25.0 and 25 both leave as 25; the safe range fits in i64
        Some(Value::from(n as i64))
    } else if untouched {
        Some(value.clone())
    } else {
        Number::from_f64(n).map(Value::Number)
    }
}

fn check_object(
    object: &ObjectSchema,
    value: &Value,
    path: &mut Vec<String>,
    issues: &mut Vec<AppErrorIssue>,
) -> Option<Value> {
    let Value::Object(map) = value else {
        return type_issue("object", value, path, issues);
    };
    let before = issues.len();
    let mut out = Map::new();

    for field in &object.fields {
        path.push(field.name.to_string());
        match (map.get(field.name), &field.presence) {
            (Some(v), _) => {
                if let Some(checked) = field.schema.check(v, path, issues) {
                    out.insert(field.name.to_string(), checked);
                }
            }
            (None, Presence::Required) => {
                push(
                    issues,
                    path,
                    format!(
                        "Invalid input: expected {}, received undefined",
                        field.schema.expected()
                    ),
                    issue::INVALID_TYPE,
                );
            }
            (None, Presence::Optional) => {}
            (None, Presence::Default(default)) => {
                out.insert(field.name.to_string(), default.clone());
            }
        }
        path.pop();
    }

    let unknown: Vec<&String> = map
        .keys()
        .filter(|key| object.field(key).is_none())
        .collect();
    match object.unknown {
        UnknownKeys::Strip => {}
        UnknownKeys::Passthrough => {
            for key in unknown {
                out.insert(key.clone(), map[key].clone());
            }
        }
        UnknownKeys::Reject if !unknown.is_empty() => {
            let noun = if unknown.len() == 1 { "key" } else { "keys" };
            let mut message = format!("Unrecognized {}: ", noun);
            for (i, key) in unknown.iter().enumerate() {
                if i > 0 {
                    message.push_str(", ");
                }
                let _ = write!(message, "\"{}\"", key);
            }
            push(issues, path, message, issue::UNRECOGNIZED_KEYS);
        }
        UnknownKeys::Reject => {}
    }

    if issues.len() != before {
        return None;
    }
    for refinement in &object.refinements {
        if let Some((field_path, message)) = refinement(&out) {
            let mut full = path.clone();
            full.extend(field_path.iter().map(|s| s.to_string()));
            issues.push(AppErrorIssue::new(full, message, issue::CUSTOM));
        }
    }
    (issues.len() == before).then_some(Value::Object(out))
}

fn check_union(
    union: &UnionSchema,
    value: &Value,
    path: &mut Vec<String>,
    issues: &mut Vec<AppErrorIssue>,
) -> Option<Value> {
    let Value::Object(map) = value else {
        return type_issue("object", value, path, issues);
    };
    let tag = map.get(union.discriminator).and_then(Value::as_str);
    match union.variants.iter().find(|(t, _)| Some(*t) == tag) {
        Some((_, variant)) => check_object(variant, value, path, issues),
        None => {
            let tags: Vec<&'static str> = union.tags().collect();
            path.push(union.discriminator.to_string());
            push(
                issues,
                path,
                format!("Invalid discriminator value: expected {}", quoted(&tags)),
                issue::INVALID_UNION_DISCRIMINATOR,
            );
            path.pop();
            None
        }
    }
}

fn type_issue(
    expected: &str,
    received: &Value,
    path: &[String],
    issues: &mut Vec<AppErrorIssue>,
) -> Option<Value> {
    push(
        issues,
        path,
        format!(
            "Invalid input: expected {}, received {}",
            expected,
            json_kind(received)
        ),
        issue::INVALID_TYPE,
    );
    None
}

fn push(issues: &mut Vec<AppErrorIssue>, path: &[String], message: String, code: &str) {
    issues.push(AppErrorIssue::new(path.to_vec(), message, code));
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn quoted(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("\"{}\"", v))
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths(issues: &[AppErrorIssue]) -> Vec<String> {
        issues.iter().map(|i| i.path.join(".")).collect()
    }

    #[test]
    fn string_trim_and_bounds() {
        let schema: Schema = string().trim().min(1).max(5).into();
        assert_eq!(schema.validate(&json!("  abc  ")).unwrap(), json!("abc"));

        let issues = schema.validate(&json!("   ")).unwrap_err();
        assert_eq!(issues[0].code, issue::TOO_SMALL);

        let issues = schema.validate(&json!("abcdef")).unwrap_err();
        assert_eq!(issues[0].code, issue::TOO_BIG);
    }

    #[test]
    fn custom_length_messages() {
        let schema: Schema = string()
            .trim()
            .min_with(1, "Comment body is required")
            .into();
        let issues = schema.validate(&json!("")).unwrap_err();
        assert_eq!(issues[0].message, "Comment body is required");
    }

    #[test]
    fn uuid_format() {
        let schema: Schema = string().uuid().into();
        assert!(schema
            .validate(&json!("6f1c2a4e-8a51-4a7e-9b0f-1f2d3c4b5a69"))
            .is_ok());
        // Unhyphenated form is not accepted
        assert!(schema
            .validate(&json!("6f1c2a4e8a514a7e9b0f1f2d3c4b5a69"))
            .is_err());
        let issues = schema.validate(&json!("nope")).unwrap_err();
        assert_eq!(issues[0].code, issue::INVALID_STRING);
    }

    #[test]
    fn uuid_format_checks_variant_and_version() {
        let schema: Schema = string().uuid().into();
        assert!(schema
            .validate(&json!("00000000-0000-0000-0000-000000000000"))
            .is_ok());
        assert!(schema
            .validate(&json!("ffffffff-ffff-ffff-ffff-ffffffffffff"))
            .is_ok());
        // Variant nibble `c` is Microsoft, not RFC 4122
        assert!(schema
            .validate(&json!("6f1c2a4e-8a51-4a7e-cb0f-1f2d3c4b5a69"))
            .is_err());
        // Version 0 is not assigned
        assert!(schema
            .validate(&json!("6f1c2a4e-8a51-0a7e-9b0f-1f2d3c4b5a69"))
            .is_err());
    }

    #[test]
    fn http_url_format() {
        let schema: Schema = string().http_url().into();
        assert!(schema.validate(&json!("https://example.com/a.png")).is_ok());
        assert!(schema.validate(&json!("ftp://example.com/a.png")).is_err());
        assert!(schema.validate(&json!("not a url")).is_err());
    }

    #[test]
    fn number_rules() {
        let positive: Schema = number().positive().into();
        assert!(positive.validate(&json!(0.5)).is_ok());
        assert_eq!(
            positive.validate(&json!(0)).unwrap_err()[0].code,
            issue::TOO_SMALL
        );
        assert_eq!(
            positive.validate(&json!("1")).unwrap_err()[0].code,
            issue::INVALID_TYPE
        );

        let bps: Schema = number().int().min(1.0).max(500.0).into();
        assert!(bps.validate(&json!(50)).is_ok());
        assert!(bps.validate(&json!(1.5)).is_err());
        assert_eq!(bps.validate(&json!(501)).unwrap_err()[0].code, issue::TOO_BIG);
    }

    #[test]
    fn number_coercion_and_clamp() {
        let limit: Schema = number().coerce().int().min(1.0).clamp_max(100.0).into();
        assert_eq!(limit.validate(&json!("30")).unwrap(), json!(30));
        assert_eq!(limit.validate(&json!(250)).unwrap(), json!(100));
        assert_eq!(limit.validate(&json!(100)).unwrap(), json!(100));
        assert!(limit.validate(&json!(0)).is_err());
        assert!(limit.validate(&json!("abc")).is_err());
    }

    #[test]
    fn integers_outside_the_safe_range_are_rejected() {
        let offset: Schema = number().coerce().int().min(0.0).into();
        let issues = offset.validate(&json!(1e20)).unwrap_err();
        assert_eq!(issues[0].code, issue::TOO_BIG);
        assert_eq!(
            issues[0].message,
            "Too big: expected int to be <=9007199254740991"
        );
        assert!(offset.validate(&json!("100000000000000000000")).is_err());
        assert_eq!(
            offset.validate(&json!(9_007_199_254_740_991_i64)).unwrap(),
            json!(9_007_199_254_740_991_i64)
        );

        let signed: Schema = number().int().into();
        assert_eq!(
            signed.validate(&json!(-1e20)).unwrap_err()[0].code,
            issue::TOO_SMALL
        );
    }

    #[test]
    fn object_collects_issues_in_declaration_order() {
        let schema: Schema = object(vec![
            Field::required("a", string().min(1)),
            Field::required("b", number()),
            Field::optional("c", boolean()),
        ])
        .into();
        let issues = schema.validate(&json!({"c": "yes", "a": ""})).unwrap_err();
        assert_eq!(paths(&issues), vec!["a", "b", "c"]);
        assert_eq!(
            issues[1].message,
            "Invalid input: expected number, received undefined"
        );
    }

    #[test]
    fn object_unknown_key_policies() {
        let base = object(vec![Field::required("a", number())]);

        let stripped = Schema::from(base.clone())
            .validate(&json!({"a": 1, "extra": true}))
            .unwrap();
        assert_eq!(stripped, json!({"a": 1}));

        let passed = Schema::from(base.clone().passthrough())
            .validate(&json!({"a": 1, "extra": true}))
            .unwrap();
        assert_eq!(passed, json!({"a": 1, "extra": true}));

        let issues = Schema::from(base.strict())
            .validate(&json!({"a": 1, "extra": true}))
            .unwrap_err();
        assert_eq!(issues[0].code, issue::UNRECOGNIZED_KEYS);
        assert!(issues[0].path.is_empty());
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let schema: Schema = object(vec![Field::with_default(
            "sort",
            enumeration(&["hot", "new"]),
            json!("hot"),
        )])
        .into();
        assert_eq!(schema.validate(&json!({})).unwrap(), json!({"sort": "hot"}));
        assert!(schema.validate(&json!({"sort": "cold"})).is_err());
    }

    #[test]
    fn nested_paths() {
        let schema: Schema = object(vec![Field::required(
            "items",
            array(object(vec![Field::required("id", string().uuid())])),
        )])
        .into();
        let issues = schema
            .validate(&json!({"items": [{"id": "6f1c2a4e-8a51-4a7e-9b0f-1f2d3c4b5a69"}, {"id": "x"}]}))
            .unwrap_err();
        assert_eq!(paths(&issues), vec!["items.1.id"]);
    }

    #[test]
    fn nullable_accepts_null_only_when_declared() {
        let schema: Schema = object(vec![Field::required("handle", nullable(string()))]).into();
        assert!(schema.validate(&json!({"handle": null})).is_ok());
        assert!(schema.validate(&json!({})).is_err());

        let plain: Schema = object(vec![Field::optional("handle", string())]).into();
        assert!(plain.validate(&json!({})).is_ok());
        assert!(plain.validate(&json!({"handle": null})).is_err());
    }

    #[test]
    fn union_dispatches_on_discriminator() {
        let schema = union(
            "kind",
            vec![
                ("a", object(vec![Field::required("kind", literal("a"))]).strict()),
                (
                    "b",
                    object(vec![
                        Field::required("kind", literal("b")),
                        Field::required("n", number()),
                    ])
                    .strict(),
                ),
            ],
        );
        assert!(schema.validate(&json!({"kind": "a"})).is_ok());
        assert!(schema.validate(&json!({"kind": "b"})).is_err());

        let issues = schema.validate(&json!({"kind": "c"})).unwrap_err();
        assert_eq!(issues[0].code, issue::INVALID_UNION_DISCRIMINATOR);
        assert_eq!(issues[0].path, vec!["kind".to_string()]);
    }

    #[test]
    fn refinements_run_after_fields_pass() {
        fn needs_b(map: &Map<String, Value>) -> Option<(&'static [&'static str], &'static str)> {
            const B: &[&str] = &["b"];
            (!map.contains_key("b")).then_some((B, "b is required when a is set"))
        }
        let schema: Schema = object(vec![
            Field::required("a", number()),
            Field::optional("b", number()),
        ])
        .refine(needs_b)
        .into();

        let issues = schema.validate(&json!({"a": 1})).unwrap_err();
        assert_eq!(issues[0].code, issue::CUSTOM);
        assert_eq!(paths(&issues), vec!["b"]);

        // Field failure short-circuits the refinement
        let issues = schema.validate(&json!({"a": "x"})).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, issue::INVALID_TYPE);
    }

    #[test]
    fn parse_wraps_validation_error() {
        let schema: Schema = string().min(1).into();
        let err = schema.parse(&json!("")).unwrap_err();
        assert_eq!(err.code, "VALIDATION_ERROR");
        assert_eq!(err.issues.as_ref().map(Vec::len), Some(1));
    }
}
