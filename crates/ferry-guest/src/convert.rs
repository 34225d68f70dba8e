//! Conversion between document values and guest (QuickJS) values.
//!
//! Host to guest is total. Guest to host follows `JSON.stringify` where it
//! can: `undefined` members are dropped, `toJSON` is honored, non-finite
//! numbers become `null`. Values with no document form (functions, symbols,
//! bigints) are rejected instead of silently vanishing.

use ferry_core::DocumentValue;
use rquickjs::{Array, Ctx, Object, Type, Value, function::This, object::Property};
use serde_json::{Map, Number};

use crate::error::{GuestError, GuestResult};

/// Deepest nesting accepted when reading a guest value. Cyclic structures
/// hit this bound.
pub(crate) const MAX_DEPTH: usize = 256;

/// Largest integer a double represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Build a guest value from a document value.
pub(crate) fn to_guest<'js>(ctx: &Ctx<'js>, value: &DocumentValue) -> rquickjs::Result<Value<'js>> {
    match value {
        DocumentValue::Null => Ok(Value::new_null(ctx.clone())),
        DocumentValue::Bool(b) => Ok(Value::new_bool(ctx.clone(), *b)),
        DocumentValue::Number(n) => Ok(number_to_guest(ctx, n)),
        DocumentValue::String(s) => {
            Ok(rquickjs::String::from_str(ctx.clone(), s)?.into_value())
        },
        DocumentValue::Array(items) => {
            let array = Array::new(ctx.clone())?;
            for (index, item) in items.iter().enumerate() {
                array.set(index, to_guest(ctx, item)?)?;
            }
            Ok(array.into_value())
        },
        DocumentValue::Object(members) => {
            let object = Object::new(ctx.clone())?;
            // Own data properties: plain assignment would route `__proto__`
            // to the prototype setter.
            for (key, item) in members {
                let value = to_guest(ctx, item)?;
                object.prop(
                    key.as_str(),
                    Property::from(value).writable().enumerable().configurable(),
                )?;
            }
            Ok(object.into_value())
        },
    }
}

fn number_to_guest<'js>(ctx: &Ctx<'js>, n: &Number) -> Value<'js> {
    match n.as_i64().and_then(|i| i32::try_from(i).ok()) {
        Some(small) => Value::new_int(ctx.clone(), small),
        None => Value::new_float(ctx.clone(), n.as_f64().unwrap_or(f64::NAN)),
    }
}

/// Read a guest value back into a document value.
pub(crate) fn from_guest(value: &Value<'_>) -> GuestResult<DocumentValue> {
    Ok(read(value, 0)?.unwrap_or(DocumentValue::Null))
}

/// `Ok(None)` means the value is `undefined`; the caller decides whether that
/// is dropped (object member) or becomes `null` (top level, array element).
fn read(value: &Value<'_>, depth: usize) -> GuestResult<Option<DocumentValue>> {
    if depth > MAX_DEPTH {
        return Err(GuestError::Marshal(format!(
            "value nested deeper than {MAX_DEPTH} levels (cyclic structure?)"
        )));
    }
    let next = depth.saturating_add(1);

    let ty = value.type_of();
    let doc = match ty {
        Type::Uninitialized | Type::Undefined => return Ok(None),
        Type::Null => DocumentValue::Null,
        Type::Bool => DocumentValue::Bool(value.as_bool().unwrap_or_default()),
        Type::Int => DocumentValue::from(value.as_int().unwrap_or_default()),
        Type::Float => float_to_document(value.as_float().unwrap_or(f64::NAN)),
        Type::String => {
            let text = match value.as_string() {
                Some(s) => s.to_string().map_err(|e| GuestError::Marshal(e.to_string()))?,
                None => String::new(),
            };
            DocumentValue::String(text)
        },
        Type::Array => {
            let array = value
                .as_array()
                .ok_or_else(|| unsupported("array"))?;
            let mut items = Vec::with_capacity(array.len());
            for item in array.iter::<Value>() {
                let item = item.map_err(|e| GuestError::Marshal(e.to_string()))?;
                items.push(read(&item, next)?.unwrap_or(DocumentValue::Null));
            }
            DocumentValue::Array(items)
        },
        Type::Object | Type::Exception => {
            let object = value
                .as_object()
                .ok_or_else(|| unsupported("object"))?;
            if let Some(replacement) = to_json(object)? {
                return read(&replacement, next);
            }
            let mut members = Map::new();
            for prop in object.props::<String, Value>() {
                let (key, item) = prop.map_err(|e| GuestError::Marshal(e.to_string()))?;
                if let Some(doc) = read(&item, next)? {
                    members.insert(key, doc);
                }
            }
            DocumentValue::Object(members)
        },
        other => return Err(unsupported(&format!("{other:?}").to_lowercase())),
    };
    Ok(Some(doc))
}

/// Call `object.toJSON()` when the object defines one (e.g. `Date`).
fn to_json<'js>(object: &Object<'js>) -> GuestResult<Option<Value<'js>>> {
    let method: Value = object
        .get("toJSON")
        .map_err(|e| GuestError::Marshal(e.to_string()))?;
    match method.as_function() {
        Some(method) => method
            .call::<_, Value>((This(object.clone()),))
            .map(Some)
            .map_err(|e| GuestError::Marshal(format!("toJSON failed: {e}"))),
        None => Ok(None),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn float_to_document(f: f64) -> DocumentValue {
    if !f.is_finite() {
        return DocumentValue::Null;
    }
    if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
        // Exact: the magnitude fits in 53 bits.
        return DocumentValue::from(f as i64);
    }
    Number::from_f64(f).map_or(DocumentValue::Null, DocumentValue::Number)
}

fn unsupported(what: &str) -> GuestError {
    GuestError::Marshal(format!("{what} values have no JSON representation"))
}

#[cfg(test)]
mod tests {
    use rquickjs::{Context, Runtime};
    use serde_json::json;

    use super::*;

    fn with_ctx<R>(f: impl FnOnce(Ctx<'_>) -> R) -> R {
        let runtime = Runtime::new().unwrap();
        let context = Context::full(&runtime).unwrap();
        context.with(f)
    }

    fn eval_doc(source: &str) -> GuestResult<DocumentValue> {
        with_ctx(|ctx| {
            let value: Value = ctx.eval(source).unwrap();
            from_guest(&value)
        })
    }

    #[test]
    fn document_reaches_guest_intact() {
        let doc = json!({"z": 1, "a": [true, null, "s", 2.5], "big": 9_007_199_254_740_991_i64});
        with_ctx(|ctx| {
            let value = to_guest(&ctx, &doc).unwrap();
            ctx.globals().set("doc", value).unwrap();
            let keys: String = ctx.eval("Object.keys(doc).join(',')").unwrap();
            assert_eq!(keys, "z,a,big");
            let kinds: String = ctx
                .eval("doc.a.map(v => v === null ? 'null' : typeof v).join(',')")
                .unwrap();
            assert_eq!(kinds, "boolean,null,string,number");
            let exact: bool = ctx.eval("doc.big === 9007199254740991").unwrap();
            assert!(exact);
        });
    }

    #[test]
    fn round_trips_through_guest() {
        let doc = json!({"user": {"id": 1, "tags": ["a", "b"], "score": -0.5}, "ok": false});
        let back = with_ctx(|ctx| {
            let value = to_guest(&ctx, &doc).unwrap();
            from_guest(&value).unwrap()
        });
        assert_eq!(back, doc);
    }

    #[test]
    fn undefined_handling() {
        assert_eq!(eval_doc("undefined").unwrap(), DocumentValue::Null);
        assert_eq!(eval_doc("[1, undefined, 3]").unwrap(), json!([1, null, 3]));
        assert_eq!(eval_doc("({a: 1, b: undefined})").unwrap(), json!({"a": 1}));
    }

    #[test]
    fn numbers_follow_json_rules() {
        assert_eq!(eval_doc("6 * 7").unwrap(), json!(42));
        assert_eq!(eval_doc("2 ** 40").unwrap(), json!(1_099_511_627_776_i64));
        assert_eq!(eval_doc("1.25").unwrap(), json!(1.25));
        assert_eq!(eval_doc("1 / 0").unwrap(), DocumentValue::Null);
        assert_eq!(eval_doc("NaN").unwrap(), DocumentValue::Null);
    }

    #[test]
    fn to_json_is_honored() {
        let doc = eval_doc("new Date(Date.UTC(2024, 0, 15, 9, 30, 5))").unwrap();
        assert_eq!(doc, json!("2024-01-15T09:30:05.000Z"));
        let doc = eval_doc("({ toJSON() { return { wrapped: true }; } })").unwrap();
        assert_eq!(doc, json!({"wrapped": true}));
    }

    #[test]
    fn functions_are_rejected() {
        let err = eval_doc("(function f() {})").unwrap_err();
        assert!(matches!(err, GuestError::Marshal(_)), "got: {err:?}");
        let err = eval_doc("({ f: () => 1 })").unwrap_err();
        assert!(matches!(err, GuestError::Marshal(_)), "got: {err:?}");
    }

    #[test]
    fn symbols_are_rejected() {
        let err = eval_doc("Symbol('s')").unwrap_err();
        assert!(matches!(err, GuestError::Marshal(_)), "got: {err:?}");
    }

    #[test]
    fn cycles_are_rejected() {
        let err = eval_doc("const o = {}; o.self = o; o").unwrap_err();
        match err {
            GuestError::Marshal(msg) => assert!(msg.contains("nested deeper")),
            other => panic!("expected Marshal, got: {other:?}"),
        }
    }

    #[test]
    fn proto_key_becomes_own_member() {
        let doc = json!({"__proto__": {"admin": true}, "b": 2});
        with_ctx(|ctx| {
            let value = to_guest(&ctx, &doc).unwrap();
            ctx.globals().set("doc", value.clone()).unwrap();

            let keys: String = ctx.eval("Object.keys(doc).join(',')").unwrap();
            assert_eq!(keys, "__proto__,b");
            let inherited: bool = ctx.eval("doc.admin === true").unwrap();
            assert!(!inherited);
            let plain: bool = ctx
                .eval("Object.getPrototypeOf(doc) === Object.prototype")
                .unwrap();
            assert!(plain);

            assert_eq!(from_guest(&value).unwrap(), doc);
        });
    }
}
