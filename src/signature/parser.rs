//! Reduction of the player asset's signature function to a `SignatureProgram`.
//!
//! The player source is never executed. We locate the function the stream
//! URL builder calls on the `s` parameter, then map each statement of its
//! body onto one of the known primitives. Anything else is a parse failure.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::signature::program::{SignatureOp, SignatureProgram};

/// Patterns naming the signature function, most specific first.
static ENTRY_POINT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"\b[cs]\s*&&\s*[adf]\.set\([^,]+\s*,\s*encodeURIComponent\s*\(\s*([a-zA-Z0-9$]+)\("#,
        r#"\b[a-zA-Z0-9]+\s*&&\s*[a-zA-Z0-9]+\.set\([^,]+\s*,\s*encodeURIComponent\s*\(\s*([a-zA-Z0-9$]+)\("#,
        r#"\.sig\|\|([a-zA-Z0-9$]+)\("#,
        r#""signature"\s*,\s*([a-zA-Z0-9$]+)\("#,
        r#"([a-zA-Z0-9$]+)\s*=\s*function\(\s*a\s*\)\s*\{\s*a\s*=\s*a\.split\(\s*""\s*\)"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static HELPER_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^([a-zA-Z0-9$]+)\s*(?:\.\s*([a-zA-Z0-9$]+)|\[\s*"([^"]+)"\s*\])\s*\(\s*([a-zA-Z0-9$]+)\s*(?:,\s*(\d+)\s*)?\)$"#,
    )
    .unwrap()
});

static HELPER_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-zA-Z0-9$]+|"[^"]+")\s*:\s*function\s*\(([^)]*)\)\s*\{([^}]*)\}"#).unwrap()
});

static DIRECT_SPLICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([a-zA-Z0-9$]+)\.splice\(\s*0\s*,\s*(\d+)\s*\)$"#).unwrap()
});

static DIRECT_SLICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([a-zA-Z0-9$]+)\s*=\s*([a-zA-Z0-9$]+)\.slice\(\s*(\d+)\s*\)$"#).unwrap()
});

static DIRECT_REVERSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^([a-zA-Z0-9$]+)\.reverse\(\s*\)$"#).unwrap());

/// Kind of primitive a helper method implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HelperKind {
    Reverse,
    Swap,
    Slice,
}

/// Parse player source into a signature program.
pub fn parse_player(source: &str) -> Result<SignatureProgram> {
    let name = find_entry_point(source)?;
    tracing::debug!("Signature function: {}", name);

    let (param, body) = find_function_body(source, &name)?;
    let statements: Vec<&str> = body
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut helpers: Option<(String, HashMap<String, HelperKind>)> = None;
    let mut ops = Vec::new();

    for statement in statements {
        if is_split(statement, &param) || is_join(statement, &param) {
            continue;
        }

        if let Some(op) = parse_direct(statement, &param)? {
            ops.push(op);
            continue;
        }

        let caps = HELPER_CALL.captures(statement).ok_or_else(|| {
            Error::Decryption(format!("unsupported statement in signature function: {}", statement))
        })?;

        let object = &caps[1];
        let method = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or_default();
        if &caps[4] != param {
            return Err(Error::Decryption(format!(
                "helper call does not operate on the signature array: {}",
                statement
            )));
        }
        let argument = caps
            .get(5)
            .map(|m| m.as_str().parse::<usize>())
            .transpose()
            .map_err(|e| Error::Decryption(format!("bad helper argument: {}", e)))?
            .unwrap_or(0);

        if helpers.as_ref().map(|(n, _)| n.as_str()) != Some(object) {
            helpers = Some((object.to_string(), parse_helper_object(source, object)?));
        }
        let kinds = helpers.as_ref().map(|(_, k)| k);
        let kind = kinds.and_then(|k| k.get(method)).ok_or_else(|| {
            Error::Decryption(format!("unknown helper method {}.{}", object, method))
        })?;

        ops.push(match kind {
            HelperKind::Reverse => SignatureOp::Reverse,
            HelperKind::Swap => SignatureOp::Swap(argument),
            HelperKind::Slice => SignatureOp::Slice(argument),
        });
    }

    if ops.is_empty() {
        return Err(Error::Decryption(
            "signature function contains no transform steps".to_string(),
        ));
    }

    Ok(SignatureProgram::new(ops))
}

fn find_entry_point(source: &str) -> Result<String> {
    ENTRY_POINT_PATTERNS
        .iter()
        .find_map(|re| re.captures(source).map(|c| c[1].to_string()))
        .ok_or_else(|| Error::Decryption("could not locate signature function".to_string()))
}

/// Returns the first parameter name and the body of the named function.
fn find_function_body(source: &str, name: &str) -> Result<(String, String)> {
    let escaped = regex::escape(name);
    let pattern = format!(
        r#"(?:function\s+{0}|(?:^|[{{;,\s]){0}\s*=\s*function)\s*\(([^)]*)\)\s*\{{([^}}]+)\}}"#,
        escaped
    );
    let re = Regex::new(&pattern)
        .map_err(|e| Error::Decryption(format!("bad function pattern: {}", e)))?;

    let caps = re.captures(source).ok_or_else(|| {
        Error::Decryption(format!("could not find body of signature function {}", name))
    })?;

    let param = caps[1]
        .split(',')
        .next()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Error::Decryption("signature function takes no argument".to_string()))?
        .to_string();

    Ok((param, caps[2].to_string()))
}

fn parse_helper_object(source: &str, object: &str) -> Result<HashMap<String, HelperKind>> {
    let pattern = format!(
        r#"(?:var\s+|[;,\s]){}\s*=\s*\{{([\s\S]*?)\}}\s*;"#,
        regex::escape(object)
    );
    let re = Regex::new(&pattern)
        .map_err(|e| Error::Decryption(format!("bad helper pattern: {}", e)))?;
    let caps = re.captures(source).ok_or_else(|| {
        Error::Decryption(format!("could not find helper object {}", object))
    })?;
    let body = &caps[1];

    let mut kinds = HashMap::new();
    for method in HELPER_METHOD.captures_iter(body) {
        let name = method[1].trim_matches('"').to_string();
        let code = &method[3];
        // Swaps may be written with splice, so the modulo check comes first.
        let kind = if code.contains('%') && code.contains("length") {
            HelperKind::Swap
        } else if code.contains("reverse") {
            HelperKind::Reverse
        } else if code.contains("splice") || code.contains("slice") {
            HelperKind::Slice
        } else {
            return Err(Error::Decryption(format!(
                "unsupported helper method {}.{}: {}",
                object, name, code
            )));
        };
        kinds.insert(name, kind);
    }

    if kinds.is_empty() {
        return Err(Error::Decryption(format!("helper object {} has no methods", object)));
    }

    Ok(kinds)
}

fn parse_direct(statement: &str, param: &str) -> Result<Option<SignatureOp>> {
    if let Some(c) = DIRECT_REVERSE.captures(statement) {
        if &c[1] == param {
            return Ok(Some(SignatureOp::Reverse));
        }
    }
    if let Some(c) = DIRECT_SPLICE.captures(statement) {
        if &c[1] == param {
            return parse_count(&c[2]).map(|n| Some(SignatureOp::Slice(n)));
        }
    }
    if let Some(c) = DIRECT_SLICE.captures(statement) {
        if &c[1] == param && &c[2] == param {
            return parse_count(&c[3]).map(|n| Some(SignatureOp::Slice(n)));
        }
    }
    Ok(None)
}

fn parse_count(value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|e| Error::Decryption(format!("bad count '{}': {}", value, e)))
}

fn is_split(statement: &str, param: &str) -> bool {
    let compact: String = statement.chars().filter(|c| !c.is_whitespace()).collect();
    compact == format!("{0}={0}.split(\"\")", param)
}

fn is_join(statement: &str, param: &str) -> bool {
    let compact: String = statement.chars().filter(|c| !c.is_whitespace()).collect();
    compact == format!("return{}.join(\"\")", param)
}
