//! `${path.to.value}` substitution in raw document text.
//!
//! A file input is expanded against the part of the namespace resolved so far
//! before it is decoded, so it can refer to `${Env.HOME}` or to a previously
//! resolved input. `$$` produces a literal `$`. List elements are addressed by
//! index (`${db.0.host}`).

use types::{ExpandError, Mapping, Value};

enum Piece<'a> {
    Text(&'a str),
    Reference(&'a str),
}

/// Replace every `${...}` reference in `text` with the scalar it names in `scope`
pub fn expand(text: &str, scope: &Mapping) -> Result<String, ExpandError> {
    let mut out = String::with_capacity(text.len());

    for piece in pieces(text)? {
        match piece {
            Piece::Text(s) => out.push_str(s),
            Piece::Reference(path) => {
                let value = lookup(scope, path)?;
                let text = value
                    .scalar_text()
                    .ok_or_else(|| ExpandError::NonScalar(path.to_string()))?;
                out.push_str(&text);
            }
        }
    }

    Ok(out)
}

/// Top-level names referenced by `text`, in first-use order without duplicates
pub fn references(text: &str) -> Result<Vec<String>, ExpandError> {
    let mut heads: Vec<String> = Vec::new();

    for piece in pieces(text)? {
        if let Piece::Reference(path) = piece {
            let head = segments(path)?[0];
            if !heads.iter().any(|h| h == head) {
                heads.push(head.to_string());
            }
        }
    }

    Ok(heads)
}

fn pieces(text: &str) -> Result<Vec<Piece<'_>>, ExpandError> {
    let mut out = Vec::new();
    let mut rest = text;

    while let Some(pos) = rest.find('$') {
        if pos > 0 {
            out.push(Piece::Text(&rest[..pos]));
        }
        let after = &rest[pos + 1..];

        if let Some(stripped) = after.strip_prefix('$') {
            out.push(Piece::Text("$"));
            rest = stripped;
        } else if let Some(body) = after.strip_prefix('{') {
            let end = body.find('}').ok_or(ExpandError::Unclosed)?;
            out.push(Piece::Reference(body[..end].trim()));
            rest = &body[end + 1..];
        } else {
            // lone $
            out.push(Piece::Text("$"));
            rest = after;
        }
    }

    if !rest.is_empty() {
        out.push(Piece::Text(rest));
    }

    Ok(out)
}

fn segments(path: &str) -> Result<Vec<&str>, ExpandError> {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(ExpandError::InvalidPath(path.to_string()));
    }
    Ok(parts)
}

fn lookup<'a>(scope: &'a Mapping, path: &str) -> Result<&'a Value, ExpandError> {
    let parts = segments(path)?;
    let not_found = || ExpandError::NotFound(path.to_string());

    let mut current = scope.get(parts[0]).ok_or_else(not_found)?;
    for part in &parts[1..] {
        current = match current {
            Value::Mapping(map) => map.get(*part),
            Value::List(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
        .ok_or_else(not_found)?;
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Mapping {
        let env: Value = [("HOME", "/root"), ("USER", "ops")].into_iter().collect();
        let row: Value = [("host", "db1")].into_iter().collect();
        let site: Value = [
            ("port", Value::Integer(8080)),
            ("rows", Value::List(vec![row])),
            ("nested", Value::mapping()),
        ]
        .into_iter()
        .collect();

        let mut scope = Mapping::new();
        scope.insert("Env".into(), env);
        scope.insert("site".into(), site);
        scope
    }

    #[test]
    fn test_expand_scalars() {
        let out = expand("home: ${Env.HOME}\nport: ${ site.port }\n", &scope()).unwrap();
        assert_eq!(out, "home: /root\nport: 8080\n");
    }

    #[test]
    fn test_expand_list_index() {
        assert_eq!(expand("${site.rows.0.host}", &scope()).unwrap(), "db1");
    }

    #[test]
    fn test_dollar_escapes() {
        assert_eq!(expand("cost: $$5 and $x", &scope()).unwrap(), "cost: $5 and $x");
        assert_eq!(expand("$${Env.HOME}", &scope()).unwrap(), "${Env.HOME}");
    }

    #[test]
    fn test_expand_errors() {
        assert_eq!(expand("${Env.HOME", &scope()).unwrap_err(), ExpandError::Unclosed);
        assert_eq!(
            expand("${Env..HOME}", &scope()).unwrap_err(),
            ExpandError::InvalidPath("Env..HOME".into())
        );
        assert_eq!(
            expand("${Env.SHELL}", &scope()).unwrap_err(),
            ExpandError::NotFound("Env.SHELL".into())
        );
        assert_eq!(
            expand("${site.nested}", &scope()).unwrap_err(),
            ExpandError::NonScalar("site.nested".into())
        );
    }

    #[test]
    fn test_references_returns_unique_heads() {
        let heads = references("${Env.HOME} ${site.port} ${Env.USER} $${skipped.x}").unwrap();
        assert_eq!(heads, ["Env", "site"]);
    }

    #[test]
    fn test_text_without_references_is_unchanged() {
        let text = "plain: value\n";
        assert_eq!(expand(text, &Mapping::new()).unwrap(), text);
        assert!(references(text).unwrap().is_empty());
    }
}
