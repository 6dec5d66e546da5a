// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Declared parameter names of a native method.
//
// Positional arguments are zipped against these names to build the options
// map. Names are either given explicitly or parsed from a declaration such as
// `getPhotos(albumId, limit = 20, ...rest)`.

use std::collections::HashSet;

use capnative_core::error::{NativeError, Result};

/// Ordered parameter names; length equals the method's declared arity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodSignature {
    params: Vec<String>,
}

impl MethodSignature {
    /// A method that declares no parameters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from explicit names. Names must be identifiers and unique.
    pub fn new<I, S>(params: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let params: Vec<String> = params.into_iter().map(Into::into).collect();
        let mut seen = HashSet::new();
        for name in &params {
            if !is_identifier(name) {
                return Err(NativeError::config(format!(
                    "`{name}` is not a valid parameter name"
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(NativeError::config(format!(
                    "parameter `{name}` is declared twice"
                )));
            }
        }
        Ok(Self { params })
    }

    /// Parse the parameter list out of a method declaration.
    ///
    /// Accepts defaults (`a = 1`), rest parameters (`...rest`) and type
    /// annotations (`a: string`). Destructuring patterns have no name to zip
    /// against and are rejected.
    pub fn parse(declaration: &str) -> Result<Self> {
        let malformed = || {
            NativeError::config(format!(
                "could not read parameter names from `{declaration}`"
            ))
        };

        let open = declaration.find('(').ok_or_else(malformed)?;
        let close = matching_paren(declaration, open).ok_or_else(malformed)?;
        let list = &declaration[open + 1..close];

        let mut names = Vec::new();
        for raw in split_top_level(list, ',') {
            let param = raw.trim();
            if param.is_empty() {
                // Trailing comma.
                continue;
            }
            let param = split_top_level(param, '=').next().unwrap_or(param);
            let param = split_top_level(param, ':').next().unwrap_or(param);
            let param = param.trim();
            let param = param.strip_prefix("...").unwrap_or(param).trim();
            let param = param.strip_suffix('?').unwrap_or(param);
            if param.starts_with('{') || param.starts_with('[') {
                return Err(NativeError::config(format!(
                    "destructured parameter `{}` in `{declaration}` has no name",
                    raw.trim()
                )));
            }
            names.push(param.to_owned());
        }

        Self::new(names)
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on `sep` where it is not nested in brackets or a string literal.
fn split_top_level(text: &str, sep: char) -> impl Iterator<Item = &str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    let mut prev = ' ';
    for (i, c) in text.char_indices() {
        let before = std::mem::replace(&mut prev, c);
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            // `=>` is an arrow, not a closing generic.
            '>' if before == '=' => {}
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth -= 1,
            _ if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts.into_iter()
}
