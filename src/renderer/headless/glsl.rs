//! GLSL interface scanner
//!
//! Extracts the active-uniform names a GL driver would report for a stage:
//! plain uniforms as `name`, arrays as `name[i]`, struct members as
//! `name.field`, nested as deep as the declarations go. Conditional
//! directives are evaluated first, so declarations inside disabled regions
//! never become active. Members of uniform blocks are reported on their own:
//! they are active but buffer-backed, so they never get a location.
//!
//! Only the global declaration level is inspected; function bodies are
//! skipped wholesale.

use rustc_hash::FxHashMap;

type Defines = FxHashMap<String, String>;

/// Nesting limit for object-like macros expanded inside `#if` expressions.
const MAX_EXPANSION_DEPTH: usize = 16;

const QUALIFIERS: &[&str] = &[
    "const",
    "lowp",
    "mediump",
    "highp",
    "flat",
    "smooth",
    "noperspective",
    "invariant",
    "precise",
];

const BUILTIN_TYPES: &[&str] = &[
    "bool", "int", "uint", "float", "double", "vec2", "vec3", "vec4", "ivec2", "ivec3", "ivec4",
    "uvec2", "uvec3", "uvec4", "bvec2", "bvec3", "bvec4", "dvec2", "dvec3", "dvec4", "mat2",
    "mat3", "mat4", "mat2x2", "mat2x3", "mat2x4", "mat3x2", "mat3x3", "mat3x4", "mat4x2",
    "mat4x3", "mat4x4",
];

fn is_builtin_type(name: &str) -> bool {
    BUILTIN_TYPES.contains(&name)
        || name.starts_with("sampler")
        || name.starts_with("isampler")
        || name.starts_with("usampler")
}

#[derive(Debug)]
struct Declarator {
    name: String,
    array_len: Option<usize>,
}

#[derive(Debug)]
struct Field {
    ty: String,
    declarator: Declarator,
}

/// Uniform interface of one compiled stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StageInterface {
    /// Default-block uniforms in declaration order.
    pub uniforms: Vec<String>,
    /// Uniform-block members. Prefixed `Block.` when the block has an instance name.
    pub block_members: Vec<String>,
}

/// Scans a stage source and returns its flattened uniform interface.
///
/// `Err` holds a compiler-style diagnostic.
pub(crate) fn scan_interface(source: &str) -> Result<StageInterface, String> {
    if source.trim().is_empty() {
        return Err("ERROR: 0:0: empty shader source".to_string());
    }

    let (body, defines) = preprocess(&strip_comments(source))?;
    let tokens = tokenize(&body);
    let statements = split_statements(&tokens)?;

    let mut structs: FxHashMap<String, Vec<Field>> = FxHashMap::default();
    let mut interface = StageInterface::default();
    let mut has_main = false;

    for statement in &statements {
        let statement = skip_layout(statement);
        let Some(&first) = statement.first() else {
            continue;
        };

        match first {
            "struct" => {
                let (name, fields) = parse_struct(statement, &structs, &defines)?;
                structs.insert(name, fields);
            }
            "uniform" if statement.get(2) == Some(&"{") => {
                parse_block(&statement[1..], &structs, &defines, &mut interface.block_members)?;
            }
            "uniform" => {
                let (ty, declarators) = parse_declaration(&statement[1..], &defines)?;
                check_type(&ty, &structs)?;
                for declarator in declarators {
                    flatten(
                        &declarator.name,
                        &ty,
                        declarator.array_len,
                        &structs,
                        &mut interface.uniforms,
                    );
                }
            }
            "precision" => {}
            _ => {
                if is_main_definition(statement) {
                    has_main = true;
                }
            }
        }
    }

    if !has_main {
        return Err("ERROR: 0:0: missing entry point 'main'".to_string());
    }

    Ok(interface)
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '/' {
            match chars.peek() {
                Some('/') => {
                    for c in chars.by_ref() {
                        if c == '\n' {
                            out.push('\n');
                            break;
                        }
                    }
                    continue;
                }
                Some('*') => {
                    chars.next();
                    let mut prev = '\0';
                    for c in chars.by_ref() {
                        if c == '\n' {
                            out.push('\n');
                        }
                        if prev == '*' && c == '/' {
                            break;
                        }
                        prev = c;
                    }
                    out.push(' ');
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }

    out
}

/// One `#if` / `#ifdef` / `#ifndef` group.
#[derive(Debug, Clone, Copy)]
struct Conditional {
    /// The enclosing region is emitted.
    parent: bool,
    /// Some branch of this group was already taken.
    taken: bool,
    /// The current branch is emitted.
    active: bool,
}

fn directive_error(line: usize, directive: &str, message: &str) -> String {
    format!("ERROR: 0:{line}: '{directive}' : {message}")
}

/// Evaluates conditional directives, collects `#define`s and drops every
/// directive line. Lines in disabled regions are blanked, keeping line numbers.
fn preprocess(source: &str) -> Result<(String, Defines), String> {
    let mut body = String::with_capacity(source.len());
    let mut defines = Defines::default();
    let mut groups: Vec<Conditional> = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let line_no = index + 1;
        let active = groups.last().is_none_or(|group| group.active);

        let Some(directive) = line.trim_start().strip_prefix('#') else {
            if active {
                body.push_str(line);
            }
            body.push('\n');
            continue;
        };
        body.push('\n');

        let directive = directive.trim();
        let (keyword, rest) = directive
            .split_once(char::is_whitespace)
            .map_or((directive, ""), |(keyword, rest)| (keyword, rest.trim()));

        match keyword {
            "if" => {
                let taken = active && eval_condition(rest, &defines, line_no)?;
                groups.push(Conditional {
                    parent: active,
                    taken,
                    active: taken,
                });
            }
            "ifdef" | "ifndef" => {
                if rest.is_empty() {
                    return Err(directive_error(line_no, keyword, "macro name expected"));
                }
                let taken = active && (defines.contains_key(rest) == (keyword == "ifdef"));
                groups.push(Conditional {
                    parent: active,
                    taken,
                    active: taken,
                });
            }
            "elif" => {
                let group = groups
                    .last_mut()
                    .ok_or_else(|| directive_error(line_no, "#elif", "without matching #if"))?;
                let enabled =
                    group.parent && !group.taken && eval_condition(rest, &defines, line_no)?;
                group.active = enabled;
                group.taken |= enabled;
            }
            "else" => {
                let group = groups
                    .last_mut()
                    .ok_or_else(|| directive_error(line_no, "#else", "without matching #if"))?;
                group.active = group.parent && !group.taken;
                group.taken = true;
            }
            "endif" => {
                groups
                    .pop()
                    .ok_or_else(|| directive_error(line_no, "#endif", "without matching #if"))?;
            }
            _ if !active => {}
            "define" => {
                let (name, value) = rest
                    .split_once(char::is_whitespace)
                    .unwrap_or((rest, ""));
                let name = name.find('(').map_or(name, |open| &name[..open]);
                if !is_identifier(name) {
                    return Err(directive_error(line_no, "#define", "macro name expected"));
                }
                defines.insert(name.to_string(), value.trim().to_string());
            }
            "undef" => {
                defines.remove(rest);
            }
            "error" => return Err(directive_error(line_no, "#error", rest)),
            _ => {}
        }
    }

    if !groups.is_empty() {
        return Err("ERROR: 0:0: '#if' : unterminated conditional directive".to_string());
    }

    Ok((body, defines))
}

fn eval_condition(expr: &str, defines: &Defines, line: usize) -> Result<bool, String> {
    eval_expression(expr, defines, line, 0).map(|value| value != 0)
}

fn eval_expression(expr: &str, defines: &Defines, line: usize, depth: usize) -> Result<i64, String> {
    if depth > MAX_EXPANSION_DEPTH {
        return Err(directive_error(line, "#if", "macro expansion too deep"));
    }
    let tokens = condition_tokens(expr);
    if tokens.is_empty() {
        return Err(directive_error(line, "#if", "expression expected"));
    }

    let mut parser = ConditionParser {
        tokens: &tokens,
        pos: 0,
        defines,
        line,
        depth,
    };
    let value = parser.or()?;
    if parser.pos != tokens.len() {
        return Err(parser.error());
    }
    Ok(value)
}

fn condition_tokens(expr: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = expr.trim_start();

    while let Some(c) = rest.chars().next() {
        let len = if c.is_ascii_alphanumeric() || c == '_' {
            rest.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len())
        } else if ["&&", "||", "==", "!=", "<=", ">="]
            .iter()
            .any(|op| rest.starts_with(op))
        {
            2
        } else {
            c.len_utf8()
        };
        tokens.push(&rest[..len]);
        rest = rest[len..].trim_start();
    }

    tokens
}

/// Recursive-descent evaluator for `#if` expressions: integer literals,
/// macros, `defined`, `!`, unary `-`, `+ -`, comparisons, `&&` and `||`.
/// Undefined identifiers evaluate to zero.
struct ConditionParser<'t, 'a> {
    tokens: &'t [&'a str],
    pos: usize,
    defines: &'t Defines,
    line: usize,
    depth: usize,
}

impl<'a> ConditionParser<'_, 'a> {
    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<&'a str> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self) -> String {
        let near = self.peek().unwrap_or("end of line");
        directive_error(self.line, "#if", &format!("syntax error near '{near}'"))
    }

    fn or(&mut self) -> Result<i64, String> {
        let mut value = self.and()?;
        while self.eat("||") {
            let rhs = self.and()?;
            value = i64::from(value != 0 || rhs != 0);
        }
        Ok(value)
    }

    fn and(&mut self) -> Result<i64, String> {
        let mut value = self.comparison()?;
        while self.eat("&&") {
            let rhs = self.comparison()?;
            value = i64::from(value != 0 && rhs != 0);
        }
        Ok(value)
    }

    fn comparison(&mut self) -> Result<i64, String> {
        let lhs = self.additive()?;
        let Some(op @ ("==" | "!=" | "<" | ">" | "<=" | ">=")) = self.peek() else {
            return Ok(lhs);
        };
        self.pos += 1;
        let rhs = self.additive()?;
        Ok(i64::from(match op {
            "==" => lhs == rhs,
            "!=" => lhs != rhs,
            "<" => lhs < rhs,
            ">" => lhs > rhs,
            "<=" => lhs <= rhs,
            _ => lhs >= rhs,
        }))
    }

    fn additive(&mut self) -> Result<i64, String> {
        let mut value = self.unary()?;
        loop {
            if self.eat("+") {
                value = value.wrapping_add(self.unary()?);
            } else if self.eat("-") {
                value = value.wrapping_sub(self.unary()?);
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> Result<i64, String> {
        if self.eat("!") {
            return Ok(i64::from(self.unary()? == 0));
        }
        if self.eat("-") {
            return Ok(self.unary()?.wrapping_neg());
        }
        if self.eat("(") {
            let value = self.or()?;
            if !self.eat(")") {
                return Err(self.error());
            }
            return Ok(value);
        }

        let token = self.next().ok_or_else(|| self.error())?;
        if token == "defined" {
            let paren = self.eat("(");
            let name = self
                .next()
                .filter(|name| is_identifier(name))
                .ok_or_else(|| self.error())?;
            if paren && !self.eat(")") {
                return Err(self.error());
            }
            return Ok(i64::from(self.defines.contains_key(name)));
        }
        if let Some(value) = parse_int(token) {
            return Ok(value);
        }
        if is_identifier(token) {
            return match self.defines.get(token) {
                Some(value) => eval_expression(value, self.defines, self.line, self.depth + 1),
                None => Ok(0),
            };
        }
        Err(directive_error(
            self.line,
            "#if",
            &format!("syntax error near '{token}'"),
        ))
    }
}

fn tokenize(source: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let bytes = source.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
        } else if c.is_ascii_alphanumeric() || c == b'_' {
            let start = i;
            let numeric = c.is_ascii_digit();
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric()
                    || bytes[i] == b'_'
                    || (numeric && bytes[i] == b'.'))
            {
                i += 1;
            }
            tokens.push(&source[start..i]);
        } else {
            // Multi-byte characters only appear outside identifiers; step over the whole char.
            let width = source[i..].chars().next().map_or(1, char::len_utf8);
            tokens.push(&source[i..i + width]);
            i += width;
        }
    }

    tokens
}

/// Splits the token stream into global-scope statements.
///
/// A statement ends at `;` on depth zero. A function definition also ends at
/// the `}` closing its body; struct and block declarations run on to their `;`.
fn split_statements<'a>(tokens: &[&'a str]) -> Result<Vec<Vec<&'a str>>, String> {
    let mut statements = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;

    for &token in tokens {
        match token {
            "{" => {
                depth += 1;
                current.push(token);
            }
            "}" => {
                if depth == 0 {
                    return Err("ERROR: 0:0: syntax error, unexpected '}'".to_string());
                }
                depth -= 1;
                current.push(token);
                if depth == 0 && is_function_definition(&current) {
                    statements.push(std::mem::take(&mut current));
                }
            }
            ";" if depth == 0 => {
                if !current.is_empty() {
                    statements.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(token),
        }
    }

    if depth != 0 {
        return Err("ERROR: 0:0: syntax error, unexpected end of file, missing '}'".to_string());
    }
    if !current.is_empty() {
        return Err("ERROR: 0:0: syntax error, unexpected end of file, missing ';'".to_string());
    }

    Ok(statements)
}

/// A parameter list before the first `{`.
fn is_function_definition(statement: &[&str]) -> bool {
    skip_layout(statement)
        .iter()
        .take_while(|&&t| t != "{")
        .any(|&t| t == "(")
}

fn skip_layout<'s, 'a>(statement: &'s [&'a str]) -> &'s [&'a str] {
    if statement.first() != Some(&"layout") {
        return statement;
    }
    match statement.iter().position(|&t| t == ")") {
        Some(close) => &statement[close + 1..],
        None => statement,
    }
}

fn is_main_definition(statement: &[&str]) -> bool {
    statement.ends_with(&["}"])
        && statement
            .windows(3)
            .any(|w| w[0] == "void" && w[1] == "main" && w[2] == "(")
}

fn parse_struct(
    statement: &[&str],
    structs: &FxHashMap<String, Vec<Field>>,
    defines: &Defines,
) -> Result<(String, Vec<Field>), String> {
    let name = statement
        .get(1)
        .filter(|t| is_identifier(t))
        .ok_or_else(|| "ERROR: 0:0: struct declaration without a name".to_string())?;

    let open = statement
        .iter()
        .position(|&t| t == "{")
        .ok_or_else(|| format!("ERROR: 0:0: '{name}' : struct body expected"))?;
    let close = statement
        .iter()
        .rposition(|&t| t == "}")
        .filter(|&close| close > open)
        .ok_or_else(|| format!("ERROR: 0:0: '{name}' : struct body not terminated"))?;

    let fields = parse_members(&statement[open + 1..close], structs, defines)?;
    Ok(((*name).to_string(), fields))
}

/// Flattens a uniform block (`Block { members } [instance]`, without the
/// leading `uniform`) into `out`.
fn parse_block(
    tokens: &[&str],
    structs: &FxHashMap<String, Vec<Field>>,
    defines: &Defines,
    out: &mut Vec<String>,
) -> Result<(), String> {
    let [block, "{", rest @ ..] = tokens else {
        return Err("ERROR: 0:0: uniform block without a name".to_string());
    };
    let close = rest
        .iter()
        .rposition(|&t| t == "}")
        .ok_or_else(|| format!("ERROR: 0:0: '{block}' : uniform block not terminated"))?;

    let fields = parse_members(&rest[..close], structs, defines)?;
    let prefix = match &rest[close + 1..] {
        [] => None,
        [instance] | [instance, "[", _, "]"] if is_identifier(instance) => Some(*block),
        trailing => {
            return Err(format!(
                "ERROR: 0:0: '{block}' : unexpected '{}' after uniform block",
                trailing.concat()
            ));
        }
    };

    for field in fields {
        let name = match prefix {
            Some(block) => format!("{block}.{}", field.declarator.name),
            None => field.declarator.name,
        };
        flatten(&name, &field.ty, field.declarator.array_len, structs, out);
    }
    Ok(())
}

/// Member declarations of a struct or block body.
fn parse_members(
    tokens: &[&str],
    structs: &FxHashMap<String, Vec<Field>>,
    defines: &Defines,
) -> Result<Vec<Field>, String> {
    let mut fields = Vec::new();
    for member in tokens.split(|&t| t == ";") {
        let member = skip_layout(member);
        if member.is_empty() {
            continue;
        }
        let (ty, declarators) = parse_declaration(member, defines)?;
        check_type(&ty, structs)?;
        fields.extend(declarators.into_iter().map(|declarator| Field {
            ty: ty.clone(),
            declarator,
        }));
    }
    Ok(fields)
}

/// Parses `[qualifiers] type name[N] [= init], name2 ...` without the trailing `;`.
fn parse_declaration(
    tokens: &[&str],
    defines: &Defines,
) -> Result<(String, Vec<Declarator>), String> {
    let mut rest = tokens;
    while let Some((first, tail)) = rest.split_first()
        && QUALIFIERS.contains(first)
    {
        rest = tail;
    }

    let (ty, rest) = rest
        .split_first()
        .ok_or_else(|| "ERROR: 0:0: syntax error, type expected".to_string())?;

    let mut declarators = Vec::new();
    for part in split_top_level(rest) {
        let (name, suffix) = part
            .split_first()
            .filter(|(name, _)| is_identifier(name))
            .ok_or_else(|| format!("ERROR: 0:0: '{ty}' : declarator name expected"))?;

        let shape = match suffix.iter().position(|&t| t == "=") {
            Some(eq) if eq + 1 == suffix.len() => {
                return Err(format!("ERROR: 0:0: '{name}' : initializer expected"));
            }
            Some(eq) => &suffix[..eq],
            None => suffix,
        };

        let array_len = match shape {
            [] => None,
            ["[", size, "]"] => Some(array_size(size, defines)?),
            _ => {
                return Err(format!(
                    "ERROR: 0:0: '{name}' : unsupported declarator '{}'",
                    shape.concat()
                ));
            }
        };

        declarators.push(Declarator {
            name: (*name).to_string(),
            array_len,
        });
    }

    Ok(((*ty).to_string(), declarators))
}

/// Splits declarators on commas outside parentheses and brackets.
fn split_top_level<'s, 'a>(tokens: &'s [&'a str]) -> Vec<&'s [&'a str]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, &token) in tokens.iter().enumerate() {
        match token {
            "(" | "[" => depth += 1,
            ")" | "]" => depth = depth.saturating_sub(1),
            "," if depth == 0 => {
                parts.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&tokens[start..]);
    parts
}

fn parse_int(token: &str) -> Option<i64> {
    let digits = token.trim_end_matches(['u', 'U']);
    match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).ok(),
        None => digits.parse().ok(),
    }
}

fn array_size(token: &str, defines: &Defines) -> Result<usize, String> {
    parse_int(token)
        .or_else(|| defines.get(token).and_then(|value| parse_int(value)))
        .and_then(|size| usize::try_from(size).ok())
        .filter(|&size| size > 0)
        .ok_or_else(|| {
            format!("ERROR: 0:0: '{token}' : array size must be a positive constant integer expression")
        })
}

fn check_type(ty: &str, structs: &FxHashMap<String, Vec<Field>>) -> Result<(), String> {
    if is_builtin_type(ty) || structs.contains_key(ty) {
        Ok(())
    } else {
        Err(format!("ERROR: 0:0: '{ty}' : undeclared identifier"))
    }
}

fn is_identifier(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
}

fn flatten(
    name: &str,
    ty: &str,
    array_len: Option<usize>,
    structs: &FxHashMap<String, Vec<Field>>,
    out: &mut Vec<String>,
) {
    match array_len {
        Some(len) => {
            for i in 0..len {
                flatten_element(&format!("{name}[{i}]"), ty, structs, out);
            }
        }
        None => flatten_element(name, ty, structs, out),
    }
}

fn flatten_element(
    name: &str,
    ty: &str,
    structs: &FxHashMap<String, Vec<Field>>,
    out: &mut Vec<String>,
) {
    match structs.get(ty) {
        Some(fields) => {
            for field in fields {
                flatten(
                    &format!("{name}.{}", field.declarator.name),
                    &field.ty,
                    field.declarator.array_len,
                    structs,
                    out,
                );
            }
        }
        None => out.push(name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniforms(src: &str) -> Vec<String> {
        scan_interface(src).unwrap().uniforms
    }

    #[test]
    fn test_plain_uniforms() {
        let src = "uniform mat4 MVP;\nuniform highp float a, b;\nvoid main() { gl_Position = MVP[0]; }";
        assert_eq!(uniforms(src), vec!["MVP", "a", "b"]);
    }

    #[test]
    fn test_struct_array_flattening() {
        let src = r"
            #version 330
            #define MAX_LIGHTS 2
            struct BaseLight { vec3 color; float intensity; };
            struct PointLight { BaseLight base; vec3 position; };
            uniform PointLight pointLights[MAX_LIGHTS];
            void main() {}
        ";
        assert_eq!(
            uniforms(src),
            vec![
                "pointLights[0].base.color",
                "pointLights[0].base.intensity",
                "pointLights[0].position",
                "pointLights[1].base.color",
                "pointLights[1].base.intensity",
                "pointLights[1].position",
            ]
        );
    }

    #[test]
    fn test_comments_and_layout_are_ignored() {
        let src = r"
            // uniform float commented;
            /* uniform float blocked; */
            layout(location = 0) uniform sampler2D diffuse;
            void main() { if (true) { } }
        ";
        assert_eq!(uniforms(src), vec!["diffuse"]);
    }

    #[test]
    fn test_initializers() {
        let src = r"
            uniform float dispMapScale = 0.0;
            uniform vec3 tint = vec3(1.0, 0.5, 0.25), other;
            uniform float weights[2] = float[2](0.5, 0.5);
            void main() {}
        ";
        assert_eq!(
            uniforms(src),
            vec!["dispMapScale", "tint", "other", "weights[0]", "weights[1]"]
        );
        assert!(scan_interface("uniform float x = ;\nvoid main() {}").is_err());
    }

    #[test]
    fn test_uniform_blocks() {
        let src = r"
            #version 330
            uniform Matrices { mat4 MVP; mat4 Normal; };
            layout(std140) uniform Lights { vec3 color; float intensity[2]; } lights;
            uniform float loose;
            void main() {}
        ";
        let interface = scan_interface(src).unwrap();
        assert_eq!(interface.uniforms, vec!["loose"]);
        assert_eq!(
            interface.block_members,
            vec![
                "MVP",
                "Normal",
                "Lights.color",
                "Lights.intensity[0]",
                "Lights.intensity[1]",
            ]
        );
    }

    #[test]
    fn test_disabled_regions_are_dropped() {
        let src = r"
            #version 330
            #define USE_NORMAL_MAP
            #define QUALITY 2
            #if 0
            uniform float ghost;
            #endif
            #ifdef USE_NORMAL_MAP
            uniform sampler2D normalMap;
            #else
            uniform float flatNormal;
            #endif
            #ifndef USE_NORMAL_MAP
            uniform float alsoGhost;
            #endif
            #if defined(USE_NORMAL_MAP) && QUALITY >= 3
            uniform float high;
            #elif QUALITY == 2
            uniform float medium;
            #else
            uniform float low;
            #endif
            #if 0
            #if 1
            uniform float nested;
            #endif
            #else
            uniform float outer;
            #endif
            void main() {}
        ";
        assert_eq!(uniforms(src), vec!["normalMap", "medium", "outer"]);
    }

    #[test]
    fn test_defines_inside_disabled_regions_are_ignored() {
        let src = r"
            #if 0
            #define COUNT 8
            #endif
            #ifndef COUNT
            #define COUNT 2
            #endif
            uniform float values[COUNT];
            void main() {}
        ";
        assert_eq!(uniforms(src), vec!["values[0]", "values[1]"]);
    }

    #[test]
    fn test_conditional_errors() {
        assert!(scan_interface("#if 1\nvoid main() {}").is_err());
        assert!(scan_interface("#endif\nvoid main() {}").is_err());
        assert!(scan_interface("#if (1\n#endif\nvoid main() {}").is_err());

        let err = scan_interface("#error unsupported target\nvoid main() {}").unwrap_err();
        assert!(err.contains("unsupported target"));
        // Disabled #error lines are not diagnostics.
        assert!(scan_interface("#if 0\n#error nope\n#endif\nvoid main() {}").is_ok());
    }

    #[test]
    fn test_missing_main_fails() {
        let err = scan_interface("uniform float x;").unwrap_err();
        assert!(err.contains("main"));
    }

    #[test]
    fn test_undeclared_struct_fails() {
        let err = scan_interface("uniform Light l;\nvoid main() {}").unwrap_err();
        assert!(err.contains("'Light' : undeclared identifier"));
    }

    #[test]
    fn test_unbalanced_braces_fail() {
        assert!(scan_interface("void main() {").is_err());
    }

    #[test]
    fn test_empty_source_fails() {
        assert!(scan_interface("  \n").is_err());
    }
}
