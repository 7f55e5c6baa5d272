use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorAttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
    StartsWith { key: String, value: String },
    EndsWith { key: String, value: String },
    Contains { key: String, value: String },
    Includes { key: String, value: String },
    DashMatch { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorPseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    Checked,
    Disabled,
    Enabled,
    Empty,
    Not(Vec<Vec<SelectorPart>>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub(crate) tag: Option<String>,
    pub(crate) universal: bool,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<SelectorAttrCondition>,
    pub(crate) pseudo_classes: Vec<SelectorPseudoClass>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectorCombinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorPart {
    pub(crate) step: SelectorStep,
    // Relation to previous (left) selector part.
    pub(crate) combinator: Option<SelectorCombinator>,
}

pub(crate) fn parse_selector_chain(selector: &str) -> Result<Vec<SelectorPart>> {
    let selector = selector.trim();
    let unsupported = || Error::UnsupportedSelector(selector.into());

    let mut parts: Vec<SelectorPart> = Vec::new();
    let mut pending = None;
    for token in tokenize_selector(selector)? {
        if let Some(combinator) = combinator_token(&token) {
            if pending.replace(combinator).is_some() || parts.is_empty() {
                return Err(unsupported());
            }
            continue;
        }
        let combinator = (!parts.is_empty())
            .then(|| pending.take().unwrap_or(SelectorCombinator::Descendant));
        parts.push(SelectorPart {
            step: parse_selector_step(&token)?,
            combinator,
        });
    }

    if parts.is_empty() || pending.is_some() {
        return Err(unsupported());
    }
    Ok(parts)
}

fn combinator_token(token: &str) -> Option<SelectorCombinator> {
    match token {
        ">" => Some(SelectorCombinator::Child),
        "+" => Some(SelectorCombinator::AdjacentSibling),
        "~" => Some(SelectorCombinator::GeneralSibling),
        _ => None,
    }
}

pub(crate) fn parse_selector_groups(selector: &str) -> Result<Vec<Vec<SelectorPart>>> {
    split_selector_groups(selector)?
        .iter()
        .map(|group| parse_selector_chain(group))
        .collect()
}

/// Bracket, paren and quote state while scanning selector text.
#[derive(Default)]
struct Nesting {
    brackets: usize,
    parens: usize,
    quote: Option<char>,
    escaped: bool,
}

impl Nesting {
    /// Consumes `ch`. Returns true when it lies outside every bracket, paren
    /// and quote and is not one of their delimiters.
    fn step(&mut self, ch: char, selector: &str) -> Result<bool> {
        let unbalanced = || Error::UnsupportedSelector(selector.into());
        if let Some(quote) = self.quote {
            if self.escaped {
                self.escaped = false;
            } else if ch == '\\' {
                self.escaped = true;
            } else if ch == quote {
                self.quote = None;
            }
            return Ok(false);
        }
        match ch {
            '"' | '\'' if self.brackets > 0 => self.quote = Some(ch),
            '[' => self.brackets += 1,
            ']' => self.brackets = self.brackets.checked_sub(1).ok_or_else(unbalanced)?,
            '(' => self.parens += 1,
            ')' => self.parens = self.parens.checked_sub(1).ok_or_else(unbalanced)?,
            _ => return Ok(self.brackets == 0 && self.parens == 0),
        }
        Ok(false)
    }

    fn is_balanced(&self) -> bool {
        self.brackets == 0 && self.parens == 0 && self.quote.is_none()
    }
}

pub(crate) fn split_selector_groups(selector: &str) -> Result<Vec<String>> {
    let mut nesting = Nesting::default();
    let mut groups = Vec::new();
    let mut current = String::new();

    for ch in selector.chars() {
        if nesting.step(ch, selector)? && ch == ',' {
            groups.push(take_group(&mut current, selector)?);
        } else {
            current.push(ch);
        }
    }
    if !nesting.is_balanced() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    groups.push(take_group(&mut current, selector)?);
    Ok(groups)
}

fn take_group(current: &mut String, selector: &str) -> Result<String> {
    let group = current.trim().to_string();
    current.clear();
    if group.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    Ok(group)
}

/// Splits one selector chain into compound selectors and combinator tokens.
pub(crate) fn tokenize_selector(selector: &str) -> Result<Vec<String>> {
    let mut nesting = Nesting::default();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in selector.chars() {
        let top_level = nesting.step(ch, selector)?;
        if top_level && (ch.is_ascii_whitespace() || matches!(ch, '>' | '+' | '~')) {
            push_token(&mut current, &mut tokens);
            if !ch.is_ascii_whitespace() {
                tokens.push(ch.to_string());
            }
        } else {
            current.push(ch);
        }
    }
    if !nesting.is_balanced() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    push_token(&mut current, &mut tokens);
    Ok(tokens)
}

fn push_token(current: &mut String, tokens: &mut Vec<String>) {
    let token = current.trim();
    if !token.is_empty() {
        tokens.push(token.to_string());
    }
    current.clear();
}

pub(crate) fn parse_selector_step(part: &str) -> Result<SelectorStep> {
    let part = part.trim();
    if part.is_empty() {
        return Err(Error::UnsupportedSelector(part.into()));
    }

    let bytes = part.as_bytes();
    let mut i = 0usize;
    let mut step = SelectorStep::default();

    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                if step.universal {
                    return Err(Error::UnsupportedSelector(part.into()));
                }
                step.universal = true;
                i += 1;
            }
            b'#' => {
                let Some((id, next)) = parse_selector_ident(part, i + 1) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                if step.id.replace(id).is_some() {
                    return Err(Error::UnsupportedSelector(part.into()));
                }
                i = next;
            }
            b'.' => {
                let Some((class_name, next)) = parse_selector_ident(part, i + 1) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                step.classes.push(class_name);
                i = next;
            }
            b'[' => {
                let (attr, next) = parse_selector_attr_condition(part, i)?;
                step.attrs.push(attr);
                i = next;
            }
            b':' => {
                let Some((pseudo, next)) = parse_selector_pseudo(part, i) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                step.pseudo_classes.push(pseudo);
                i = next;
            }
            _ => {
                if step.tag.is_some()
                    || step.id.is_some()
                    || !step.classes.is_empty()
                    || step.universal
                {
                    return Err(Error::UnsupportedSelector(part.into()));
                }
                let Some((tag, next)) = parse_selector_ident(part, i) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                step.tag = Some(tag);
                i = next;
            }
        }
    }

    Ok(step)
}

const SIMPLE_PSEUDO_CLASSES: &[(&str, SelectorPseudoClass)] = &[
    ("first-child", SelectorPseudoClass::FirstChild),
    ("last-child", SelectorPseudoClass::LastChild),
    ("only-child", SelectorPseudoClass::OnlyChild),
    ("checked", SelectorPseudoClass::Checked),
    ("disabled", SelectorPseudoClass::Disabled),
    ("enabled", SelectorPseudoClass::Enabled),
    ("empty", SelectorPseudoClass::Empty),
];

pub(crate) fn parse_selector_pseudo(
    part: &str,
    start: usize,
) -> Option<(SelectorPseudoClass, usize)> {
    if part.as_bytes().get(start)? != &b':' {
        return None;
    }
    let start = start + 1;
    let tail = part.get(start..)?;

    for (name, pseudo) in SIMPLE_PSEUDO_CLASSES {
        if let Some(rest) = tail.strip_prefix(name) {
            if rest.is_empty() || is_selector_continuation(rest.as_bytes().first()?) {
                return Some((pseudo.clone(), start + name.len()));
            }
        }
    }

    let rest = tail.strip_prefix("not(")?;
    let close_pos = find_matching_paren(rest)?;
    let body = rest[..close_pos].trim();
    if body.is_empty() {
        return None;
    }
    let selectors = parse_selector_groups(body).ok()?;
    let next = start + "not(".len() + close_pos + 1;
    if let Some(ch) = part.as_bytes().get(next) {
        if !is_selector_continuation(ch) {
            return None;
        }
    }
    Some((SelectorPseudoClass::Not(selectors), next))
}

/// Byte offset of the `)` closing a paren that was opened just before `body`.
pub(crate) fn find_matching_paren(body: &str) -> Option<usize> {
    let mut nesting = Nesting {
        parens: 1,
        ..Nesting::default()
    };
    for (idx, ch) in body.char_indices() {
        nesting.step(ch, body).ok()?;
        if nesting.parens == 0 {
            return Some(idx);
        }
    }
    None
}

pub(crate) fn is_selector_continuation(next: &u8) -> bool {
    matches!(next, b'.' | b'#' | b'[' | b':')
}

pub(crate) fn parse_selector_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    if start >= bytes.len() || !is_selector_ident_char(bytes[start]) {
        return None;
    }
    let mut end = start + 1;
    while end < bytes.len() && is_selector_ident_char(bytes[end]) {
        end += 1;
    }
    Some((src.get(start..end)?.to_string(), end))
}

pub(crate) fn is_selector_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

pub(crate) fn is_selector_attr_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b':'
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

pub(crate) fn parse_selector_attr_condition(
    src: &str,
    open_bracket: usize,
) -> Result<(SelectorAttrCondition, usize)> {
    let bytes = src.as_bytes();
    let unsupported = || Error::UnsupportedSelector(src.into());

    let mut i = skip_whitespace(bytes, open_bracket + 1);
    let key_start = i;
    while i < bytes.len() && is_selector_attr_name_char(bytes[i]) {
        i += 1;
    }
    if key_start == i {
        return Err(unsupported());
    }
    let key = src
        .get(key_start..i)
        .ok_or_else(unsupported)?
        .to_ascii_lowercase();

    i = skip_whitespace(bytes, i);
    match bytes.get(i) {
        None => return Err(unsupported()),
        Some(b']') => return Ok((SelectorAttrCondition::Exists { key }, i + 1)),
        Some(_) => {}
    }

    let (op, next) = match (bytes[i], bytes.get(i + 1)) {
        (b'=', _) => (b'=', i + 1),
        (op @ (b'^' | b'$' | b'*' | b'~' | b'|'), Some(&b'=')) => (op, i + 2),
        _ => return Err(unsupported()),
    };

    i = skip_whitespace(bytes, next);
    let (value, after_value) = parse_selector_attr_value(src, i)?;
    i = skip_whitespace(bytes, after_value);
    if bytes.get(i) != Some(&b']') {
        return Err(unsupported());
    }

    let cond = match op {
        b'^' => SelectorAttrCondition::StartsWith { key, value },
        b'$' => SelectorAttrCondition::EndsWith { key, value },
        b'*' => SelectorAttrCondition::Contains { key, value },
        b'~' => SelectorAttrCondition::Includes { key, value },
        b'|' => SelectorAttrCondition::DashMatch { key, value },
        _ => SelectorAttrCondition::Eq { key, value },
    };

    Ok((cond, i + 1))
}

pub(crate) fn parse_selector_attr_value(src: &str, start: usize) -> Result<(String, usize)> {
    let bytes = src.as_bytes();
    if start >= bytes.len() {
        return Err(Error::UnsupportedSelector(src.into()));
    }

    if bytes[start] == b'"' || bytes[start] == b'\'' {
        let quote = bytes[start];
        let mut i = start + 1;
        while i < bytes.len() {
            if bytes[i] == b'\\' {
                i = (i + 2).min(bytes.len());
                continue;
            }
            if bytes[i] == quote {
                let raw = src
                    .get(start + 1..i)
                    .ok_or_else(|| Error::UnsupportedSelector(src.into()))?;
                return Ok((unescape_string(raw), i + 1));
            }
            i += 1;
        }
        return Err(Error::UnsupportedSelector(src.into()));
    }

    let mut i = start;
    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() || bytes[i] == b']' {
            break;
        }
        if bytes[i] == b'\\' {
            i = (i + 2).min(bytes.len());
            continue;
        }
        i += 1;
    }
    let raw = src
        .get(start..i)
        .ok_or_else(|| Error::UnsupportedSelector(src.into()))?;
    Ok((unescape_string(raw), i))
}
