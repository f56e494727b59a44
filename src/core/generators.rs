/// Literal generators: `$(num:...)` random numbers and `$(pick:...)` choices.
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("`num` modifier must be formatted like '[min,]max[,width]': {0:?}")]
    Number(String),
    #[error("`pick` modifier must be formatted like 'value[,value]*': {0:?}")]
    Choice(String),
}

/// Random integer in `[min, max)`, left-zero-padded to `width`.
///
/// `modifiers` is `[min,]max[,width]` with width 0 when omitted. Without
/// modifiers the result is `0..99` padded to two digits.
pub fn random_number<R: Rng + ?Sized>(
    modifiers: Option<&str>,
    rng: &mut R,
) -> Result<String, GeneratorError> {
    let raw = modifiers.map(str::trim).unwrap_or("");
    let body = raw.strip_prefix(':').unwrap_or(raw).trim();
    let (min, max, width) = if body.is_empty() {
        (0, 99, 2)
    } else {
        parse_number_spec(body).ok_or_else(|| GeneratorError::Number(raw.to_string()))?
    };
    if min >= max {
        return Err(GeneratorError::Number(raw.to_string()));
    }
    Ok(zero_pad(rng.gen_range(min..max), width))
}

fn parse_number_spec(body: &str) -> Option<(i64, i64, usize)> {
    if body.contains(':') {
        return None;
    }
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [max] => Some((0, max.parse().ok()?, 0)),
        [min, max] => Some((min.parse().ok()?, max.parse().ok()?, 0)),
        [min, max, width] => Some((min.parse().ok()?, max.parse().ok()?, width.parse().ok()?)),
        _ => None,
    }
}

/// Pad with zeros after the sign: `zero_pad(-5, 3) == "-05"`.
fn zero_pad(num: i64, width: usize) -> String {
    let digits = num.unsigned_abs().to_string();
    let sign = if num < 0 { "-" } else { "" };
    let pad = width.saturating_sub(sign.len() + digits.len());
    format!("{}{}{}", sign, "0".repeat(pad), digits)
}

/// Pick one item of a comma separated list, or one character of a single string.
///
/// `\,` and `\:` escape the delimiters.
pub fn random_choice<R: Rng + ?Sized>(
    modifiers: Option<&str>,
    rng: &mut R,
) -> Result<String, GeneratorError> {
    let raw = modifiers.unwrap_or("");
    let body = raw.strip_prefix(':').unwrap_or(raw);
    let invalid = || GeneratorError::Choice(raw.to_string());

    let segments = split_unescaped(body, ':');
    if segments.len() != 1 || body.trim().is_empty() {
        return Err(invalid());
    }
    let list = segments[0].replace("\\:", ":");

    let items = split_unescaped(&list, ',');
    let choices: Vec<String> = if items.len() == 1 && items[0].chars().count() > 1 {
        items[0].replace("\\,", ",").chars().map(String::from).collect()
    } else {
        items
            .iter()
            .map(|item| item.trim().replace("\\,", ","))
            .collect()
    };
    choices.choose(rng).cloned().ok_or_else(invalid)
}

/// Split on `delim` unless it is preceded by a backslash. Escapes are kept.
fn split_unescaped(input: &str, delim: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut prev = None;
    for c in input.chars() {
        if c == delim && prev != Some('\\') {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
        prev = Some(c);
    }
    parts.push(current);
    parts
}
