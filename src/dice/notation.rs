//! Dice notation parsing.
//!
//! Understands expressions like `2d6+3`, `3d8+2d6-1`, and the shorthand
//! forms the roll commands accept (`+3` for `1d20+3`, `5 2d6` for five
//! repeats of `2d6`).

use std::fmt;

use thiserror::Error;

use crate::constant::limits;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Invalid notation after count: {0}")]
    TrailingNotation(String),
    #[error("Put dice notation before modifier: e.g., 2d6+3")]
    ModifierBeforeDice,
    #[error("Dice count must be 1-{}", limits::MAX_DICE)]
    DiceCountOutOfRange,
    #[error("Dice sides must be 1-{}", limits::MAX_SIDES)]
    DiceSidesOutOfRange,
    #[error("Modifier must be between -{max} and {max}", max = limits::MAX_MODIFIER)]
    ModifierOutOfRange,
    #[error("Repeat count must be 1-{}", limits::MAX_REPEAT)]
    RepeatOutOfRange,
    #[error("Count must be 1-{}", limits::MAX_REPEAT)]
    InvalidCount,
}

/// One group of identical dice, e.g. the `2d6` in `2d6+3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pool {
    pub count: u32,
    pub sides: u32,
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}

/// A parsed dice expression: signed pools in source order, plus the
/// accumulated flat modifier. How the signs and the modifier are applied
/// depends on the aggregation rule (see [`crate::dice::roll`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    text: String,
    pub pools: Vec<(i64, Pool)>,
    pub modifier: i64,
}

impl Expression {
    /// The whitespace-stripped source text, for display.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Parse a bare pool like `2d6` or `d20` (implicit count of 1).
pub fn parse_pool(token: &str) -> Result<Pool, NotationError> {
    let lowered = token.trim().to_lowercase();
    let Some((count_str, sides_str)) = lowered.split_once('d') else {
        return Err(NotationError::InvalidNotation(lowered));
    };

    let count = if count_str.is_empty() {
        1
    } else if count_str.bytes().all(|b| b.is_ascii_digit()) {
        count_str
            .parse::<u32>()
            .map_err(|_| NotationError::DiceCountOutOfRange)?
    } else {
        return Err(NotationError::InvalidNotation(lowered));
    };

    let sides = if !sides_str.is_empty() && sides_str.bytes().all(|b| b.is_ascii_digit()) {
        sides_str
            .parse::<u32>()
            .map_err(|_| NotationError::DiceSidesOutOfRange)?
    } else {
        return Err(NotationError::InvalidNotation(lowered));
    };

    if !(1..=limits::MAX_DICE).contains(&count) {
        return Err(NotationError::DiceCountOutOfRange);
    }
    if !(1..=limits::MAX_SIDES).contains(&sides) {
        return Err(NotationError::DiceSidesOutOfRange);
    }

    Ok(Pool { count, sides })
}

/// Parse a full expression like `3d8+2d6-5`.
///
/// A `+`/`-` sets the sign for the term that follows it; after every term
/// the sign resets to `+`. Terms containing `d` are pools, anything else
/// must be an integer and folds into the flat modifier.
pub fn parse_expression(input: &str) -> Result<Expression, NotationError> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(NotationError::InvalidNotation(input.trim().to_string()));
    }

    let mut text = String::new();
    let mut pools = Vec::new();
    let mut modifier: i64 = 0;
    let mut sign: i64 = 1;

    for token in tokenize(&cleaned) {
        match token.as_str() {
            "+" => {
                sign = 1;
                text.push('+');
            }
            "-" => {
                sign = -1;
                text.push('-');
            }
            _ if token.to_lowercase().contains('d') => {
                let pool = parse_pool(&token)?;
                // Displaying the parsed pool makes implicit counts explicit
                // ("d20" reads back as "1d20").
                text.push_str(&pool.to_string());
                pools.push((sign, pool));
                sign = 1;
            }
            _ => {
                let value: i64 = token
                    .parse()
                    .map_err(|_| NotationError::InvalidToken(token.clone()))?;
                // Tokens are unsigned, so bounding each one keeps the fold
                // itself free of overflow before the range check runs.
                if value > limits::MAX_MODIFIER {
                    return Err(NotationError::ModifierOutOfRange);
                }
                modifier += sign * value;
                if modifier.abs() > limits::MAX_MODIFIER {
                    return Err(NotationError::ModifierOutOfRange);
                }
                text.push_str(&token);
                sign = 1;
            }
        }
    }

    Ok(Expression {
        text,
        pools,
        modifier,
    })
}

/// Parse a roll command argument into `(repeat count, expression)` with the
/// smart defaults the commands document:
///
/// - `""` or `"d20"` → one `1d20`
/// - `"+3"` → one `1d20+3`
/// - `"10"` → ten `1d20`
/// - `"10 +2"` → ten `1d20+2`
/// - `"5 2d6+3"` → five `2d6+3`
pub fn parse_request(args: &str) -> Result<(u32, Expression), NotationError> {
    let args = args.trim();
    if args.is_empty() {
        return Ok((1, parse_expression("1d20")?));
    }

    let normalized: String = args.chars().filter(|c| !c.is_whitespace()).collect();

    // Just a modifier: roll 1d20 with it.
    if is_signed_integer(&normalized) {
        return Ok((1, parse_expression(&format!("1d20{normalized}"))?));
    }

    if let Some(rest) = normalized.strip_prefix(['+', '-']) {
        let has_dice = rest.to_lowercase().contains('d');
        // A leading signed number followed by dice ("+3 2d6") is backwards.
        if rest.as_bytes().first().is_some_and(u8::is_ascii_digit) && has_dice {
            return Err(NotationError::ModifierBeforeDice);
        }
        if !has_dice {
            return Err(NotationError::InvalidNotation(args.to_string()));
        }
        // Something like "+d20": the leading sign is harmless.
        return Ok((1, parse_expression(&normalized)?));
    }

    let mut tokens = args.split_whitespace();
    let first = tokens.next().unwrap_or_default();

    // Leading bare integer: a repeat count for whatever follows.
    if first.bytes().all(|b| b.is_ascii_digit()) {
        let repeat = first
            .parse::<u32>()
            .map_err(|_| NotationError::RepeatOutOfRange)?;
        if !(1..=limits::MAX_REPEAT).contains(&repeat) {
            return Err(NotationError::RepeatOutOfRange);
        }

        let rest: String = tokens.collect();
        if rest.is_empty() {
            return Ok((repeat, parse_expression("1d20")?));
        }
        if is_signed_integer(&rest) {
            return Ok((repeat, parse_expression(&format!("1d20{rest}"))?));
        }
        if rest.to_lowercase().contains('d') {
            return Ok((repeat, parse_expression(&rest)?));
        }
        return Err(NotationError::TrailingNotation(rest));
    }

    if first.to_lowercase().contains('d') {
        return Ok((1, parse_expression(&normalized)?));
    }

    Err(NotationError::InvalidNotation(args.to_string()))
}

/// Validate a stat-block repeat count.
pub fn validate_repeat(count: i64) -> Result<u32, NotationError> {
    if (1..=limits::MAX_REPEAT as i64).contains(&count) {
        Ok(count as u32)
    } else {
        Err(NotationError::InvalidCount)
    }
}

/// Split a whitespace-free expression into sign and term tokens.
fn tokenize(cleaned: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in cleaned.chars() {
        if c == '+' || c == '-' {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            tokens.push(c.to_string());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn is_signed_integer(s: &str) -> bool {
    let Some(rest) = s.strip_prefix(['+', '-']) else {
        return false;
    };
    !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pool_basic() {
        assert_eq!(parse_pool("2d6"), Ok(Pool { count: 2, sides: 6 }));
        assert_eq!(parse_pool("1D20"), Ok(Pool { count: 1, sides: 20 }));
    }

    #[test]
    fn parse_pool_implicit_count() {
        assert_eq!(parse_pool("d8"), Ok(Pool { count: 1, sides: 8 }));
    }

    #[test]
    fn parse_pool_rejects_garbage() {
        assert!(matches!(
            parse_pool("abc"),
            Err(NotationError::InvalidNotation(_))
        ));
        assert!(matches!(
            parse_pool("2d"),
            Err(NotationError::InvalidNotation(_))
        ));
        assert!(matches!(
            parse_pool("2d6x"),
            Err(NotationError::InvalidNotation(_))
        ));
    }

    #[test]
    fn parse_pool_enforces_limits() {
        assert_eq!(parse_pool("0d6"), Err(NotationError::DiceCountOutOfRange));
        assert_eq!(parse_pool("101d6"), Err(NotationError::DiceCountOutOfRange));
        assert_eq!(parse_pool("2d0"), Err(NotationError::DiceSidesOutOfRange));
        assert_eq!(
            parse_pool("2d1001"),
            Err(NotationError::DiceSidesOutOfRange)
        );
        // Numbers too large for u32 read as range violations, not garbage.
        assert_eq!(
            parse_pool("99999999999d6"),
            Err(NotationError::DiceCountOutOfRange)
        );
    }

    #[test]
    fn parse_expression_single_pool() {
        let expr = parse_expression("2d6+3").unwrap();
        assert_eq!(expr.pools, vec![(1, Pool { count: 2, sides: 6 })]);
        assert_eq!(expr.modifier, 3);
        assert_eq!(expr.text(), "2d6+3");
    }

    #[test]
    fn parse_expression_multiple_pools() {
        let expr = parse_expression("3d8+2d6+5").unwrap();
        assert_eq!(
            expr.pools,
            vec![
                (1, Pool { count: 3, sides: 8 }),
                (1, Pool { count: 2, sides: 6 }),
            ]
        );
        assert_eq!(expr.modifier, 5);
    }

    #[test]
    fn parse_expression_negative_pool_and_modifier() {
        let expr = parse_expression("2d6-1d4-2").unwrap();
        assert_eq!(
            expr.pools,
            vec![
                (1, Pool { count: 2, sides: 6 }),
                (-1, Pool { count: 1, sides: 4 }),
            ]
        );
        assert_eq!(expr.modifier, -2);
    }

    #[test]
    fn parse_expression_ignores_whitespace() {
        let expr = parse_expression("2d10 + 3").unwrap();
        assert_eq!(expr.pools, vec![(1, Pool { count: 2, sides: 10 })]);
        assert_eq!(expr.modifier, 3);
        assert_eq!(expr.text(), "2d10+3");
    }

    #[test]
    fn parse_expression_accumulates_modifiers() {
        let expr = parse_expression("1d6+2-5").unwrap();
        assert_eq!(expr.modifier, -3);
    }

    #[test]
    fn parse_expression_bounds_the_modifier() {
        assert_eq!(parse_expression("1d6+10000").unwrap().modifier, 10_000);
        assert_eq!(parse_expression("1d6-10000").unwrap().modifier, -10_000);
        assert_eq!(
            parse_expression("1d6+10001"),
            Err(NotationError::ModifierOutOfRange)
        );
        assert_eq!(
            parse_expression("1d6-10001"),
            Err(NotationError::ModifierOutOfRange)
        );
        // A single token at the i64 limit must not panic the fold.
        assert_eq!(
            parse_expression("1d6+9223372036854775807"),
            Err(NotationError::ModifierOutOfRange)
        );
        // Nor may accumulation reach it across tokens.
        assert_eq!(
            parse_expression("1d6+9000+9000"),
            Err(NotationError::ModifierOutOfRange)
        );
        assert_eq!(
            parse_expression("1d6+9223372036854775807+9223372036854775807"),
            Err(NotationError::ModifierOutOfRange)
        );
        // Beyond i64 is just a bad token.
        assert!(matches!(
            parse_expression("1d6+99999999999999999999"),
            Err(NotationError::InvalidToken(_))
        ));
    }

    #[test]
    fn parse_expression_normalizes_implicit_counts_in_text() {
        assert_eq!(parse_expression("d20").unwrap().text(), "1d20");
        assert_eq!(parse_expression("d20+3").unwrap().text(), "1d20+3");
        assert_eq!(parse_expression("2D6 + d4").unwrap().text(), "2d6+1d4");
    }

    #[test]
    fn parse_expression_rejects_bad_tokens() {
        assert_eq!(
            parse_expression("abc"),
            Err(NotationError::InvalidToken("abc".into()))
        );
    }

    #[test]
    fn parse_request_defaults_to_d20() {
        let (repeat, expr) = parse_request("").unwrap();
        assert_eq!(repeat, 1);
        assert_eq!(expr.pools, vec![(1, Pool { count: 1, sides: 20 })]);
        assert_eq!(expr.modifier, 0);
    }

    #[test]
    fn parse_request_bare_modifier() {
        let (repeat, expr) = parse_request("+3").unwrap();
        assert_eq!(repeat, 1);
        assert_eq!(expr.text(), "1d20+3");

        let (_, expr) = parse_request("- 5").unwrap();
        assert_eq!(expr.modifier, -5);
    }

    #[test]
    fn parse_request_repeat_count() {
        let (repeat, expr) = parse_request("10").unwrap();
        assert_eq!(repeat, 10);
        assert_eq!(expr.text(), "1d20");

        let (repeat, expr) = parse_request("10 +2").unwrap();
        assert_eq!(repeat, 10);
        assert_eq!(expr.text(), "1d20+2");

        let (repeat, expr) = parse_request("5 2d6+3").unwrap();
        assert_eq!(repeat, 5);
        assert_eq!(expr.text(), "2d6+3");
    }

    #[test]
    fn parse_request_repeat_limits() {
        assert_eq!(parse_request("0"), Err(NotationError::RepeatOutOfRange));
        assert_eq!(parse_request("21"), Err(NotationError::RepeatOutOfRange));
    }

    #[test]
    fn parse_request_rejects_modifier_before_dice() {
        assert_eq!(
            parse_request("+3 2d6"),
            Err(NotationError::ModifierBeforeDice)
        );
    }

    #[test]
    fn parse_request_rejects_trailing_garbage() {
        assert_eq!(
            parse_request("5 banana"),
            Err(NotationError::TrailingNotation("banana".into()))
        );
        assert!(matches!(
            parse_request("banana"),
            Err(NotationError::InvalidNotation(_))
        ));
    }

    #[test]
    fn parse_request_allows_sign_prefixed_dice() {
        let (repeat, expr) = parse_request("+d20").unwrap();
        assert_eq!(repeat, 1);
        assert_eq!(expr.pools, vec![(1, Pool { count: 1, sides: 20 })]);
    }

    #[test]
    fn parse_request_implicit_count() {
        let (repeat, expr) = parse_request("d20").unwrap();
        assert_eq!(repeat, 1);
        assert_eq!(expr.pools, vec![(1, Pool { count: 1, sides: 20 })]);
        // Titles read the text back, so the implicit count shows up there.
        assert_eq!(expr.text(), "1d20");
    }

    #[test]
    fn validate_repeat_range() {
        assert_eq!(validate_repeat(1), Ok(1));
        assert_eq!(validate_repeat(20), Ok(20));
        assert_eq!(validate_repeat(0), Err(NotationError::InvalidCount));
        assert_eq!(validate_repeat(21), Err(NotationError::InvalidCount));
    }
}
