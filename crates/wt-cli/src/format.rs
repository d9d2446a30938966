//! Duration display patterns.
//!
//! A pattern mixes unit tokens with literal text:
//!
//! | token | unit         |
//! |-------|--------------|
//! | `d`   | days         |
//! | `h`   | hours        |
//! | `m`   | minutes      |
//! | `s`   | seconds      |
//! | `S`   | milliseconds |
//!
//! A run of the same token letter sets the minimum width, zero-padded
//! (`hh` → `04`, `SSS` → `007`). Text in single quotes is copied as-is and
//! `''` writes a single quote. Any other character is copied as-is.
//!
//! The largest unit present takes everything above it, so `mm:ss` shows
//! `62:03` for an hour, two minutes and three seconds. The smallest unit
//! present is truncated.

use chrono::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Days = 0,
    Hours = 1,
    Minutes = 2,
    Seconds = 3,
    Millis = 4,
}

impl Unit {
    const ALL: [Self; 5] = [
        Self::Days,
        Self::Hours,
        Self::Minutes,
        Self::Seconds,
        Self::Millis,
    ];

    const fn from_token(c: char) -> Option<Self> {
        match c {
            'd' => Some(Self::Days),
            'h' => Some(Self::Hours),
            'm' => Some(Self::Minutes),
            's' => Some(Self::Seconds),
            'S' => Some(Self::Millis),
            _ => None,
        }
    }

    const fn millis(self) -> i64 {
        match self {
            Self::Days => 86_400_000,
            Self::Hours => 3_600_000,
            Self::Minutes => 60_000,
            Self::Seconds => 1_000,
            Self::Millis => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Field { unit: Unit, width: usize },
}

/// A parsed duration display pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationFormat {
    tokens: Vec<Token>,
}

impl DurationFormat {
    /// Parses a pattern. Every string is a valid pattern.
    pub fn parse(pattern: &str) -> Self {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    literal.push('\'');
                    continue;
                }
                // Quoted text runs to the next quote, or to the end if unterminated.
                for quoted in chars.by_ref() {
                    if quoted == '\'' {
                        break;
                    }
                    literal.push(quoted);
                }
                continue;
            }

            let Some(unit) = Unit::from_token(c) else {
                literal.push(c);
                continue;
            };

            let mut width = 1;
            while chars.peek() == Some(&c) {
                chars.next();
                width += 1;
            }
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(Token::Field { unit, width });
        }

        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }
        Self { tokens }
    }

    /// Renders `duration`. Negative durations render as zero.
    pub fn format(&self, duration: Duration) -> String {
        let mut remaining = duration.num_milliseconds().max(0);
        let mut values = [0_i64; Unit::ALL.len()];
        for (slot, unit) in values.iter_mut().zip(Unit::ALL) {
            if self.uses(unit) {
                *slot = remaining / unit.millis();
                remaining %= unit.millis();
            }
        }

        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Field { unit, width } => {
                    let (value, width) = (values[*unit as usize], *width);
                    out.push_str(&format!("{value:0width$}"));
                }
            }
        }
        out
    }

    fn uses(&self, unit: Unit) -> bool {
        self.tokens
            .iter()
            .any(|token| matches!(token, Token::Field { unit: u, .. } if *u == unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hms(h: i64, m: i64, s: i64) -> Duration {
        Duration::hours(h) + Duration::minutes(m) + Duration::seconds(s)
    }

    fn fmt(pattern: &str, duration: Duration) -> String {
        DurationFormat::parse(pattern).format(duration)
    }

    #[test]
    fn default_pattern_pads_fields() {
        assert_eq!(fmt("hh:mm:ss", hms(4, 20, 0)), "04:20:00");
        assert_eq!(fmt("hh:mm:ss", Duration::zero()), "00:00:00");
    }

    #[test]
    fn largest_unit_absorbs_overflow() {
        assert_eq!(fmt("hh:mm:ss", hms(27, 5, 9)), "27:05:09");
        assert_eq!(fmt("m:ss", hms(1, 2, 3)), "62:03");
        assert_eq!(fmt("s", hms(0, 2, 3)), "123");
    }

    #[test]
    fn days_take_whole_days() {
        assert_eq!(fmt("d'd' h'h' m'm'", hms(27, 5, 59)), "1d 3h 5m");
    }

    #[test]
    fn smallest_unit_is_truncated() {
        assert_eq!(fmt("h:mm", hms(1, 59, 59)), "1:59");
    }

    #[test]
    fn milliseconds() {
        let duration = Duration::milliseconds(1_507);
        assert_eq!(fmt("s.SSS", duration), "1.507");
        assert_eq!(fmt("S", duration), "1507");
        assert_eq!(fmt("s.SSS", Duration::milliseconds(7)), "0.007");
    }

    #[test]
    fn quotes_escape_token_letters() {
        assert_eq!(fmt("h 'hours'", hms(2, 0, 0)), "2 hours");
        assert_eq!(fmt("''h''", hms(4, 0, 0)), "'4'");
        assert_eq!(fmt("h 'unterminated", hms(4, 0, 0)), "4 unterminated");
    }

    #[test]
    fn unknown_characters_are_literal() {
        assert_eq!(fmt("[hh|mm]", hms(1, 5, 0)), "[01|05]");
        assert_eq!(fmt("", hms(1, 5, 0)), "");
    }

    #[test]
    fn negative_durations_render_as_zero() {
        assert_eq!(fmt("hh:mm:ss", Duration::seconds(-30)), "00:00:00");
    }
}
