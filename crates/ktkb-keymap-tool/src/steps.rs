use std::{fmt::Display, str::FromStr};

/// A single action of a simulated session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Press(u8, u8),
    Release(u8, u8),
    /// Press and release, 20ms apart.
    Tap(u8, u8),
    Wait(u64),
}

pub const TAP_MILLIS: u64 = 20;
/// Longest single wait accepted.
pub const MAX_WAIT_MILLIS: u64 = 60_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepParseError {
    Empty,
    UnknownKind(char),
    BadPosition(String),
    BadDuration(String),
}

impl Display for StepParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepParseError::Empty => f.write_str("empty step"),
            StepParseError::UnknownKind(c) => write!(f, "unknown step kind '{c}', expected one of p, r, t or w"),
            StepParseError::BadPosition(p) => write!(f, "invalid key position '{p}', expected <row>,<col>"),
            StepParseError::BadDuration(d) => {
                write!(f, "invalid wait '{d}', expected up to {MAX_WAIT_MILLIS} milliseconds")
            }
        }
    }
}

impl std::error::Error for StepParseError {}

fn parse_pos(s: &str) -> Result<(u8, u8), StepParseError> {
    let bad = || StepParseError::BadPosition(s.to_string());
    let (row, col) = s.split_once(',').ok_or_else(bad)?;
    let row = row.trim().parse().map_err(|_| bad())?;
    let col = col.trim().parse().map_err(|_| bad())?;
    Ok((row, col))
}

impl FromStr for Step {
    type Err = StepParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let kind = chars.next().ok_or(StepParseError::Empty)?;
        let rest = chars.as_str();

        match kind.to_ascii_lowercase() {
            'p' => parse_pos(rest).map(|(r, c)| Step::Press(r, c)),
            'r' => parse_pos(rest).map(|(r, c)| Step::Release(r, c)),
            't' => parse_pos(rest).map(|(r, c)| Step::Tap(r, c)),
            'w' => rest
                .parse()
                .ok()
                .filter(|millis| *millis <= MAX_WAIT_MILLIS)
                .map(Step::Wait)
                .ok_or_else(|| StepParseError::BadDuration(rest.to_string())),
            other => Err(StepParseError::UnknownKind(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        assert_eq!("p2,1".parse(), Ok(Step::Press(2, 1)));
        assert_eq!("R2, 13".parse(), Ok(Step::Release(2, 13)));
        assert_eq!("t0,0".parse(), Ok(Step::Tap(0, 0)));
        assert_eq!("w250".parse(), Ok(Step::Wait(250)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Step>(), Err(StepParseError::Empty));
        assert_eq!("x1,1".parse::<Step>(), Err(StepParseError::UnknownKind('x')));
        assert_eq!("p1".parse::<Step>(), Err(StepParseError::BadPosition("1".to_string())));
        assert_eq!("p1,300".parse::<Step>(), Err(StepParseError::BadPosition("1,300".to_string())));
        assert_eq!("wsoon".parse::<Step>(), Err(StepParseError::BadDuration("soon".to_string())));
    }

    #[test]
    fn test_wait_is_bounded() {
        assert_eq!("w60000".parse(), Ok(Step::Wait(MAX_WAIT_MILLIS)));
        assert_eq!("w60001".parse::<Step>(), Err(StepParseError::BadDuration("60001".to_string())));
        assert_eq!(
            "w18446744073709551615".parse::<Step>(),
            Err(StepParseError::BadDuration("18446744073709551615".to_string()))
        );
        assert_eq!("w-1".parse::<Step>(), Err(StepParseError::BadDuration("-1".to_string())));
    }
}
