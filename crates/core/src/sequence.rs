use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const DEFAULT_START_VALUE: u64 = 1;
pub const DEFAULT_PRECISION: usize = 4;
pub const OUTPUT_EXTENSION: &str = "jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Delimiter {
    #[default]
    #[serde(rename = ".")]
    Dot,
    #[serde(rename = "-")]
    Dash,
    #[serde(rename = "_")]
    Underscore,
}

impl Delimiter {
    /// Anything other than `.`, `-` or `_` quietly becomes `.`.
    pub fn parse_lenient(input: &str) -> Self {
        match input {
            "-" => Self::Dash,
            "_" => Self::Underscore,
            _ => Self::Dot,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Dot => '.',
            Self::Dash => '-',
            Self::Underscore => '_',
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("precision must be at least 1 digit")]
    ZeroPrecision,
    #[error("{count} files starting at {start} do not fit in {precision} digits")]
    Overflow {
        start: u64,
        count: usize,
        precision: usize,
    },
}

/// Naming parameters for one run. Fixed once the run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceConfig {
    year: i32,
    start_value: u64,
    precision: usize,
    delimiter: Delimiter,
}

impl SequenceConfig {
    pub fn new(
        year: i32,
        start_value: u64,
        precision: usize,
        delimiter: Delimiter,
    ) -> Result<Self, SequenceError> {
        if precision == 0 {
            return Err(SequenceError::ZeroPrecision);
        }
        Ok(Self {
            year,
            start_value,
            precision,
            delimiter,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn start_value(&self) -> u64 {
        self.start_value
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    pub fn first_name(&self) -> String {
        self.format_name(self.start_value)
    }

    /// Name for the file at `index` (0-based) in chronological order.
    pub fn final_name(&self, index: usize) -> String {
        self.format_name(self.start_value.saturating_add(index as u64))
    }

    /// Rejects runs whose last number would widen past `precision`.
    pub fn ensure_fits(&self, count: usize) -> Result<(), SequenceError> {
        if count == 0 {
            return Ok(());
        }
        let overflow = SequenceError::Overflow {
            start: self.start_value,
            count,
            precision: self.precision,
        };
        let last = self
            .start_value
            .checked_add(count as u64 - 1)
            .ok_or_else(|| overflow.clone())?;
        if last.to_string().len() > self.precision {
            return Err(overflow);
        }
        Ok(())
    }

    fn format_name(&self, number: u64) -> String {
        format!(
            "{}{}{:0width$}.{}",
            self.year,
            self.delimiter.as_char(),
            number,
            OUTPUT_EXTENSION,
            width = self.precision
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_falls_back_to_dot() {
        assert_eq!(Delimiter::parse_lenient("-"), Delimiter::Dash);
        assert_eq!(Delimiter::parse_lenient("_"), Delimiter::Underscore);
        assert_eq!(Delimiter::parse_lenient("."), Delimiter::Dot);
        assert_eq!(Delimiter::parse_lenient("*"), Delimiter::Dot);
        assert_eq!(Delimiter::parse_lenient(""), Delimiter::Dot);
        assert_eq!(Delimiter::parse_lenient("--"), Delimiter::Dot);
    }

    #[test]
    fn final_names_are_padded_and_consecutive() {
        let config = SequenceConfig::new(2014, 750, 5, Delimiter::Dash).expect("config");
        assert_eq!(config.first_name(), "2014-00750.jpg");
        assert_eq!(config.final_name(0), "2014-00750.jpg");
        assert_eq!(config.final_name(1), "2014-00751.jpg");
        assert_eq!(config.final_name(250), "2014-01000.jpg");
    }

    #[test]
    fn default_style_names() {
        let config = SequenceConfig::new(2015, DEFAULT_START_VALUE, DEFAULT_PRECISION, Delimiter::Dot)
            .expect("config");
        assert_eq!(config.final_name(0), "2015.0001.jpg");
        assert_eq!(config.final_name(2), "2015.0003.jpg");
    }

    #[test]
    fn zero_precision_is_rejected() {
        assert_eq!(
            SequenceConfig::new(2014, 1, 0, Delimiter::Dot),
            Err(SequenceError::ZeroPrecision)
        );
    }

    #[test]
    fn ensure_fits_checks_last_number_width() {
        let config = SequenceConfig::new(2014, 95, 2, Delimiter::Dot).expect("config");
        assert!(config.ensure_fits(0).is_ok());
        assert!(config.ensure_fits(5).is_ok());
        assert_eq!(
            config.ensure_fits(6),
            Err(SequenceError::Overflow {
                start: 95,
                count: 6,
                precision: 2,
            })
        );

        let huge = SequenceConfig::new(2014, u64::MAX, 30, Delimiter::Dot).expect("config");
        assert!(huge.ensure_fits(1).is_ok());
        assert!(huge.ensure_fits(2).is_err());
    }

    #[test]
    fn delimiter_serializes_as_its_character() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            delimiter: Delimiter,
        }
        let body = toml::to_string(&Wrapper {
            delimiter: Delimiter::Underscore,
        })
        .expect("serialize");
        assert_eq!(body.trim(), "delimiter = \"_\"");
        let parsed: Wrapper = toml::from_str("delimiter = \"-\"").expect("parse");
        assert_eq!(parsed.delimiter, Delimiter::Dash);
    }
}
