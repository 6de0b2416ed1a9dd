use std::str::FromStr;

pub(crate) const ENGLISH_NAME: &str = "en";
pub(crate) const KANNADA_NAME: &str = "kn";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) enum Locale {
    #[default]
    En,
    Kn,
}

impl Locale {
    /// Picks the label for this locale, english being the fallback.
    pub fn pick<'a>(&self, english: &'a str, kannada: Option<&'a str>) -> &'a str {
        match self {
            Self::En => english,
            Self::Kn => kannada.filter(|value| !value.is_empty()).unwrap_or(english),
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::En => f.write_str(ENGLISH_NAME),
            Self::Kn => f.write_str(KANNADA_NAME),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct LocaleParserError(pub String);

impl std::error::Error for LocaleParserError {}

impl std::fmt::Display for LocaleParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unsupported locale {:?}", self.0)
    }
}

impl FromStr for Locale {
    type Err = LocaleParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ENGLISH_NAME => Ok(Self::En),
            KANNADA_NAME => Ok(Self::Kn),
            other => Err(LocaleParserError(other.to_string())),
        }
    }
}
