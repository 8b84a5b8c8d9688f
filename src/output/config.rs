use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl OutputConfig {
    /// Envelopes are only emitted under `--json`, so JSON is the default.
    pub fn from_env() -> Self {
        let format = parse_format(env::var("LISTINGS_OUTPUT_FORMAT").ok().as_deref());
        let pretty = parse_flag(env::var("LISTINGS_OUTPUT_PRETTY").ok().as_deref());
        OutputConfig { format, pretty }
    }
}

fn parse_format(v: Option<&str>) -> OutputFormat {
    match v {
        Some("text") => OutputFormat::Text,
        _ => OutputFormat::Json,
    }
}

fn parse_flag(v: Option<&str>) -> bool {
    match v {
        Some(v) => v.eq_ignore_ascii_case("1") || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_defaults_to_json() {
        assert_eq!(parse_format(None), OutputFormat::Json);
        assert_eq!(parse_format(Some("yaml")), OutputFormat::Json);
        assert_eq!(parse_format(Some("text")), OutputFormat::Text);
    }

    #[test]
    fn pretty_flag_values() {
        assert!(parse_flag(Some("TRUE")));
        assert!(parse_flag(Some("1")));
        assert!(!parse_flag(Some("0")));
        assert!(!parse_flag(None));
    }
}
