use clap::{Args, Parser, Subcommand};
use resttable_types::{EndpointConfig, KeyValuePair, RefreshInterval};

/// Live table view for any JSON REST endpoint.
///
/// Without a subcommand the terminal UI starts against the stored endpoint.
#[derive(Debug, Parser)]
#[command(name = "resttable", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch once and print the rows as a table
    Fetch {
        #[command(flatten)]
        endpoint: EndpointArgs,
        /// Print the normalized rows as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Check that the endpoint answers with JSON
    Probe {
        #[command(flatten)]
        endpoint: EndpointArgs,
    },
    /// Poll the endpoint and print a line per refresh until Ctrl-C
    Watch {
        #[command(flatten)]
        endpoint: EndpointArgs,
        /// Seconds between refreshes; defaults to the stored interval
        #[arg(long, value_name = "SECONDS")]
        interval: Option<RefreshInterval>,
    },
    /// Show or change the stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the stored endpoint and refresh interval
    Show,
    /// Update the stored settings; list options replace the stored lists
    Set {
        #[arg(long)]
        url: Option<String>,
        #[arg(long = "header", short = 'H', value_name = "KEY:VALUE", value_parser = parse_header)]
        headers: Vec<KeyValuePair>,
        #[arg(long = "param", short = 'q', value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<KeyValuePair>,
        #[arg(long, value_name = "SECONDS")]
        interval: Option<RefreshInterval>,
    },
}

/// Per-run overrides applied on top of the stored endpoint.
#[derive(Debug, Default, Clone, Args)]
pub struct EndpointArgs {
    /// Endpoint URL to use instead of the stored one
    #[arg(long)]
    pub url: Option<String>,
    /// Extra request header; replaces a stored header of the same name
    #[arg(long = "header", short = 'H', value_name = "KEY:VALUE", value_parser = parse_header)]
    pub headers: Vec<KeyValuePair>,
    /// Extra query parameter; replaces a stored parameter with the same key
    #[arg(long = "param", short = 'q', value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<KeyValuePair>,
}

impl EndpointArgs {
    /// The stored configuration with these overrides applied. Nothing is persisted.
    pub fn apply_to(&self, stored: &EndpointConfig) -> EndpointConfig {
        let mut config = stored.clone();
        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        for header in &self.headers {
            upsert(&mut config.headers, header, |a, b| a.eq_ignore_ascii_case(b));
        }
        for param in &self.params {
            upsert(&mut config.params, param, |a, b| a == b);
        }
        config
    }
}

fn upsert(entries: &mut Vec<KeyValuePair>, entry: &KeyValuePair, same_key: impl Fn(&str, &str) -> bool) {
    match entries.iter_mut().find(|existing| same_key(&existing.key, &entry.key)) {
        Some(existing) => existing.value = entry.value.clone(),
        None => entries.push(entry.clone()),
    }
}

/// Parses `Name: value` (whitespace around either part is trimmed).
pub fn parse_header(raw: &str) -> Result<KeyValuePair, String> {
    split_pair(raw, ':').ok_or_else(|| format!("expected KEY:VALUE, got '{raw}'"))
}

/// Parses `key=value`; the value may itself contain `=`.
pub fn parse_param(raw: &str) -> Result<KeyValuePair, String> {
    split_pair(raw, '=').ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

fn split_pair(raw: &str, separator: char) -> Option<KeyValuePair> {
    let (key, value) = raw.split_once(separator)?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some(KeyValuePair::new(key, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn header_splits_on_first_colon() {
        let header = parse_header("Authorization: Bearer a:b").unwrap();
        assert_eq!(header, KeyValuePair::new("Authorization", "Bearer a:b"));
        assert!(parse_header("no separator").is_err());
        assert!(parse_header(": value").is_err());
    }

    #[test]
    fn param_keeps_equals_in_value() {
        let param = parse_param("filter=a=b").unwrap();
        assert_eq!(param, KeyValuePair::new("filter", "a=b"));
        assert_eq!(parse_param("empty=").unwrap(), KeyValuePair::new("empty", ""));
    }

    #[test]
    fn overrides_replace_matching_entries_and_append_new_ones() {
        let stored = EndpointConfig {
            url: "https://stored.example.com".into(),
            headers: vec![KeyValuePair::new("Content-Type", "application/json")],
            params: vec![KeyValuePair::new("limit", "5")],
        };
        let overrides = EndpointArgs {
            url: Some("https://override.example.com/items".into()),
            headers: vec![
                KeyValuePair::new("content-type", "text/json"),
                KeyValuePair::new("X-Token", "t"),
            ],
            params: vec![KeyValuePair::new("limit", "10"), KeyValuePair::new("page", "2")],
        };

        let config = overrides.apply_to(&stored);
        assert_eq!(config.url, "https://override.example.com/items");
        assert_eq!(
            config.headers,
            vec![
                KeyValuePair::new("Content-Type", "text/json"),
                KeyValuePair::new("X-Token", "t"),
            ]
        );
        assert_eq!(
            config.params,
            vec![KeyValuePair::new("limit", "10"), KeyValuePair::new("page", "2")]
        );
    }

    #[test]
    fn no_overrides_keeps_stored_config() {
        let stored = EndpointConfig::default();
        assert_eq!(EndpointArgs::default().apply_to(&stored), stored);
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from([
            "resttable", "fetch", "--url", "https://api.example.com", "-H", "Accept: application/json", "-q", "a=1",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Fetch { endpoint, json }) => {
                assert!(json);
                assert_eq!(endpoint.headers.len(), 1);
                assert_eq!(endpoint.params, vec![KeyValuePair::new("a", "1")]);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["resttable", "watch", "--interval", "15"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Watch { interval: Some(interval), .. }) if interval == RefreshInterval::from_secs(15)
        ));

        assert!(Cli::try_parse_from(["resttable"]).unwrap().command.is_none());
        assert!(Cli::try_parse_from(["resttable", "watch", "--interval", "-1"]).is_err());
    }
}
