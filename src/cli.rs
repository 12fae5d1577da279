use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::data::cache::DEFAULT_TTL;
use crate::data::loader::DatasetSource;

#[derive(Debug, Parser)]
#[command(
    name = "gapminder-explorer",
    version,
    about = "Life expectancy vs GDP per capita explorer"
)]
pub struct CliArgs {
    /// Dataset file (.csv, .json or .parquet). Defaults to the bundled extract
    #[arg(long, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Initial filters, as a shared link or query string
    #[arg(long, value_name = "QUERY")]
    pub view: Option<String>,

    /// Seconds before the dataset is loaded again (at least 1)
    #[arg(
        long = "cache-ttl",
        value_name = "SECS",
        default_value_t = DEFAULT_TTL.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub cache_ttl: u64,
}

impl CliArgs {
    pub fn source(&self) -> DatasetSource {
        match &self.data {
            Some(path) => DatasetSource::File(path.clone()),
            None => DatasetSource::Bundled,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["gapminder-explorer"]).unwrap();
        assert_eq!(args.source(), DatasetSource::Bundled);
        assert_eq!(args.ttl(), Duration::from_secs(600));
        assert!(args.view.is_none());
    }

    #[test]
    fn test_overrides() {
        let args = CliArgs::try_parse_from([
            "gapminder-explorer",
            "--data",
            "gapminder.parquet",
            "--view",
            "year=1977&continents=Africa",
            "--cache-ttl",
            "30",
        ])
        .unwrap();
        assert_eq!(
            args.source(),
            DatasetSource::File(PathBuf::from("gapminder.parquet"))
        );
        assert_eq!(args.view.as_deref(), Some("year=1977&continents=Africa"));
        assert_eq!(args.ttl(), Duration::from_secs(30));
    }

    #[test]
    fn test_bad_ttl_rejected() {
        let parsed = CliArgs::try_parse_from(["gapminder-explorer", "--cache-ttl", "soon"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let parsed = CliArgs::try_parse_from(["gapminder-explorer", "--cache-ttl", "0"]);
        let err = parsed.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        let parsed = CliArgs::try_parse_from(["gapminder-explorer", "--cache-ttl", "1"]);
        assert_eq!(parsed.unwrap().ttl(), Duration::from_secs(1));
    }
}
