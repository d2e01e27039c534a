use std::path::PathBuf;

/// Hard errors: bad caller input or a broken config file. Anything that
/// merely could not be resolved in the analyzed command line is reported
/// inside the result instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("config parse error in {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_names_the_file() {
        let source = toml::from_str::<toml::Table>("[x").unwrap_err();
        let err = Error::Config {
            path: PathBuf::from("/tmp/cmd-deob.toml"),
            source,
        };
        let text = err.to_string();
        assert!(text.starts_with("config parse error in /tmp/cmd-deob.toml: "), "{text}");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn invalid_options_message() {
        let err = Error::InvalidOptions("max_depth must be at least 1".into());
        assert_eq!(err.to_string(), "invalid options: max_depth must be at least 1");
    }
}
