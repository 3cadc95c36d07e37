use std::{env, path::PathBuf, time::Duration};

use crate::{
    Error, PageId, Result, COOKIE_NAME, DEFAULT_HOST, DEFAULT_TIMEOUT, IMAGES_DIR,
    JOURNAL_FILE_NAME,
};

const ENV_COOKIE_VALUE: &str = "TAPESTRY_COOKIE_VALUE";
const ENV_FIRST_OBSERVATION_ID: &str = "TAPESTRY_FIRST_OBSERVATION_ID";
const ENV_NAME: &str = "TAPESTRY_NAME";
const ENV_SCHOOL: &str = "TAPESTRY_SCHOOL";
const ENV_HOST: &str = "TAPESTRY_HOST";
const ENV_TIMEOUT: &str = "TAPESTRY_TIMEOUT";
const ENV_IMAGES_DIR: &str = "TAPESTRY_IMAGES_DIR";

/// Everything a crawl needs. Built once before the walk starts and only read afterwards.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub cookie_name: String,
    pub cookie_value: String,
    pub first_observation_id: PageId,
    /// Display name of the journal owner.
    pub name: String,
    pub school: String,
    /// `https://<host>/s/<school>/observation`, without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
    pub images_dir: PathBuf,
    pub journal_file_name: String,
}

impl CrawlConfig {
    pub fn new(
        cookie_value: impl Into<String>,
        first_observation_id: PageId,
        name: impl Into<String>,
        school: impl Into<String>,
    ) -> Self {
        let school = school.into();
        Self {
            cookie_name: COOKIE_NAME.to_string(),
            cookie_value: cookie_value.into(),
            first_observation_id,
            name: name.into(),
            base_url: base_url_for(DEFAULT_HOST, &school),
            school,
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT),
            images_dir: PathBuf::from(IMAGES_DIR),
            journal_file_name: JOURNAL_FILE_NAME.to_string(),
        }
    }

    /// Loads the configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable lookup. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let optional = |name| lookup(name).filter(|v: &String| !v.trim().is_empty());
        let required = |name| optional(name).ok_or(Error::MissingEnv(name));

        let mut config = Self::new(
            required(ENV_COOKIE_VALUE)?,
            PageId::new(required(ENV_FIRST_OBSERVATION_ID)?),
            required(ENV_NAME)?,
            required(ENV_SCHOOL)?,
        );

        if let Some(host) = optional(ENV_HOST) {
            config.base_url = base_url_for(host.trim(), &config.school);
        }
        if let Some(timeout) = optional(ENV_TIMEOUT) {
            config.timeout = parse_timeout(&timeout).ok_or(Error::InvalidEnv {
                name: ENV_TIMEOUT,
                value: timeout,
            })?;
        }
        if let Some(dir) = optional(ENV_IMAGES_DIR) {
            config.images_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_images_dir(mut self, images_dir: impl Into<PathBuf>) -> Self {
        self.images_dir = images_dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn journal_path(&self) -> PathBuf {
        self.images_dir.join(&self.journal_file_name)
    }

    pub fn observation_url(&self, id: &PageId) -> String {
        format!("{}/{}", self.base_url, id)
    }
}

fn base_url_for(host: &str, school: &str) -> String {
    format!("https://{host}/s/{school}/observation")
}

fn parse_timeout(value: &str) -> Option<Duration> {
    let secs = value.trim().parse::<f64>().ok()?;
    (secs.is_finite() && secs > 0.0).then(|| Duration::from_secs_f64(secs))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        (ENV_COOKIE_VALUE, "abc123"),
        (ENV_FIRST_OBSERVATION_ID, "4242"),
        (ENV_NAME, "Ada"),
        (ENV_SCHOOL, "little-acorns"),
    ];

    #[test]
    fn defaults_fill_the_optional_fields() {
        let config = CrawlConfig::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.cookie_name, "tapestry_session");
        assert_eq!(config.cookie_value, "abc123");
        assert_eq!(config.first_observation_id, PageId::new("4242"));
        assert_eq!(
            config.base_url,
            "https://tapestryjournal.com/s/little-acorns/observation"
        );
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.images_dir, PathBuf::from("./images"));
        assert_eq!(
            config.journal_path(),
            PathBuf::from("./images/observations-info.md")
        );
    }

    #[test]
    fn optional_fields_override_defaults() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            (ENV_HOST, "example.test"),
            (ENV_TIMEOUT, "2.5"),
            (ENV_IMAGES_DIR, "/tmp/obs"),
        ]);
        let config = CrawlConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(
            config.base_url,
            "https://example.test/s/little-acorns/observation"
        );
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.images_dir, PathBuf::from("/tmp/obs"));
    }

    #[test]
    fn missing_or_empty_required_variable_is_an_error() {
        let vars: Vec<_> = REQUIRED
            .iter()
            .copied()
            .filter(|(k, _)| *k != ENV_NAME)
            .collect();
        let err = CrawlConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, Error::MissingEnv(ENV_NAME)));

        let mut vars = REQUIRED.to_vec();
        vars[0] = (ENV_COOKIE_VALUE, "   ");
        let err = CrawlConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, Error::MissingEnv(ENV_COOKIE_VALUE)));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        for bad in ["soon", "-1", "0"] {
            let mut vars = REQUIRED.to_vec();
            vars.push((ENV_TIMEOUT, bad));
            let err = CrawlConfig::from_lookup(lookup(&vars)).unwrap_err();
            assert!(matches!(err, Error::InvalidEnv { name: ENV_TIMEOUT, .. }));
        }
    }

    #[test]
    fn observation_url_joins_base_and_id() {
        let config = CrawlConfig::new("c", PageId::new("1"), "n", "s")
            .with_base_url("http://127.0.0.1:3000/s/s/observation/");
        assert_eq!(
            config.observation_url(&PageId::new("77")),
            "http://127.0.0.1:3000/s/s/observation/77"
        );
    }
}
