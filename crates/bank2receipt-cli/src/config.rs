use anyhow::{Context, Result};
use bank2receipt::payment_type::{PaymentType, PaymentTypeRules};
use greeninvoice_client::{Credentials, Environment};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".bank2receipt.toml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigAccount {
    pub api_key_id: String,
    pub api_key_secret: String,
    pub url: Option<String>,
}

impl ConfigAccount {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            api_key_id: self.api_key_id.clone(),
            api_key_secret: self.api_key_secret.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(try_from = "Vec<RawPaymentTypeRule>")]
pub struct ConfigPaymentTypes(pub PaymentTypeRules);

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPaymentTypeRule {
    pattern: String,
    #[serde(rename = "type")]
    payment_type: PaymentType,
}

impl TryFrom<Vec<RawPaymentTypeRule>> for ConfigPaymentTypes {
    type Error = String;

    fn try_from(raw: Vec<RawPaymentTypeRule>) -> Result<Self, Self::Error> {
        PaymentTypeRules::new(
            raw.into_iter()
                .map(|rule| (rule.pattern, rule.payment_type)),
        )
        .map(ConfigPaymentTypes)
        .map_err(|e| format!("invalid payment type pattern: {e}"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub sandbox: Option<ConfigAccount>,
    pub production: Option<ConfigAccount>,
    pub payment_types: Option<ConfigPaymentTypes>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine the home directory")?;
        Ok(home.join(CONFIG_FILE_NAME))
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load `path`, or the file in the home directory when none was given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load_from_file(&Self::default_path()?),
        }
    }

    pub fn account(&self, environment: Environment) -> Result<&ConfigAccount> {
        let account = match environment {
            Environment::Sandbox => self.sandbox.as_ref(),
            Environment::Production => self.production.as_ref(),
        };
        account.with_context(|| format!("Config file has no [{environment}] section"))
    }

    pub fn payment_types(&self) -> PaymentTypeRules {
        self.payment_types
            .as_ref()
            .map(|rules| rules.0.clone())
            .unwrap_or_default()
    }

    /// API base url of `environment`, the provider's default unless overridden.
    pub fn url(&self, environment: Environment) -> Result<&str> {
        let account = self.account(environment)?;
        Ok(account
            .url
            .as_deref()
            .unwrap_or(environment.default_url()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_accounts() {
        let file = write_config(
            r#"
[sandbox]
api_key_id = "sandbox-id"
api_key_secret = "sandbox-secret"
url = "http://localhost:8080/api/v1"

[production]
api_key_id = "prod-id"
api_key_secret = "prod-secret"
"#,
        );
        let config = Config::load(Some(file.path())).unwrap();

        let sandbox = config.account(Environment::Sandbox).unwrap();
        assert_eq!(sandbox.credentials().api_key_id, "sandbox-id");
        assert_eq!(
            config.url(Environment::Sandbox).unwrap(),
            "http://localhost:8080/api/v1"
        );
        assert_eq!(
            config.url(Environment::Production).unwrap(),
            greeninvoice_client::PRODUCTION_URL
        );
        assert_eq!(
            config.payment_types().classify("bit העברה נכנסת"),
            PaymentType::PaymentApp
        );
    }

    #[test]
    fn missing_section() {
        let file = write_config(
            r#"
[sandbox]
api_key_id = "sandbox-id"
api_key_secret = "sandbox-secret"
"#,
        );
        let config = Config::load(Some(file.path())).unwrap();

        let error = config.account(Environment::Production).unwrap_err();
        assert_eq!(error.to_string(), "Config file has no [production] section");
    }

    #[test]
    fn custom_payment_types() {
        let file = write_config(
            r#"
[[payment_types]]
pattern = "paybox"
type = 10

[[payment_types]]
pattern = "צ'ק"
type = 2
"#,
        );
        let config = Config::load(Some(file.path())).unwrap();
        let rules = config.payment_types();

        assert_eq!(rules.classify("PayBox transfer"), PaymentType::PaymentApp);
        assert_eq!(rules.classify("צ'ק 1234"), PaymentType::Check);
        // replaces the default rules
        assert_eq!(rules.classify("מזומן"), PaymentType::ElectronicTransfer);
    }

    #[test]
    fn reject_unknown_keys() {
        let file = write_config(
            r#"
[sandbox]
api_key_id = "sandbox-id"
api_key_secret = "sandbox-secret"
api_url = "http://localhost"
"#,
        );
        let error = Config::load(Some(file.path())).unwrap_err();
        assert!(format!("{error:#}").contains("unknown field `api_url`"));
    }

    #[test]
    fn reject_invalid_pattern() {
        let file = write_config(
            r#"
[[payment_types]]
pattern = "(unclosed"
type = 1
"#,
        );
        let error = Config::load(Some(file.path())).unwrap_err();
        assert!(format!("{error:#}").contains("invalid payment type pattern"));
    }

    #[test]
    fn reject_unknown_payment_type() {
        let file = write_config(
            r#"
[[payment_types]]
pattern = "x"
type = 7
"#,
        );
        let error = Config::load(Some(file.path())).unwrap_err();
        assert!(format!("{error:#}").contains("unknown payment type 7"));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let error = Config::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(error.to_string().starts_with("Failed to read config file"));
    }
}
