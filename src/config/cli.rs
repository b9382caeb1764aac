use crate::config::{AppSettings, TomlConfig};
use crate::core::table::OutputFormat;
use crate::domain::model::MAX_PAGE_SIZE;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Args, Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "tour-admin")]
#[command(about = "Back-office client for the travel-content admin API")]
#[command(version)]
pub struct CliConfig {
    #[arg(long, global = true, help = "Admin API base URL")]
    pub base_url: Option<String>,

    #[arg(long, global = true, help = "Directory for session and preference files")]
    pub state_dir: Option<String>,

    #[arg(long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "HTTP request timeout in seconds")]
    pub timeout_seconds: Option<u64>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Subcommand)]
pub enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        login: String,
        #[arg(long, env = "TOUR_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Clear the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List the manageable resources
    Resources,
    /// Show or toggle dark mode
    Theme {
        #[command(subcommand)]
        action: ThemeCommand,
    },
    /// Show one page of a resource
    List(ListArgs),
    /// Create a record
    Add {
        resource: String,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Update a record
    Edit {
        resource: String,
        id: String,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Delete a record
    Delete { resource: String, id: String },
}

// 密碼不可出現在日誌中
impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Login { login, password } => f
                .debug_struct("Login")
                .field("login", login)
                .field("password", &password.as_ref().map(|_| "<redacted>"))
                .finish(),
            Command::Logout => f.write_str("Logout"),
            Command::Whoami => f.write_str("Whoami"),
            Command::Resources => f.write_str("Resources"),
            Command::Theme { action } => f.debug_struct("Theme").field("action", action).finish(),
            Command::List(args) => f.debug_tuple("List").field(args).finish(),
            Command::Add { resource, form } => f
                .debug_struct("Add")
                .field("resource", resource)
                .field("form", form)
                .finish(),
            Command::Edit { resource, id, form } => f
                .debug_struct("Edit")
                .field("resource", resource)
                .field("id", id)
                .field("form", form)
                .finish(),
            Command::Delete { resource, id } => f
                .debug_struct("Delete")
                .field("resource", resource)
                .field("id", id)
                .finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum ThemeCommand {
    Show,
    Toggle,
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    pub resource: String,

    #[arg(long, default_value = "1")]
    pub page: u32,

    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(1..=MAX_PAGE_SIZE as i64),
        help = "Page size, 1 to 100 (defaults to the configured page size)"
    )]
    pub limit: Option<u32>,

    #[arg(long)]
    pub search: Option<String>,

    #[arg(long, default_value = "table", help = "table, csv or json")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FormArgs {
    #[arg(short = 'f', long = "field", value_name = "KEY=VALUE")]
    pub fields: Vec<String>,

    #[arg(long = "file", value_name = "KEY=PATH")]
    pub files: Vec<String>,
}

impl CliConfig {
    /// Merges defaults, the optional TOML file and command-line flags, in
    /// that order, and validates the result.
    pub fn resolve_settings(&self) -> Result<AppSettings> {
        let mut settings = match &self.config {
            Some(path) => {
                let toml = TomlConfig::from_file(path)?;
                toml.validate()?;
                tracing::debug!("Loaded configuration from {}", path.display());
                AppSettings::from_provider(&toml)
            }
            None => AppSettings::default(),
        };

        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(state_dir) = &self.state_dir {
            settings.state_dir = state_dir.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            settings.timeout_seconds = timeout;
        }

        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BASE_URL;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_list_command() {
        let cli = CliConfig::parse_from([
            "tour-admin",
            "list",
            "reviews",
            "--page",
            "2",
            "--search",
            "Aziz",
            "--format",
            "csv",
        ]);
        match cli.command {
            Command::List(args) => {
                assert_eq!(args.resource, "reviews");
                assert_eq!(args.page, 2);
                assert_eq!(args.limit, None);
                assert_eq!(args.search.as_deref(), Some("Aziz"));
                assert_eq!(args.format, OutputFormat::Csv);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_form_arguments() {
        let cli = CliConfig::parse_from([
            "tour-admin",
            "--verbose",
            "edit",
            "days",
            "d1",
            "-f",
            "title=Bukhara",
            "--field",
            "lat=39.77",
            "--file",
            "image=./ark.png",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Command::Edit { resource, id, form } => {
                assert_eq!(resource, "days");
                assert_eq!(id, "d1");
                assert_eq!(form.fields, vec!["title=Bukhara", "lat=39.77"]);
                assert_eq!(form.files, vec!["image=./ark.png"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_debug_output_hides_password() {
        let cli = CliConfig::parse_from([
            "tour-admin",
            "-v",
            "login",
            "--login",
            "admin",
            "--password",
            "hunter22",
        ]);
        let logged = format!("CLI config: {:?}", cli.command);
        assert!(!logged.contains("hunter22"));
        assert!(logged.contains("<redacted>"));
        assert!(logged.contains("admin"));

        let cli = CliConfig::parse_from(["tour-admin", "delete", "levels", "l1"]);
        assert_eq!(
            format!("{:?}", cli.command),
            r#"Delete { resource: "levels", id: "l1" }"#
        );
    }

    #[test]
    fn test_parse_limit_bounds() {
        for (raw, limit) in [("1", 1), ("100", 100)] {
            let cli = CliConfig::parse_from(["tour-admin", "list", "levels", "--limit", raw]);
            match cli.command {
                Command::List(args) => assert_eq!(args.limit, Some(limit)),
                other => panic!("unexpected command: {:?}", other),
            }
        }
        for bad in ["0", "101"] {
            let result =
                CliConfig::try_parse_from(["tour-admin", "list", "levels", "--limit", bad]);
            assert!(result.is_err(), "limit {} should be rejected", bad);
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[api]\nbase_url = \"https://from-file.example\"\ntimeout_seconds = 12\n")
            .unwrap();
        let config_path = file.path().to_string_lossy().to_string();

        let cli = CliConfig::parse_from([
            "tour-admin",
            "--config",
            &config_path,
            "--timeout-seconds",
            "45",
            "whoami",
        ]);
        let settings = cli.resolve_settings().unwrap();
        assert_eq!(settings.base_url, "https://from-file.example");
        assert_eq!(settings.timeout_seconds, 45);

        let cli = CliConfig::parse_from(["tour-admin", "resources"]);
        assert_eq!(cli.resolve_settings().unwrap().base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_invalid_flag_value_is_rejected() {
        let cli = CliConfig::parse_from(["tour-admin", "--base-url", "localhost", "whoami"]);
        assert!(cli.resolve_settings().is_err());
    }
}
