use clap::Parser;
use dupefind::cli::{Cli, OutputFormat};
use dupefind::config::Config;
use figment::Jail;
use std::path::Path;

#[test]
fn test_config_load_defaults() {
    Jail::expect_with(|_jail| {
        let config: Config = Config::figment(None).extract()?;
        assert_eq!(config, Config::default());
        Ok(())
    });
}

#[test]
fn test_config_load_from_env() {
    Jail::expect_with(|jail| {
        jail.set_env("DUPEFIND_THREADS", "16");
        jail.set_env("DUPEFIND_FOLLOW_SYMLINKS", "true");
        jail.set_env("DUPEFIND_OUTPUT", "json");

        let config: Config = Config::figment(None).extract()?;

        assert_eq!(config.threads, 16);
        assert!(config.follow_symlinks);
        assert_eq!(config.output, OutputFormat::Json);
        assert!(config.mmap);
        Ok(())
    });
}

#[test]
fn test_config_load_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
threads = 8
strict = true
mmap = false
mmap_threshold = 1048576
"#,
        )?;

        let config: Config = Config::figment(Some(Path::new("config.toml"))).extract()?;

        assert_eq!(config.threads, 8);
        assert!(config.strict);
        assert!(!config.mmap);
        assert_eq!(config.mmap_threshold, 1_048_576);
        assert!(!config.follow_symlinks);
        Ok(())
    });
}

#[test]
fn test_env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "threads = 8\n")?;
        jail.set_env("DUPEFIND_THREADS", "2");

        let config: Config = Config::figment(Some(Path::new("config.toml"))).extract()?;

        assert_eq!(config.threads, 2);
        Ok(())
    });
}

#[test]
fn test_cli_overrides_everything() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "threads = 8\noutput = \"json\"\n")?;
        jail.set_env("DUPEFIND_THREADS", "2");

        let mut config = Config::load(Some(Path::new("config.toml"))).unwrap();
        let cli = Cli::try_parse_from(["dupefind", "/path", "--threads", "5", "--output", "text"])
            .unwrap();
        config.apply_cli(&cli);

        assert_eq!(config.threads, 5);
        assert_eq!(config.output, OutputFormat::Text);
        Ok(())
    });
}

#[test]
fn test_config_invalid_toml_is_error() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "invalid = toml")?;

        let result = Config::load(Some(Path::new("config.toml")));

        assert!(result.is_err());
        Ok(())
    });
}

#[test]
fn test_config_mistyped_value_is_error() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "threads = \"many\"\n")?;

        let result = Config::load(Some(Path::new("config.toml")));

        assert!(result.is_err());
        Ok(())
    });
}
