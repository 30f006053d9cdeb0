#[cfg(test)]
pub mod test {
    use confique::Config;
    use serde::{Deserialize, Serialize};

    use crate::command::{CommandInfo, FlagInfo};
    use crate::fs::MemoryFs;

    #[derive(Config, Serialize, Deserialize, Debug, PartialEq)]
    pub struct TestConfig {
        /// The application host.
        #[config(default = "localhost")]
        pub host: String,

        /// The port number.
        #[config(default = 8080)]
        pub port: u16,

        /// Enable debug mode.
        #[config(default = false)]
        pub debug: bool,

        /// Database settings.
        #[config(nested)]
        pub database: TestDbConfig,
    }

    #[derive(Config, Serialize, Deserialize, Debug, PartialEq)]
    pub struct TestDbConfig {
        /// Connection string URL.
        pub url: Option<String>,

        /// Connection pool size.
        #[config(default = 5)]
        pub pool_size: usize,
    }

    #[test]
    fn test_config_loads_defaults() {
        let config = TestConfig::builder().load().unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8080);
        assert!(!config.debug);
        assert_eq!(config.database.url, None);
        assert_eq!(config.database.pool_size, 5);
    }

    // -- Environment and filesystem used by resolver tests ------------------

    pub fn test_env() -> Vec<(String, String)> {
        vec![
            ("HOME".to_string(), "/home/u".to_string()),
            ("XDG_CONFIG_HOME".to_string(), "/xdg".to_string()),
        ]
    }

    /// One file per default search stem for root name `app`.
    pub fn memory_fs() -> MemoryFs {
        MemoryFs::new()
            .with_file(
                "/xdg/app/config.json",
                r#"{"source": "xdg-json", "xdg_only": 1, "database": {"host": "db.local", "port": 5432}}"#,
            )
            .with_file(
                "/home/u/.app.toml",
                "source = \"home\"\nhome_only = 2\n\n[database]\nport = 5433\n",
            )
            .with_file("/work/.app.yaml", "source: project\nproject_only: true\n")
    }

    // -- Command tree used by binder and projector tests --------------------

    /// ```text
    /// app   --verbose --quiet --config --secret(hidden) --help --version
    /// ├── serve   --port --host, inherits --verbose
    /// ├── db      (no flags)
    /// │   ├── migrate   --steps
    /// │   └── status    (no flags)
    /// ├── debug   (hidden)      --trace
    /// └── legacy  (deprecated)  --old
    /// ```
    pub fn sample_command() -> CommandInfo {
        CommandInfo::new("app")
            .flag(FlagInfo::new("verbose", 0))
            .flag(FlagInfo::new("quiet", false))
            .flag(FlagInfo::unset("config"))
            .flag(FlagInfo::new("secret", "hunter2").hidden())
            .flag(FlagInfo::new("help", false))
            .flag(FlagInfo::new("version", false))
            .child(
                CommandInfo::new("serve")
                    .flag(FlagInfo::new("port", 8080))
                    .flag(FlagInfo::new("host", "localhost"))
                    .flag(FlagInfo::new("verbose", 0).inherited()),
            )
            .child(
                CommandInfo::new("db")
                    .child(CommandInfo::new("migrate").flag(FlagInfo::new("steps", 1)))
                    .child(CommandInfo::new("status")),
            )
            .child(
                CommandInfo::new("debug")
                    .hidden()
                    .flag(FlagInfo::new("trace", true)),
            )
            .child(
                CommandInfo::new("legacy")
                    .deprecated()
                    .flag(FlagInfo::new("old", 1)),
            )
    }
}
