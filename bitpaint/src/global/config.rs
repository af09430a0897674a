use bitpaint_core::state::editor::EditorConfig;

const DOCUMENTATION: &str = r#"# Bitpaint settings. You may edit this file, but be aware that formatting and comments will not
# be preserved, and all keys and values are case sensitive.

# [editor]
# scale = 4                 Display pixels per canvas pixel.
# grid = [16, 16]           Size of the guide grid.
# showCoordinates = true
# theme = "playdate"
# cropExports = true        Export only the drawn area rather than the whole canvas.
# customFills and customStrokes are added after the built-in fills and strokes.

"#;

#[derive(Clone, Default, Debug, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub editor: EditorConfig,
}

pub struct GlobalConfig {
    failed_to_load: bool,
    pub config: Config,
}
impl GlobalConfig {
    const FILENAME: &'static str = "bitpaint.toml";
    /// Shared global config, saved and loaded from user preferences.
    /// (Or defaulted, if unavailable for some reason)
    #[must_use]
    pub fn get() -> &'static Self {
        static GLOBAL_CONFIG: std::sync::OnceLock<GlobalConfig> = std::sync::OnceLock::new();

        GLOBAL_CONFIG.get_or_init(|| {
            let mut dir = super::preferences_dir();
            match dir.as_mut() {
                None => Self::no_path(),
                Some(dir) => {
                    dir.push(Self::FILENAME);
                    Self::load_or_default(dir)
                }
            }
        })
    }
    #[must_use]
    pub fn no_path() -> Self {
        log::warn!("Settings weren't available, defaulting.");
        Self {
            failed_to_load: true,
            config: Config::default(),
        }
    }
    #[must_use]
    fn load_or_default(path: &std::path::Path) -> Self {
        let config: anyhow::Result<Config> = try_block::try_block! {
            let string = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&string)?;
            Ok(config)
        };

        match config {
            Ok(config) => Self {
                failed_to_load: false,
                config,
            },
            Err(e) => {
                log::debug!("Reading {path:?}: {e:#}");
                Self::no_path()
            }
        }
    }
    /// Return true if loading user's settings failed.
    #[must_use]
    pub fn did_fail_to_load(&self) -> bool {
        self.failed_to_load
    }
    #[must_use]
    pub fn editor(&self) -> &EditorConfig {
        &self.config.editor
    }
    pub fn save(&self) -> anyhow::Result<()> {
        let mut preferences = super::preferences_dir()
            .ok_or_else(|| anyhow::anyhow!("No preferences dir found"))?;
        // Explicity do *not* create recursively. If not found, the user probably has a good reason.
        // Ignore errors (could already exist). Any real errors will be emitted by file access below.
        let _ = std::fs::DirBuilder::new().create(&preferences);

        preferences.push(Self::FILENAME);
        std::fs::write(preferences, to_documented_toml(&self.config)?)?;
        Ok(())
    }
}

fn to_documented_toml(config: &Config) -> anyhow::Result<String> {
    let string = toml::ser::to_string_pretty(config)?;
    // Prefix some documentation.
    Ok(DOCUMENTATION.to_owned() + &string)
}
