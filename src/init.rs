use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use crate::{
    models::{self, Config, Lang, LangMap},
    predict::Predictor,
    suggest::SuggestionEngine,
};

const SAMPLE_CONFIG: &str = include_str!("../config.sample.toml");

/// Initialize logger.
pub fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .format(|buf, record| {
            use std::io::Write;
            let level = if record.level() != log::Level::Info {
                format!("[{}] ", record.level())
            } else {
                String::new()
            };
            writeln!(
                buf,
                "{} {}:{} {}{}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                level,
                record.args()
            )
        })
        .init();
}

/// Load and merge one or more config files.
pub fn init_config(paths: &[PathBuf]) -> models::Config {
    let mut config: Option<models::Config> = None;

    for path in paths {
        log::info!("loading config: {}", path.display());
        match read_config(path) {
            Ok(c) => {
                if let Some(ref mut existing) = config {
                    // Merge configs.
                    merge_config(existing, c);
                } else {
                    config = Some(c);
                }
            }
            Err(e) => {
                log::error!("error loading config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }

    config.unwrap_or_else(|| {
        log::error!("no config files specified");
        std::process::exit(1);
    })
}

/// Generate sample config file.
pub fn generate_config(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        return Err("config file already exists".into());
    }
    std::fs::write(path, SAMPLE_CONFIG)?;
    Ok(())
}

/// Load configuration from TOML file.
fn read_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&content)?;
    Ok(cfg)
}

/// Merge the given src config into the dest config struct.
fn merge_config(dest: &mut Config, src: Config) {
    if !src.app.address.is_empty() {
        dest.app.address = src.app.address;
    }
    if src.app.default_suggestions > 0 {
        dest.app.default_suggestions = src.app.default_suggestions;
    }
    if src.app.max_suggestions > 0 {
        dest.app.max_suggestions = src.app.max_suggestions;
    }
    if src.app.default_top_k > 0 {
        dest.app.default_top_k = src.app.default_top_k;
    }
    if src.app.max_top_k > 0 {
        dest.app.max_top_k = src.app.max_top_k;
    }
    if src.app.fuzzy_alphabet_start > 0 {
        dest.app.fuzzy_alphabet_start = src.app.fuzzy_alphabet_start;
    }
    if src.app.fuzzy_alphabet_end > 0 {
        dest.app.fuzzy_alphabet_end = src.app.fuzzy_alphabet_end;
    }

    // Merge languages.
    for (id, lang) in src.lang {
        dest.lang.insert(id, lang);
    }
}

/// Initialize languages from config.
pub fn init_langs(config: &Config) -> LangMap {
    let mut langs = LangMap::new();

    for (id, cfg) in &config.lang {
        let lang = Lang {
            id: id.clone(),
            name: if cfg.name.is_empty() {
                id.clone()
            } else {
                cfg.name.clone()
            },
            dictionary: cfg.dictionary.clone(),
            bigrams: cfg.bigrams.clone(),
        };

        log::info!(
            "language: {} (dictionary: {}, bigrams: {})",
            id,
            if lang.dictionary.is_empty() { "-" } else { lang.dictionary.as_str() },
            if lang.bigrams.is_empty() { "-" } else { lang.bigrams.as_str() },
        );
        langs.insert(id.clone(), lang);
    }

    if langs.is_empty() {
        log::warn!("no languages configured");
    }

    langs
}

/// Build the fuzzy substitution/insertion alphabet from the configured code
/// point range, defaulting to the Devanagari block when unset.
pub fn init_fuzzy_alphabet(config: &Config) -> Vec<char> {
    let (start, end) = (
        config.app.fuzzy_alphabet_start,
        config.app.fuzzy_alphabet_end,
    );
    if start == 0 || end <= start {
        return SuggestionEngine::devanagari_alphabet();
    }
    (start..end).filter_map(char::from_u32).collect()
}

/// Build the suggestion engine by loading every configured dictionary into
/// one shared trie. A missing or unreadable file skips that vocabulary and
/// the rest still load; entries read before a failure stay in place.
pub fn init_suggester(langs: &LangMap, alphabet: Vec<char>) -> SuggestionEngine {
    let mut engine = SuggestionEngine::new(alphabet);

    // Sorted so repeated loads insert in a stable order.
    let mut ids: Vec<&String> = langs.keys().collect();
    ids.sort();

    for id in ids {
        let lang = &langs[id];
        if lang.dictionary.is_empty() {
            continue;
        }

        let path = Path::new(&lang.dictionary);
        if !path.exists() {
            log::warn!("dictionary for '{}' not found: {}, skipping", id, lang.dictionary);
            continue;
        }

        match open_and_load(path, |r| engine.load_reader(r)) {
            Ok(n) => log::info!("loaded {} words for '{}' from {}", n, id, lang.dictionary),
            Err(e) => log::error!("error loading dictionary {}: {}", lang.dictionary, e),
        }
    }

    engine
}

/// Build the predictor by loading every configured bigram dataset, with the
/// same per-vocabulary skip behaviour as dictionaries.
pub fn init_predictor(langs: &LangMap) -> Predictor {
    let mut predictor = Predictor::new();

    let mut ids: Vec<&String> = langs.keys().collect();
    ids.sort();

    for id in ids {
        let lang = &langs[id];
        if lang.bigrams.is_empty() {
            continue;
        }

        let path = Path::new(&lang.bigrams);
        if !path.exists() {
            log::warn!("bigrams for '{}' not found: {}, skipping", id, lang.bigrams);
            continue;
        }

        match open_and_load(path, |r| predictor.load_reader(r)) {
            Ok(n) => log::info!("loaded {} bigram pairs for '{}' from {}", n, id, lang.bigrams),
            Err(e) => log::error!("error loading bigrams {}: {}", lang.bigrams, e),
        }
    }

    predictor
}

fn open_and_load<F>(path: &Path, load: F) -> Result<usize, models::LoadError>
where
    F: FnOnce(BufReader<File>) -> Result<usize, models::LoadError>,
{
    let file = File::open(path)?;
    load(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppConfig, LangConfig};

    #[test]
    fn merge_overrides_non_empty_fields() {
        let mut dest = Config {
            app: AppConfig {
                address: "0.0.0.0:8000".to_string(),
                default_suggestions: 10,
                ..Default::default()
            },
            ..Default::default()
        };

        let mut src = Config::default();
        src.app.address = "127.0.0.1:9000".to_string();
        src.lang.insert(
            "hindi".to_string(),
            LangConfig {
                name: "Hindi".to_string(),
                dictionary: "datasets/hindi.txt".to_string(),
                ..Default::default()
            },
        );

        merge_config(&mut dest, src);
        assert_eq!(dest.app.address, "127.0.0.1:9000");
        assert_eq!(dest.app.default_suggestions, 10);
        assert_eq!(dest.lang["hindi"].name, "Hindi");
    }

    #[test]
    fn fuzzy_alphabet_defaults_to_devanagari() {
        let config = Config::default();
        let alphabet = init_fuzzy_alphabet(&config);
        assert_eq!(alphabet.first(), Some(&'\u{0900}'));
        assert_eq!(alphabet.last(), Some(&'\u{097E}'));
    }

    #[test]
    fn fuzzy_alphabet_from_config_range() {
        let mut config = Config::default();
        config.app.fuzzy_alphabet_start = 0x61; // 'a'
        config.app.fuzzy_alphabet_end = 0x64; // up to but excluding 'd'
        assert_eq!(init_fuzzy_alphabet(&config), vec!['a', 'b', 'c']);
    }
}
