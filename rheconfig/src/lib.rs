//! # Configuration de RadioHome
//!
//! Gestion de la configuration de l'application :
//! - chargement d'un fichier YAML externe fusionné sur la configuration
//!   par défaut intégrée au binaire,
//! - surcharge par variables d'environnement,
//! - accesseurs typés avec valeurs par défaut,
//! - singleton thread-safe accessible via [`get_config`].
//!
//! ```no_run
//! use rheconfig::get_config;
//!
//! let config = get_config();
//! let port = config.get_http_port();
//! let lyrion = config.get_lyrion_host();
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use rheutils::guess_local_ip;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex},
};
use tracing::{info, warn};
use uuid::Uuid;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("radiohome.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load RadioHome configuration"));
}

const ENV_CONFIG_DIR: &str = "RADIOHOME_CONFIG";
const ENV_PREFIX: &str = "RADIOHOME_CONFIG__";
const DOT_DIR: &str = ".radiohome";

const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_LYRION_HOST: &str = "127.0.0.1";
const DEFAULT_LYRION_CLI_PORT: u16 = 9090;
const DEFAULT_LYRION_TIMEOUT_SECS: u64 = 5;
const DEFAULT_LYRION_REFRESH_SECS: u64 = 30;
const DEFAULT_DRIVES_INFO_PATH: &str = "/proc/sys/dev/cdrom/info";
const DEFAULT_DRIVES_DEV_DIR: &str = "/dev";
const DEFAULT_PARANOIA_BIN: &str = "cdparanoia";
const DEFAULT_LOG_BUFFER_CAPACITY: usize = 1000;
const DEFAULT_LOG_MIN_LEVEL: &str = "TRACE";
const DEFAULT_LOG_ENABLE_CONSOLE: bool = true;

/// Génère un getter/setter pour une valeur entière positive
macro_rules! impl_u64_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> u64 {
            match self.get_value($path) {
                Ok(Value::Number(n)) if n.is_u64() => n.as_u64().unwrap(),
                Ok(Value::Number(n)) if n.is_i64() => n.as_i64().unwrap().max(0) as u64,
                _ => $default,
            }
        }

        pub fn $setter(&self, value: u64) -> Result<()> {
            self.set_value($path, Value::Number(Number::from(value)))
        }
    };
}

/// Génère un getter/setter pour un booléen
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> bool {
            match self.get_value($path) {
                Ok(Value::Bool(b)) => b,
                _ => $default,
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Génère un getter/setter pour une chaîne non vide
macro_rules! impl_string_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> String {
            match self.get_value($path) {
                Ok(Value::String(s)) if !s.is_empty() => s,
                _ => $default.to_string(),
            }
        }

        pub fn $setter(&self, value: String) -> Result<()> {
            self.set_value($path, Value::String(value))
        }
    };
}

/// Gestionnaire de configuration de RadioHome.
///
/// L'arbre YAML vit derrière un `Mutex` ; chaque mutation est réécrite sur
/// disque dans le `config.yaml` du répertoire de configuration.
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

impl Config {
    /// Cherche le répertoire de configuration, dans l'ordre :
    /// paramètre explicite, variable `RADIOHOME_CONFIG`, `.radiohome`
    /// du répertoire courant puis du home, sinon `.radiohome` local.
    fn find_config_dir(directory: &str) -> String {
        if !directory.is_empty() {
            return directory.to_string();
        }

        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return env_path;
        }

        if Path::new(DOT_DIR).exists() {
            return DOT_DIR.to_string();
        }

        if let Some(home) = home_dir() {
            let home_config = home.join(DOT_DIR);
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        DOT_DIR.to_string()
    }

    /// Crée le répertoire si besoin et vérifie les droits de lecture/écriture.
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        if !path.is_dir() {
            return Err(anyhow!("Le chemin de configuration n'est pas un répertoire"));
        }

        let probe = path.join(".write_test");
        fs::write(&probe, b"test")?;
        fs::remove_file(&probe)?;
        fs::read_dir(path)?;

        Ok(())
    }

    /// Charge la configuration depuis `directory` (vide = recherche standard).
    ///
    /// Fusionne le fichier externe sur la configuration par défaut,
    /// applique les surcharges d'environnement puis sauve le résultat.
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&config_dir))?;
        info!(config_dir = %config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        let mut merged: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        if let Ok(data) = fs::read(&path) {
            info!(config_file = %path, "Loaded config file");
            let external: Value = serde_yaml::from_slice(&data)?;
            merge_yaml(&mut merged, &external);
        } else {
            info!(config_file = %path, "Config file not found, using embedded defaults");
        }

        let mut config_value = Self::lower_keys(merged);
        Self::apply_env_overrides(&mut config_value);

        let config = Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    /// Sauvegarde la configuration courante dans le fichier config.yaml.
    pub fn save(&self) -> Result<()> {
        let data = self.data.lock().unwrap();
        let yaml = serde_yaml::to_string(&*data)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Écrit une valeur au chemin donné puis sauvegarde.
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.data.lock().unwrap();
            Self::set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        let Value::Mapping(map) = data else {
            return Err(anyhow!("Current node is not a map"));
        };
        let key = Value::String(path[0].to_lowercase());
        if path.len() == 1 {
            map.insert(key, value);
            Ok(())
        } else {
            let entry = map.entry(key).or_insert(Value::Mapping(Mapping::new()));
            Self::set_value_internal(entry, &path[1..], value)
        }
    }

    /// Lit la valeur au chemin donné (`&["lyrion", "host"]`).
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data.lock().unwrap();
        let mut current = &*data;
        for (i, key) in path.iter().enumerate() {
            let Value::Mapping(map) = current else {
                return Err(anyhow!("Path {} is not a mapping", path[..i].join(".")));
            };
            match map.get(&Value::String(key.to_lowercase())) {
                Some(next) => current = next,
                None => return Err(anyhow!("Path {} does not exist", path[..=i].join("."))),
            }
        }
        Ok(current.clone())
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if let Some(rest) = key.strip_prefix(ENV_PREFIX) {
                let key_path = rest.split("__").collect::<Vec<_>>();
                let yaml_value = serde_yaml::from_str::<Value>(&value)
                    .unwrap_or(Value::String(value.clone()));
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn lower_keys(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut out = Mapping::new();
                for (k, v) in map {
                    let k = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    out.insert(k, Self::lower_keys(v));
                }
                Value::Mapping(out)
            }
            Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(Self::lower_keys).collect()),
            _ => value,
        }
    }

    /// Résout un chemin (absolu, ou relatif au répertoire de configuration)
    /// et crée le répertoire s'il n'existe pas.
    fn resolve_and_create_dir(&self, dir_path: &str) -> Result<String> {
        let path = Path::new(dir_path);
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&self.config_dir).join(path)
        };

        if !absolute.exists() {
            fs::create_dir_all(&absolute)?;
            info!(directory = %absolute.display(), "Created managed directory");
        }

        Ok(absolute.to_string_lossy().to_string())
    }

    // ----- host -----

    /// Base URL du serveur HTTP ; devine l'IP locale si non configurée.
    pub fn get_base_url(&self) -> String {
        match self.get_value(&["host", "base_url"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => guess_local_ip(),
        }
    }

    /// Port HTTP configuré, ou 8080.
    pub fn get_http_port(&self) -> u16 {
        match self.get_value(&["host", "http_port"]) {
            Ok(Value::Number(n)) if n.is_i64() => n.as_i64().unwrap() as u16,
            Ok(Value::String(s)) => s.parse::<u16>().unwrap_or_else(|_| {
                warn!("Invalid HTTP port '{}', using default {}", s, DEFAULT_HTTP_PORT);
                DEFAULT_HTTP_PORT
            }),
            _ => DEFAULT_HTTP_PORT,
        }
    }

    pub fn set_http_port(&self, port: u16) -> Result<()> {
        self.set_value(&["host", "http_port"], Value::Number(Number::from(port)))
    }

    /// Identifiant unique de cette instance, généré et persisté au premier accès.
    pub fn get_instance_id(&self) -> Result<String> {
        match self.get_value(&["host", "instance_id"]) {
            Ok(Value::String(id)) if !id.trim().is_empty() => Ok(id.trim().to_string()),
            _ => {
                let id = Uuid::new_v4().to_string();
                self.set_value(&["host", "instance_id"], Value::String(id.clone()))?;
                Ok(id)
            }
        }
    }

    // ----- lyrion -----

    impl_string_config!(
        get_lyrion_host,
        set_lyrion_host,
        &["lyrion", "host"],
        DEFAULT_LYRION_HOST
    );

    /// Port du protocole CLI de Lyrion Music Server (telnet, 9090 par défaut).
    pub fn get_lyrion_cli_port(&self) -> u16 {
        match self.get_value(&["lyrion", "cli_port"]) {
            Ok(Value::Number(n)) if n.is_i64() => n.as_i64().unwrap() as u16,
            _ => DEFAULT_LYRION_CLI_PORT,
        }
    }

    impl_u64_config!(
        get_lyrion_timeout_secs,
        set_lyrion_timeout_secs,
        &["lyrion", "timeout_secs"],
        DEFAULT_LYRION_TIMEOUT_SECS
    );

    impl_u64_config!(
        get_lyrion_refresh_secs,
        set_lyrion_refresh_secs,
        &["lyrion", "refresh_secs"],
        DEFAULT_LYRION_REFRESH_SECS
    );

    // ----- drives -----

    impl_string_config!(
        get_drives_info_path,
        set_drives_info_path,
        &["drives", "info_path"],
        DEFAULT_DRIVES_INFO_PATH
    );

    impl_string_config!(
        get_drives_dev_dir,
        set_drives_dev_dir,
        &["drives", "dev_dir"],
        DEFAULT_DRIVES_DEV_DIR
    );

    // ----- rip -----

    /// Répertoire de sortie des rips, créé s'il n'existe pas.
    pub fn get_rip_output_dir(&self) -> Result<String> {
        let dir = match self.get_value(&["rip", "output_dir"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => "rips".to_string(),
        };
        self.resolve_and_create_dir(&dir)
    }

    impl_string_config!(
        get_rip_paranoia_bin,
        set_rip_paranoia_bin,
        &["rip", "paranoia_bin"],
        DEFAULT_PARANOIA_BIN
    );

    impl_bool_config!(
        get_rip_eject_after,
        set_rip_eject_after,
        &["rip", "eject_after"],
        false
    );

    // ----- logger -----

    impl_u64_config!(
        get_log_cache_size_raw,
        set_log_cache_size_raw,
        &["host", "logger", "buffer_capacity"],
        DEFAULT_LOG_BUFFER_CAPACITY as u64
    );

    pub fn get_log_cache_size(&self) -> usize {
        self.get_log_cache_size_raw() as usize
    }

    impl_bool_config!(
        get_log_enable_console,
        set_log_enable_console,
        &["host", "logger", "enable_console"],
        DEFAULT_LOG_ENABLE_CONSOLE
    );

    impl_string_config!(
        get_log_min_level,
        set_log_min_level,
        &["host", "logger", "min_level"],
        DEFAULT_LOG_MIN_LEVEL
    );
}

/// Retourne l'instance globale de configuration (chargée au premier accès).
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Fusionne récursivement `external` dans `default` :
/// les mappings sont fusionnés clé par clé, les scalaires et séquences
/// externes remplacent la valeur par défaut.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}
