use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineArgs {
    /// Optional YAML config file. Flags below override its values.
    #[arg(long, short)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub route: Option<PathBuf>,
    #[arg(long)]
    pub broker: Option<String>,
    #[arg(long)]
    pub interval_ms: Option<u64>,
    #[arg(long)]
    pub speed: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Logging {
    #[default]
    Info,
    None,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_vehicle_id")]
    pub vehicle_id: String,
    /// Explicit route file. When unset, the binary picks the first `.itn`
    /// file found in `waypoint_dir`.
    #[serde(default)]
    pub route: Option<PathBuf>,
    #[serde(default = "default_waypoint_dir")]
    pub waypoint_dir: PathBuf,
    #[serde(default = "default_broker")]
    pub broker: String,
    #[serde(default = "default_status_topic")]
    pub status_topic: String,
    #[serde(default = "default_interval_ms")]
    pub publish_interval_ms: u64,
    /// Cruising speed in degrees per second.
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub qos: u8,
    #[serde(default)]
    pub retain: bool,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        serde_yaml::from_str("{}").unwrap()
    }
}

impl From<CommandLineArgs> for Config {
    fn from(args: CommandLineArgs) -> Self {
        let mut config = match &args.config {
            Some(path) => {
                let yaml = fs::read_to_string(path).unwrap_or_else(|e| {
                    panic!(
                        "Failed to read config at {:?}. Original error was: {}",
                        path, e
                    )
                });
                serde_yaml::from_str(&yaml).unwrap_or_else(|e| {
                    panic!(
                        "Failed to parse config at {:?}. Original error was: {}",
                        path, e
                    )
                })
            }
            None => Config::default(),
        };

        if let Some(id) = args.id {
            config.vehicle_id = id;
        }
        if let Some(route) = args.route {
            config.route = Some(route);
        }
        if let Some(broker) = args.broker {
            config.broker = broker;
        }
        if let Some(interval_ms) = args.interval_ms {
            config.publish_interval_ms = interval_ms;
        }
        if let Some(speed) = args.speed {
            config.speed = speed;
        }
        config
    }
}

impl Config {
    /// Broker client id, unique per session so reconnecting simulators
    /// never collide.
    pub fn client_id(&self) -> String {
        format!("{}-{}", self.vehicle_id, Uuid::now_v7())
    }
}

fn default_vehicle_id() -> String {
    String::from("postauto")
}

fn default_waypoint_dir() -> PathBuf {
    PathBuf::from("./waypoints")
}

fn default_broker() -> String {
    String::from("tcp://localhost:1883")
}

fn default_status_topic() -> String {
    String::from("vehicles")
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_speed() -> f64 {
    0.0005
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./")
}
