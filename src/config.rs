use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_yaml;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cartsync")]
#[command(about = "Keeps a cart page in step with the cart service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,

    /// YAML fixture describing the initial page markup
    #[arg(short = 'p', long = "page")]
    pub page_path: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a product to the cart
    Add {
        product_id: String,
        #[arg(short = 'q', long = "quantity", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    /// Remove a product from the cart
    Remove { product_id: String },
    /// Set the quantity of a line item
    Update { product_id: String, quantity: u32 },
    /// Fetch the current cart count and total
    Count,
    /// Click a bound element of the page fixture
    Click { element: u64 },
    /// Change the value of a bound quantity input, then fire its change event
    Change { element: u64, value: String },
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cartsync")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Clone)]
pub struct Service {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub endpoints: Endpoints,
}

fn default_timeout() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Endpoints {
    pub add: String,
    pub remove: String,
    pub update: String,
    pub count: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            add: "/orders/ajax/cart/add/".to_string(),
            remove: "/orders/ajax/cart/remove/".to_string(),
            update: "/orders/ajax/cart/update/".to_string(),
            count: "/orders/ajax/cart/count/".to_string(),
        }
    }
}

/// Class and field names the controller looks for on the page.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PageConfig {
    pub add_trigger: String,
    pub quantity_input: String,
    pub remove_trigger: String,
    pub item_row_prefix: String,
    pub item_total_prefix: String,
    pub count_badge: String,
    pub total_display: String,
    pub notification: String,
    pub csrf_field: String,
    pub currency_prefix: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        PageConfig {
            add_trigger: "add-to-cart-btn".to_string(),
            quantity_input: "quantity-input".to_string(),
            remove_trigger: "remove-from-cart-btn".to_string(),
            item_row_prefix: "cart-item-".to_string(),
            item_total_prefix: "item-total-".to_string(),
            count_badge: "cart-count".to_string(),
            total_display: "cart-total".to_string(),
            notification: "cart-notification".to_string(),
            csrf_field: "csrfmiddlewaretoken".to_string(),
            currency_prefix: "KSh".to_string(),
        }
    }
}

impl PageConfig {
    pub fn item_row_class(&self, product_id: &str) -> String {
        format!("{}{}", self.item_row_prefix, product_id)
    }

    pub fn item_total_class(&self, product_id: &str) -> String {
        format!("{}{}", self.item_total_prefix, product_id)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Signal {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    64
}

impl Default for Signal {
    fn default() -> Self {
        Signal {
            capacity: default_capacity(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub service: Service,
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub signal: Signal,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let cfg = Config::load_config(path)?;
        Ok(cfg)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn load_config(path: &str) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)?;
        Config::from_yaml(&yaml_str)
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        tracing::warn!(var = var_name, "environment variable not found");
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}
