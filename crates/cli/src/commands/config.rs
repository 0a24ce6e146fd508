//! Config command - view or modify configuration.

use anyhow::Result;
use gpgstream_core::{platform, Config};

pub fn execute(key: Option<String>, value: Option<String>) -> Result<()> {
    let mut config = Config::load()?;

    match (key.as_deref(), value) {
        (None, None) => {
            println!("Current Configuration ({:?})", platform::config_file_path());
            println!("=====================");
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        (Some(key), None) => match key {
            "gpg_path" => println!("{:?}", config.gpg_path),
            "home_dir" => println!("{:?}", config.home_dir),
            "extra_args" => println!("{:?}", config.extra_args),
            _ => println!("Unknown config key: {}", key),
        },
        (Some(key), Some(value)) => {
            match key {
                "gpg_path" => config.gpg_path = non_empty(value).map(Into::into),
                "home_dir" => config.home_dir = non_empty(value).map(Into::into),
                "extra_args" => {
                    config.extra_args = value.split_whitespace().map(String::from).collect()
                }
                _ => {
                    println!("Cannot set config key: {}", key);
                    return Ok(());
                }
            }
            config.save()?;
            println!("Set {}", key);
        }
        (None, Some(_)) => {
            println!("Must specify a key to set a value");
        }
    }

    Ok(())
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
