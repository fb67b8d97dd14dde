use anyhow::Result;
use std::path::PathBuf;

use capmit1003::{config::Config, db::Dataset, export, fetch, logging};

enum Command {
    Captions { csv: Option<PathBuf> },
    Clicks { obs_uid: String, csv: Option<PathBuf> },
    Fetch,
    Verify,
}

struct Args {
    command: Command,
    config_path: Option<PathBuf>,
    db_path: Option<PathBuf>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path = None;
    let mut db_path = None;
    let mut csv = None;
    let mut command_name = None;
    let mut obs_uid = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("capmit1003 {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--db" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --db requires a path argument");
                    std::process::exit(1);
                }
            }
            "--csv" => {
                if i + 1 < args.len() {
                    csv = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --csv requires a path argument");
                    std::process::exit(1);
                }
            }
            name if command_name.is_none() && !name.starts_with('-') => {
                command_name = Some(name.to_string());
            }
            uid if command_name.as_deref() == Some("clicks") && obs_uid.is_none() => {
                obs_uid = Some(uid.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let command = match command_name.as_deref() {
        Some("captions") => Command::Captions { csv },
        Some("clicks") => match obs_uid {
            Some(obs_uid) => Command::Clicks { obs_uid, csv },
            None => {
                eprintln!("Error: clicks requires an OBS_UID argument");
                std::process::exit(1);
            }
        },
        Some("fetch") => Command::Fetch,
        Some("verify") => Command::Verify,
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            print_help();
            std::process::exit(1);
        }
        None => {
            print_help();
            std::process::exit(1);
        }
    };

    Args {
        command,
        config_path,
        db_path,
    }
}

fn print_help() {
    println!(
        r#"capmit1003 - accessor for the CapMIT1003 caption and click-path dataset

USAGE:
    capmit1003 [OPTIONS] <COMMAND>

COMMANDS:
    captions            List all image-caption pairs
    clicks OBS_UID      Print the click path for one observation
    fetch               Download and extract the MIT1003 stimuli images
    verify              Report observations whose stimulus image is missing

OPTIONS:
    --config, -c PATH   Path to config file
    --db PATH           Path to the SQLite store (overrides config)
    --csv PATH          Write captions/clicks output to a CSV file
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    CAPMIT1003_LOG      Log level (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/capmit1003/config.toml"#
    );
}

fn main() -> Result<()> {
    let args = parse_args();

    logging::init();

    let config = match &args.config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let db_path = args.db_path.unwrap_or_else(|| config.db_path.clone());

    match args.command {
        Command::Captions { csv } => {
            let db = Dataset::open(&db_path)?;
            match csv {
                Some(out) => {
                    let count = export::export_captions(&db, &out)?;
                    println!("Wrote {} captions to {}", count, out.display());
                }
                None => {
                    for caption in db.get_captions()? {
                        println!(
                            "{}\t{}\t{}\t{}\t{}",
                            caption.obs_uid,
                            caption.usr_uid,
                            caption.start_time,
                            caption.img_path.as_deref().unwrap_or("-"),
                            caption.caption
                        );
                    }
                }
            }
        }
        Command::Clicks { obs_uid, csv } => {
            let db = Dataset::open(&db_path)?;
            match csv {
                Some(out) => {
                    let count = export::export_click_path(&db, &obs_uid, &out)?;
                    println!("Wrote {} clicks to {}", count, out.display());
                }
                None => {
                    for click in db.get_click_path(&obs_uid)? {
                        println!(
                            "{}\t{}\t{}\t{}",
                            click.click_id, click.x, click.y, click.click_time
                        );
                    }
                }
            }
        }
        Command::Fetch => {
            fetch::ensure_images(&config.images_dir, &config.stimuli_url)?;
            println!("Stimuli images available in {}", config.images_dir.display());
        }
        Command::Verify => {
            let db = Dataset::open(&db_path)?;
            let stimuli_dir = config.stimuli_dir();
            let mut missing = 0usize;
            let captions = db.get_captions()?;
            for caption in &captions {
                let resolved = Dataset::resolve_image(caption, &stimuli_dir);
                match resolved {
                    Some(path) if path.is_file() => {}
                    Some(path) => {
                        println!("{}: missing {}", caption.obs_uid, path.display());
                        missing += 1;
                    }
                    None => {
                        println!("{}: no image recorded", caption.obs_uid);
                        missing += 1;
                    }
                }
            }
            println!(
                "{} of {} observations resolve to an on-disk image",
                captions.len() - missing,
                captions.len()
            );
            if missing > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
